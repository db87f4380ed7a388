//! wxqa: answer a free-text question with a few-shot prompt sent to a
//! hosted watsonx.ai text generation model.
//!
//! ```no_run
//! # async fn demo() -> wxqa::error::Result<()> {
//! let client = wxqa::QaClient::from_env()?;
//! let answer = client.answer("What is IBM?").await?;
//! println!("{}", answer.to_markdown());
//! # Ok(()) }
//! ```

/*

wxqa/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports
│   ├── error.rs        # Error taxonomy and user messages
│   ├── credentials.rs  # api_key / project_id lookup
│   ├── prompt.rs       # Few-shot prompt assembly
│   ├── config.rs       # Generation options, transport settings
│   ├── request.rs      # Wire request/response types
│   ├── providers/      # Model clients
│   │   ├── mod.rs      # ModelClient trait
│   │   └── watsonx.rs  # HTTP client for watsonx.ai
│   ├── extract.rs      # Result -> Answer
│   ├── client.rs       # QaClient pipeline
│   ├── failover.rs     # Caller-side retry policy
│   └── bin/ask.rs      # Command line front end
└── tests/

*/

pub mod error;
pub mod config;
pub mod credentials;
pub mod prompt;
pub mod providers;
pub mod request;
pub mod extract;
pub mod failover;
pub mod client;

pub use client::QaClient;
pub use config::{ClientConfig, DecodingMethod, GenerationConfig, ModelId, SamplingParams};
pub use credentials::{resolve, Credentials, Environment, MapEnv, ProcessEnv};
pub use error::{Error, RemoteCause, Result};
pub use extract::{extract, Answer};
pub use prompt::PromptBuilder;
pub use providers::{ModelClient, WatsonxClient};
pub use request::GenerationResult;

//! Model client implementations

use async_trait::async_trait;

use crate::config::GenerationConfig;
use crate::credentials::Credentials;
use crate::error::Result;
use crate::request::GenerationResult;

pub mod watsonx;

// Re-export for convenience
pub use watsonx::WatsonxClient;

/// One remote generation call per `generate`.
/// Implementations must not retry and must not keep the credentials.
#[async_trait]
pub trait ModelClient: Send + Sync
{   async fn generate(
      &self
    , credentials: Credentials
    , config: &GenerationConfig
    , prompt: &str
    ) -> Result<GenerationResult>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

#[async_trait]
impl<M: ModelClient + ?Sized> ModelClient for std::sync::Arc<M>
{   async fn generate(
      &self
    , credentials: Credentials
    , config: &GenerationConfig
    , prompt: &str
    ) -> Result<GenerationResult>
    {   (**self).generate(credentials, config, prompt).await
    }

    fn name(&self) -> &str
    {   (**self).name()
    }
}

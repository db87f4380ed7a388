//! Command line front end: `ask What is IBM?`
//!
//! Reads `api_key` and `project_id` from the environment or a `.env` file.
//! Set `RUST_LOG=wxqa=debug` to see the assembled prompt.

use log::error;

#[tokio::main]
async fn main()
{   env_logger::init();

    let question = std::env::args()
      .skip(1)
      .collect::<Vec<_>>()
      .join(" ");

    let client = match wxqa::QaClient::from_env()
    {   Ok(c) => c
      , Err(e) => {
          error!("{}", e);
          eprintln!("{}", e.user_message());
          std::process::exit(2);
        }
    };

    match client.answer(&question).await
    {   Ok(answer) => println!("{}", answer.to_markdown())
      , Err(e) => {
          error!("{}", e);
          eprintln!("{} ({})", e.user_message(), e);
          std::process::exit(1);
        }
    }
}

use std::time::Duration;

use log::{debug, error, info};

use crate::config::{ClientConfig, GenerationConfig};
use crate::credentials::{self, Environment, ProcessEnv};
use crate::error::{Error, RemoteCause, Result};
use crate::extract::{extract, Answer};
use crate::prompt::PromptBuilder;
use crate::providers::{ModelClient, WatsonxClient};

/// Question answering pipeline:
/// credentials -> prompt -> model call -> extraction.
///
/// Holds only read-only values, so one instance can serve concurrent
/// requests. Credentials are resolved again on every call; `checked`
/// and `from_env` also resolve them once up front.
pub struct QaClient<E, M>
{   env: E
  , model: M
  , generation: GenerationConfig
  , prompt: PromptBuilder
  , endpoint: Option<String>
}

impl QaClient<ProcessEnv, WatsonxClient>
{   /// Process environment (plus `.env`), watsonx transport, stock
    /// prompt and generation defaults
    /// Fails with `MissingCredential` when the key or project is unset.
    pub fn from_env() -> Result<Self>
    {   QaClient::checked(
          ProcessEnv::load()
        , WatsonxClient::new(ClientConfig::default())?
        , GenerationConfig::default()
        )
    }
}

impl<E, M> QaClient<E, M>
where
  E: Environment + Send + Sync
, M: ModelClient
{   pub fn new(env: E, model: M, generation: GenerationConfig) -> Self
    {   debug!("Creating QaClient backed by {}", model.name());
        QaClient
        {   env
          , model
          , generation
          , prompt: PromptBuilder::default()
          , endpoint: None
        }
    }

    /// Like `new`, but fails early if credentials cannot be resolved
    pub fn checked(env: E, model: M, generation: GenerationConfig)
      -> Result<Self>
    {   credentials::resolve(&env)?;
        Ok(QaClient::new(env, model, generation))
    }

    /// Replace the prompt template
    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self
    {   self.prompt = prompt;
        self
    }

    /// Send requests to another region or a compatible endpoint
    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self
    {   self.endpoint = Some(endpoint_url.into());
        self
    }

    pub fn generation(&self) -> &GenerationConfig
    {   &self.generation
    }

    pub fn prompt(&self) -> &PromptBuilder
    {   &self.prompt
    }

    /// Answer `question`. Blank questions are replaced by the default one;
    /// the returned answer carries the question actually asked.
    pub async fn answer(&self, question: &str) -> Result<Answer>
    {   let mut credentials = credentials::resolve(&self.env)?;
        if let Some(url) = &self.endpoint
        {   credentials = credentials.with_endpoint(url.clone());
        }

        let (asked, _) = self.prompt.normalize_question(question);
        let final_prompt = self.prompt.build(question);

        let result = self.model
          .generate(credentials, &self.generation, &final_prompt)
          .await?;

        let answer = extract(result, asked)?;
        info!("Answer: {}", answer.text);
        Ok(answer)
    }

    /// Like `answer`, but abandons the model call after `deadline`
    pub async fn answer_with_deadline(
      &self
    , question: &str
    , deadline: Duration
    ) -> Result<Answer>
    {   match tokio::time::timeout(deadline, self.answer(question)).await
        {   Ok(result) => result
          , Err(_) => {
              error!("No answer within {:?}", deadline);
              Err(Error::remote(
                RemoteCause::Timeout,
                format!("no answer within {:?}", deadline)
              ))
            }
        }
    }

    /// Blocking form for synchronous callers.
    /// Must not be called from inside a tokio runtime.
    pub fn answer_blocking(&self, question: &str) -> Result<Answer>
    {   let runtime = tokio::runtime::Builder::new_current_thread()
          .enable_all()
          .build()
          .map_err(|e| {
            error!("Failed to start runtime: {}", e);
            Error::Runtime(e.to_string())
          })?;
        runtime.block_on(self.answer(question))
    }
}

use std::time::Instant;

use async_trait::async_trait;
use log::{debug, error, info, trace};
use reqwest::{header, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::config::{ClientConfig, GenerationConfig};
use crate::credentials::Credentials;
use crate::error::{Error, RemoteCause, Result};
use crate::request::{GenerationResult, TextGenRequest};

const SNIPPET_CHARS: usize = 240;

// ===== Error payload =====

#[derive(Debug, Deserialize)]
struct ErrorBody
{   #[serde(default)]
    errors: Vec<ErrorEntry>
}

#[derive(Debug, Deserialize)]
struct ErrorEntry
{   #[serde(default)]
    code: Option<String>
  , #[serde(default)]
    message: Option<String>
}

/// Human readable summary of an error body
fn snippet(body: &str) -> String
{   if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
    {   let joined: Vec<String> = parsed.errors
          .iter()
          .filter_map(|e| match (&e.code, &e.message)
          {   (Some(c), Some(m)) => Some(format!("{}: {}", c, m))
            , (None, Some(m)) => Some(m.clone())
            , (Some(c), None) => Some(c.clone())
            , (None, None) => None
          })
          .collect();
        if !joined.is_empty()
        {   return joined.join("; ");
        }
    }
    body.chars().take(SNIPPET_CHARS).collect()
}

fn cause_for_status(status: StatusCode) -> RemoteCause
{   match status
    {   StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteCause::Auth
      , StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
          RemoteCause::Timeout
        }
      , _ => RemoteCause::Rejected
    }
}

fn transport_error(e: reqwest::Error) -> Error
{   if e.is_timeout()
    {   error!("Request timed out: {}", e);
        Error::remote(RemoteCause::Timeout, e.to_string())
    } else
    {   error!("HTTP error: {}", e);
        Error::remote(RemoteCause::Transport, e.to_string())
    }
}

// ===== Client =====

/// HTTP client for the watsonx.ai text generation endpoint.
/// Holds no per-request state and can be shared between tasks.
#[derive(Debug, Clone)]
pub struct WatsonxClient
{   http_client: reqwest::Client
  , config: ClientConfig
}

impl WatsonxClient
{   pub fn new(config: ClientConfig) -> Result<Self>
    {   config.validate()?;
        let http_client = reqwest::Client::builder()
          .timeout(config.timeout())
          .user_agent(config.user_agent.clone())
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfig(e.to_string())
          })?;
        debug!("Creating WatsonxClient (timeout {:?})", config.timeout());
        Ok(WatsonxClient
        {   http_client
          , config
        })
    }

    pub fn config(&self) -> &ClientConfig
    {   &self.config
    }
}

#[async_trait]
impl crate::providers::ModelClient for WatsonxClient
{   async fn generate(
      &self
    , credentials: Credentials
    , config: &GenerationConfig
    , prompt: &str
    ) -> Result<GenerationResult>
    {   let started = Instant::now();
        let body = TextGenRequest::new(
          config, prompt, &credentials.project_id
        );

        debug!(
          "POST {} model={} prompt_len={}",
          credentials.endpoint_url, config.model_id(), prompt.len()
        );
        trace!("watsonx request: {:?}", body);

        let response = self.http_client
          .post(&credentials.endpoint_url)
          .header(header::AUTHORIZATION, credentials.bearer())
          .header(header::ACCEPT, "application/json")
          .json(&body)
          .send()
          .await
          .map_err(transport_error)?;

        let status = response.status();
        trace!("watsonx response status: {}", status);

        let bytes = response.bytes().await.map_err(transport_error)?;

        if !status.is_success()
        {   let text = String::from_utf8_lossy(&bytes);
            let detail = format!("HTTP {}: {}", status, snippet(&text));
            let cause = cause_for_status(status);
            error!("watsonx call failed ({}): {}", cause, detail);
            return Err(Error::remote(cause, detail));
        }

        let raw: Value = serde_json::from_slice(&bytes).map_err(|e| {
          error!("Response body is not JSON: {}", e);
          Error::remote(
            RemoteCause::MissingResult,
            format!("response body is not JSON: {}", e)
          )
        })?;

        if raw.get("results").is_none()
        {   error!("Response has no results field");
            return Err(Error::remote(
              RemoteCause::MissingResult,
              "response has no results field"
            ));
        }

        info!(
          "Generation completed with {} in {} ms",
          config.model_id(), started.elapsed().as_millis()
        );
        Ok(GenerationResult::new(raw))
    }

    fn name(&self) -> &str
    {   "watsonx"
    }
}

//! Credential lookup for the hosted model endpoint.
//!
//! Two values are read from the environment:
//!
//! - `api_key`    : IBM Cloud bearer credential sent with every request
//! - `project_id` : watsonx.ai project the generation is billed to
//!
//! Blank values are treated as missing. The endpoint itself is a build-time
//! constant because every hosted model is served from the same URL.

use std::collections::HashMap;
use std::fmt;

use log::{debug, error, info};

use crate::error::{Error, Result};

/// Text generation endpoint shared by all hosted models
pub const DEFAULT_ENDPOINT: &str
  = "https://us-south.ml.cloud.ibm.com/ml/v1/text/generation?version=2023-05-29";

/// Environment key holding the API key
pub const API_KEY_VAR: &str = "api_key";

/// Environment key holding the project identifier
pub const PROJECT_ID_VAR: &str = "project_id";

/// Key-value lookup the resolver reads from
pub trait Environment
{   fn get(&self, key: &str) -> Option<String>;
}

/// Process environment, optionally seeded from a `.env` file
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv
{   /// Load `.env` from the working directory (or a parent) if present.
    /// Values already set in the process take precedence.
    pub fn load() -> Self
    {   match dotenvy::dotenv()
        {   Ok(path) => debug!("Loaded environment from {}", path.display())
          , Err(e) if e.not_found() => debug!("No .env file found")
          , Err(e) => error!("Failed to read .env file: {}", e)
        }
        ProcessEnv
    }
}

impl Environment for ProcessEnv
{   fn get(&self, key: &str) -> Option<String>
    {   std::env::var(key).ok()
    }
}

/// In-memory environment
#[derive(Debug, Clone, Default)]
pub struct MapEnv(pub HashMap<String, String>);

impl MapEnv
{   pub fn new() -> Self
    {   MapEnv(HashMap::new())
    }

    pub fn with(mut self, key: &str, value: &str) -> Self
    {   self.0.insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for MapEnv
{   fn get(&self, key: &str) -> Option<String>
    {   self.0.get(key).cloned()
    }
}

impl<E: Environment + ?Sized> Environment for &E
{   fn get(&self, key: &str) -> Option<String>
    {   (**self).get(key)
    }
}

/// Values needed to call the endpoint. Passed by value per request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials
{   pub api_key: String
  , pub project_id: String
  , pub endpoint_url: String
}

impl Credentials
{   pub fn new(api_key: String, project_id: String) -> Self
    {   Credentials
        {   api_key
          , project_id
          , endpoint_url: DEFAULT_ENDPOINT.to_string()
        }
    }

    /// Point at another region or a compatible endpoint
    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>)
      -> Self
    {   self.endpoint_url = endpoint_url.into();
        self
    }

    /// Authorization header value; keys stored with the scheme are kept
    pub fn bearer(&self) -> String
    {   if self.api_key.starts_with("Bearer ")
        {   self.api_key.clone()
        } else
        {   format!("Bearer {}", self.api_key)
        }
    }
}

impl fmt::Debug for Credentials
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("Credentials")
          .field("api_key", &"<redacted>")
          .field("project_id", &self.project_id)
          .field("endpoint_url", &self.endpoint_url)
          .finish()
    }
}

fn required<E: Environment + ?Sized>(env: &E, key: &'static str)
  -> Result<String>
{   match env.get(key)
    {   Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string())
      , _ => {
          error!("Missing credential: {}", key);
          Err(Error::MissingCredential(key))
        }
    }
}

/// Read the API key and project id from `env`
pub fn resolve<E: Environment + ?Sized>(env: &E) -> Result<Credentials>
{   let api_key = required(env, API_KEY_VAR)?;
    let project_id = required(env, PROJECT_ID_VAR)?;
    info!("Resolved credentials for project {}", project_id);
    Ok(Credentials::new(api_key, project_id))
}

#[cfg(test)]
mod tests
{   use super::*;

    fn full_env() -> MapEnv
    {   MapEnv::new()
          .with(API_KEY_VAR, "secret-key")
          .with(PROJECT_ID_VAR, "proj-1")
    }

    #[test]
    fn resolves_both_values_and_constant_endpoint()
    {   let creds = resolve(&full_env()).unwrap();
        assert_eq!(creds.api_key, "secret-key");
        assert_eq!(creds.project_id, "proj-1");
        assert_eq!(creds.endpoint_url, DEFAULT_ENDPOINT);
    }

    #[test]
    fn resolution_is_idempotent()
    {   let env = full_env();
        assert_eq!(resolve(&env).unwrap(), resolve(&env).unwrap());
    }

    #[test]
    fn missing_or_blank_values_name_the_key()
    {   let no_key = MapEnv::new().with(PROJECT_ID_VAR, "p");
        assert_eq!(
          resolve(&no_key).unwrap_err(),
          Error::MissingCredential(API_KEY_VAR)
        );

        let blank_project = MapEnv::new()
          .with(API_KEY_VAR, "k")
          .with(PROJECT_ID_VAR, "   ");
        assert_eq!(
          resolve(&blank_project).unwrap_err(),
          Error::MissingCredential(PROJECT_ID_VAR)
        );
    }

    #[test]
    fn bearer_prefix_is_not_doubled()
    {   let plain = Credentials::new("abc".into(), "p".into());
        assert_eq!(plain.bearer(), "Bearer abc");
        let prefixed = Credentials::new("Bearer abc".into(), "p".into());
        assert_eq!(prefixed.bearer(), "Bearer abc");
    }

    #[test]
    fn debug_output_hides_the_key()
    {   let creds = resolve(&full_env()).unwrap();
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("secret-key"));
        assert!(shown.contains("proj-1"));
    }
}

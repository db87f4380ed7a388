//! Wire types for the text generation endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{DecodingMethod, GenerationConfig, ModelId};

/// Body of a text generation request
#[derive(Debug, Clone, Serialize)]
pub struct TextGenRequest<'a>
{   pub model_id: &'a ModelId
  , pub input: &'a str
  , pub parameters: TextGenParameters<'a>
  , pub project_id: &'a str
}

impl<'a> TextGenRequest<'a>
{   pub fn new(
      config: &'a GenerationConfig
    , prompt: &'a str
    , project_id: &'a str
    ) -> Self
    {   let sampling = config.sampling();
        TextGenRequest
        {   model_id: config.model_id()
          , input: prompt
          , parameters: TextGenParameters
            {   decoding_method: config.decoding_method()
              , max_new_tokens: config.max_new_tokens()
              , min_new_tokens: config.min_new_tokens()
              , stop_sequences: config.stop_sequences()
              , temperature: sampling.and_then(|s| s.temperature)
              , top_p: sampling.and_then(|s| s.top_p)
              , top_k: sampling.and_then(|s| s.top_k)
              , random_seed: sampling.and_then(|s| s.random_seed)
            }
          , project_id
        }
    }
}

/// Generation parameters as named by the endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TextGenParameters<'a>
{   pub decoding_method: DecodingMethod
  , pub max_new_tokens: u32
  , pub min_new_tokens: u32
  , pub stop_sequences: &'a [String]
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>
}

/// One entry of the response `results` list
#[derive(Debug, Clone, Deserialize)]
pub struct TextGenResult
{   pub generated_text: String
  , #[serde(default)]
    pub generated_token_count: Option<u64>
  , #[serde(default)]
    pub input_token_count: Option<u64>
  , #[serde(default)]
    pub stop_reason: Option<String>
}

/// Raw outcome of one generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult
{   pub raw_response: Value
}

impl GenerationResult
{   pub fn new(raw_response: Value) -> Self
    {   GenerationResult { raw_response }
    }

    /// Well-formed result holding a single generated text
    pub fn from_text(text: &str) -> Self
    {   GenerationResult::new(serde_json::json!({
          "results": [ { "generated_text": text } ]
        }))
    }

    /// Text of the first result entry, when present
    pub fn generated_text(&self) -> Option<&str>
    {   self.raw_response
          .get("results")?
          .get(0)?
          .get("generated_text")?
          .as_str()
    }
}

//! Generation options and transport settings

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hosted foundation models known to the text generation endpoint.
/// `Custom` carries any other model id verbatim. Equality and hashing
/// follow the id string, so `Custom("google/flan-ul2")` equals `FlanUl2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ModelId
{   FlanT5Xxl
  , FlanUl2
  , Mt0Xxl
  , GptNeox
  , Mpt7bInstruct2
  , Starcoder
  , Llama2_70bChat
  , Llama2_13bChat
  , Granite13bInstruct
  , Granite13bInstructV2
  , Granite13bChat
  , Granite13bChatV2
  , FlanT5Xl
  , Custom(String)
}

impl ModelId
{   /// Model id string as the endpoint expects it
    pub fn as_str(&self) -> &str
    {   match self
        {   ModelId::FlanT5Xxl => "google/flan-t5-xxl"
          , ModelId::FlanUl2 => "google/flan-ul2"
          , ModelId::Mt0Xxl => "bigscience/mt0-xxl"
          , ModelId::GptNeox => "eleutherai/gpt-neox-20b"
          , ModelId::Mpt7bInstruct2 => "ibm/mpt-7b-instruct2"
          , ModelId::Starcoder => "bigcode/starcoder"
          , ModelId::Llama2_70bChat => "meta-llama/llama-2-70b-chat"
          , ModelId::Llama2_13bChat => "meta-llama/llama-2-13b-chat"
          , ModelId::Granite13bInstruct => "ibm/granite-13b-instruct-v1"
          , ModelId::Granite13bInstructV2 => "ibm/granite-13b-instruct-v2"
          , ModelId::Granite13bChat => "ibm/granite-13b-chat-v1"
          , ModelId::Granite13bChatV2 => "ibm/granite-13b-chat-v2"
          , ModelId::FlanT5Xl => "google/flan-t5-xl"
          , ModelId::Custom(id) => id.as_str()
        }
    }

    /// Model from an id string; known ids map to their named variant
    pub fn custom(id: impl Into<String>) -> Self
    {   ModelId::from(id.into())
    }

    const KNOWN: [ModelId; 13] = [
      ModelId::FlanT5Xxl
    , ModelId::FlanUl2
    , ModelId::Mt0Xxl
    , ModelId::GptNeox
    , ModelId::Mpt7bInstruct2
    , ModelId::Starcoder
    , ModelId::Llama2_70bChat
    , ModelId::Llama2_13bChat
    , ModelId::Granite13bInstruct
    , ModelId::Granite13bInstructV2
    , ModelId::Granite13bChat
    , ModelId::Granite13bChatV2
    , ModelId::FlanT5Xl
    ];
}

impl PartialEq for ModelId
{   fn eq(&self, other: &Self) -> bool
    {   self.as_str() == other.as_str()
    }
}

impl Eq for ModelId {}

impl std::hash::Hash for ModelId
{   fn hash<H: std::hash::Hasher>(&self, state: &mut H)
    {   self.as_str().hash(state);
    }
}

impl fmt::Display for ModelId
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.as_str())
    }
}

impl From<String> for ModelId
{   fn from(s: String) -> Self
    {   ModelId::KNOWN
          .iter()
          .find(|m| m.as_str() == s)
          .cloned()
          .unwrap_or(ModelId::Custom(s))
    }
}

impl From<&str> for ModelId
{   fn from(s: &str) -> Self
    {   ModelId::from(s.to_string())
    }
}

impl From<ModelId> for String
{   fn from(m: ModelId) -> Self
    {   m.as_str().to_string()
    }
}

/// Token selection strategy used by the remote model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodingMethod
{   /// Most likely token at every step; deterministic
    Greedy
  , /// Random sampling shaped by `SamplingParams`
    Sample
}

impl DecodingMethod
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   DecodingMethod::Greedy => "greedy"
          , DecodingMethod::Sample => "sample"
        }
    }

    /// Same prompt and config always yields the same text
    pub fn is_deterministic(&self) -> bool
    {   matches!(self, DecodingMethod::Greedy)
    }
}

impl FromStr for DecodingMethod
{   type Err = Error;

    fn from_str(s: &str) -> Result<Self>
    {   match s.trim().to_ascii_lowercase().as_str()
        {   "greedy" => Ok(DecodingMethod::Greedy)
          , "sample" | "sampling" => Ok(DecodingMethod::Sample)
          , other => Err(Error::InvalidConfig(
              format!("unsupported decoding method: {}", other)
            ))
        }
    }
}

/// Optional knobs that only apply to sampling
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams
{   pub temperature: Option<f32>
  , pub top_p: Option<f32>
  , pub top_k: Option<u32>
  , pub random_seed: Option<u64>
}

impl SamplingParams
{   fn validate(&self) -> Result<()>
    {   if let Some(t) = self.temperature
        {   check_range("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p
        {   check_range("top_p", p, 0.0, 1.0)?;
        }
        if let Some(k) = self.top_k
        {   if !(1..=100).contains(&k)
            {   return Err(Error::InvalidConfig(
                  format!("top_k must be within 1..=100, got {}", k)
                ));
            }
        }
        Ok(())
    }
}

fn check_range(field: &str, value: f32, min: f32, max: f32)
  -> Result<()>
{   if value.is_finite() && value >= min && value <= max
    {   Ok(())
    } else
    {   Err(Error::InvalidConfig(format!(
          "{} must be within {}..={}, got {}",
          field, min, max, value
        )))
    }
}

/// Validated, immutable generation options sent with every request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig
{   model_id: ModelId
  , max_new_tokens: u32
  , min_new_tokens: u32
  , decoding_method: DecodingMethod
  , stop_sequences: Vec<String>
  , sampling: Option<SamplingParams>
}

impl GenerationConfig
{   /// Validate and build a config. Values are never clamped.
    pub fn make(
      model_id: ModelId
    , max_new_tokens: u32
    , min_new_tokens: u32
    , decoding_method: DecodingMethod
    , stop_sequences: Vec<String>
    ) -> Result<Self>
    {   if let ModelId::Custom(id) = &model_id
        {   if id.trim().is_empty()
            {   return Err(Error::InvalidConfig(
                  "model id must not be empty".to_string()
                ));
            }
        }
        if max_new_tokens == 0
        {   return Err(Error::InvalidConfig(
              "max_new_tokens must be positive".to_string()
            ));
        }
        if min_new_tokens > max_new_tokens
        {   return Err(Error::InvalidConfig(format!(
              "min_new_tokens ({}) exceeds max_new_tokens ({})",
              min_new_tokens, max_new_tokens
            )));
        }
        if stop_sequences.iter().any(|s| s.is_empty())
        {   return Err(Error::InvalidConfig(
              "stop sequences must not contain empty strings"
                .to_string()
            ));
        }

        debug!(
          "Generation config: model={} tokens={}..={} decoding={}",
          model_id, min_new_tokens, max_new_tokens,
          decoding_method.as_str()
        );

        Ok(GenerationConfig
        {   model_id
          , max_new_tokens
          , min_new_tokens
          , decoding_method
          , stop_sequences
          , sampling: None
        })
    }

    /// Attach sampling parameters; rejected under greedy decoding
    pub fn with_sampling(mut self, params: SamplingParams)
      -> Result<Self>
    {   if self.decoding_method != DecodingMethod::Sample
        {   return Err(Error::InvalidConfig(
              "sampling parameters require sample decoding".to_string()
            ));
        }
        params.validate()?;
        self.sampling = Some(params);
        Ok(self)
    }

    pub fn model_id(&self) -> &ModelId
    {   &self.model_id
    }

    pub fn max_new_tokens(&self) -> u32
    {   self.max_new_tokens
    }

    pub fn min_new_tokens(&self) -> u32
    {   self.min_new_tokens
    }

    pub fn decoding_method(&self) -> DecodingMethod
    {   self.decoding_method
    }

    pub fn stop_sequences(&self) -> &[String]
    {   &self.stop_sequences
    }

    pub fn sampling(&self) -> Option<&SamplingParams>
    {   self.sampling.as_ref()
    }
}

impl Default for GenerationConfig
{   /// flan-ul2, 20..=100 new tokens, greedy, stop at the first period
    fn default() -> Self
    {   GenerationConfig
        {   model_id: ModelId::FlanUl2
          , max_new_tokens: 100
          , min_new_tokens: 20
          , decoding_method: DecodingMethod::Greedy
          , stop_sequences: vec![".".to_string()]
          , sampling: None
        }
    }
}

/// HTTP transport settings for the model client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig
{   /// Whole-request timeout in milliseconds
    pub timeout_ms: u64
  , /// Value of the User-Agent header
    pub user_agent: String
}

impl ClientConfig
{   pub fn timeout(&self) -> Duration
    {   Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<()>
    {   if self.timeout_ms == 0
        {   return Err(Error::InvalidConfig(
              "timeout_ms must be positive".to_string()
            ));
        }
        Ok(())
    }
}

impl Default for ClientConfig
{   fn default() -> Self
    {   ClientConfig
        {   timeout_ms: 60_000
          , user_agent: concat!(
              env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")
            ).to_string()
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    fn stops() -> Vec<String>
    {   vec![".".to_string()]
    }

    #[test]
    fn min_above_max_is_rejected_for_every_pair()
    {   for max in 1..=40u32
        {   for min in (max + 1)..=(max + 5)
            {   let res = GenerationConfig::make(
                  ModelId::FlanUl2, max, min,
                  DecodingMethod::Greedy, stops()
                );
                assert!(
                  matches!(res, Err(Error::InvalidConfig(_))),
                  "min={} max={} accepted", min, max
                );
            }
        }
    }

    #[test]
    fn equal_bounds_and_empty_stops_are_fine()
    {   let cfg = GenerationConfig::make(
          ModelId::FlanUl2, 20, 20, DecodingMethod::Greedy, vec![]
        ).unwrap();
        assert_eq!(cfg.min_new_tokens(), 20);
        assert!(cfg.stop_sequences().is_empty());
    }

    #[test]
    fn zero_max_tokens_is_rejected()
    {   let res = GenerationConfig::make(
          ModelId::FlanUl2, 0, 0, DecodingMethod::Greedy, stops()
        );
        assert!(matches!(res, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn empty_stop_sequence_and_blank_model_are_rejected()
    {   let res = GenerationConfig::make(
          ModelId::FlanUl2, 10, 1, DecodingMethod::Greedy,
          vec![String::new()]
        );
        assert!(matches!(res, Err(Error::InvalidConfig(_))));

        let res = GenerationConfig::make(
          ModelId::Custom("  ".into()), 10, 1,
          DecodingMethod::Greedy, stops()
        );
        assert!(matches!(res, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn unknown_decoding_name_is_invalid()
    {   assert_eq!(
          "GREEDY".parse::<DecodingMethod>().unwrap(),
          DecodingMethod::Greedy
        );
        assert_eq!(
          "sampling".parse::<DecodingMethod>().unwrap(),
          DecodingMethod::Sample
        );
        assert!(matches!(
          "beam".parse::<DecodingMethod>(),
          Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn sampling_needs_sample_decoding_and_sane_ranges()
    {   let params = SamplingParams
        {   temperature: Some(0.7)
          , top_k: Some(50)
          , ..Default::default()
        };
        let greedy = GenerationConfig::default();
        assert!(greedy.with_sampling(params.clone()).is_err());

        let sample = GenerationConfig::make(
          ModelId::Granite13bChatV2, 50, 0,
          DecodingMethod::Sample, vec![]
        ).unwrap();
        let ok = sample.clone().with_sampling(params).unwrap();
        assert_eq!(ok.sampling().and_then(|s| s.top_k), Some(50));

        let hot = SamplingParams
        {   temperature: Some(3.5)
          , ..Default::default()
        };
        assert!(sample.with_sampling(hot).is_err());
    }

    #[test]
    fn model_ids_round_trip_through_strings()
    {   assert_eq!(ModelId::from("google/flan-ul2"), ModelId::FlanUl2);
        assert_eq!(
          ModelId::from("acme/other"),
          ModelId::Custom("acme/other".into())
        );
        let json = serde_json::to_string(&ModelId::Mt0Xxl).unwrap();
        assert_eq!(json, "\"bigscience/mt0-xxl\"");
    }

    #[test]
    fn custom_ids_equal_their_named_variant()
    {   use std::collections::HashSet;

        assert_eq!(ModelId::Custom("google/flan-ul2".into()), ModelId::FlanUl2);
        assert!(matches!(ModelId::custom("google/flan-ul2"), ModelId::FlanUl2));
        assert_ne!(ModelId::custom("acme/other"), ModelId::FlanUl2);

        let set: HashSet<ModelId> = [
          ModelId::FlanUl2
        , ModelId::Custom("google/flan-ul2".into())
        ].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn defaults_match_the_demo_settings()
    {   let cfg = GenerationConfig::default();
        assert_eq!(cfg.model_id(), &ModelId::FlanUl2);
        assert_eq!(cfg.max_new_tokens(), 100);
        assert_eq!(cfg.min_new_tokens(), 20);
        assert_eq!(cfg.decoding_method(), DecodingMethod::Greedy);
        assert_eq!(cfg.stop_sequences(), &[".".to_string()]);
        assert_eq!(ClientConfig::default().timeout(), Duration::from_secs(60));
    }
}

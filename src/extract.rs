//! Turning a generation result into a displayable answer

use std::fmt;

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::{GenerationResult, TextGenResult};

/// Final answer paired with the question that was asked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer
{   pub question: String
  , pub text: String
}

impl Answer
{   /// Markdown rendering for a web or chat surface, trimmed for display
    pub fn to_markdown(&self) -> String
    {   format!(
          "**Answer to your question:** {} *{}*",
          self.question.trim(), self.text.trim()
        )
    }
}

impl fmt::Display for Answer
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   write!(f, "Q: {}\nA: {}", self.question, self.text)
    }
}

/// Pull `results[0].generated_text` out of `result`.
/// Only the first entry is read; the text is returned as generated.
pub fn extract(result: GenerationResult, question: &str) -> Result<Answer>
{   let results = result.raw_response
      .get("results")
      .and_then(|r| r.as_array())
      .ok_or_else(|| {
        error!("Response has no results list");
        Error::MalformedResponse("missing results list".to_string())
      })?;

    let entry = results.first().cloned().ok_or_else(|| {
      error!("Response contained no results");
      Error::MalformedResponse("empty results list".to_string())
    })?;

    let first: TextGenResult
      = serde_json::from_value(entry).map_err(|e| {
        error!("Unexpected result entry: {}", e);
        Error::MalformedResponse(e.to_string())
      })?;

    debug!(
      "Extracted answer ({:?} tokens, stop reason {:?})",
      first.generated_token_count, first.stop_reason
    );

    Ok(Answer
    {   question: question.to_string()
      , text: first.generated_text
    })
}

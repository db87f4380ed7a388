//! Few-shot prompt assembly

use log::{debug, info};

/// Instruction placed at the top of every prompt
pub const INSTRUCTION: &str = "Answer this question briefly.";

/// Question asked when the caller leaves the input blank
pub const DEFAULT_QUESTION: &str = "What is IBM?";

/// Marker after the question telling the model to answer now.
/// Starts on its own line so the asked question keeps the same
/// `Question:` / `Answer:` layout as the examples.
pub const TRAILING_MARKER: &str = "\nAnswer:";

/// Fixed examples steering the model towards short answers.
/// The trailing space after `Portuguese` is part of the stock prompt.
pub const EXAMPLES: [(&str, &str); 4] = [
  ("What is the capital of Germany", "Berlin")
, ("What year was George Washington born?", "1732")
, ( "What are the main micro nutrients in food?"
  , "Protein, carbohydrates, and fat"
  )
, ("What language is spoken in Brazil?", "Portuguese ")
];

/// Builds prompts as instruction + examples + question + marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder
{   instruction: String
  , examples: Vec<(String, String)>
  , trailing_marker: String
  , default_question: String
}

impl PromptBuilder
{   pub fn new(
      instruction: impl Into<String>
    , examples: Vec<(String, String)>
    , trailing_marker: impl Into<String>
    , default_question: impl Into<String>
    ) -> Self
    {   PromptBuilder
        {   instruction: instruction.into()
          , examples
          , trailing_marker: trailing_marker.into()
          , default_question: default_question.into()
        }
    }

    pub fn trailing_marker(&self) -> &str
    {   &self.trailing_marker
    }

    pub fn default_question(&self) -> &str
    {   &self.default_question
    }

    /// Question actually asked, and whether the default was substituted
    pub fn normalize_question<'a>(&'a self, question: &'a str)
      -> (&'a str, bool)
    {   if question.trim().is_empty()
        {   (&self.default_question, true)
        } else
        {   (question, false)
        }
    }

    /// Assemble the final prompt for `question`
    pub fn build(&self, question: &str) -> String
    {   let (question, substituted) = self.normalize_question(question);
        if substituted
        {   info!(
              "Blank question, asking the default: {}",
              self.default_question
            );
        }

        let mut prompt = String::with_capacity(
          self.instruction.len() + question.len() + 256
        );
        prompt.push_str(&self.instruction);
        for (q, a) in &self.examples
        {   prompt.push_str("\n\nQuestion: ");
            prompt.push_str(q);
            prompt.push_str("\nAnswer: ");
            prompt.push_str(a);
        }
        prompt.push_str("\n\nQuestion: ");
        prompt.push_str(question);
        prompt.push_str(&self.trailing_marker);

        debug!("Prompt:\n{}", prompt);
        prompt
    }
}

impl Default for PromptBuilder
{   fn default() -> Self
    {   PromptBuilder::new(
          INSTRUCTION
        , EXAMPLES
            .iter()
            .map(|(q, a)| (q.to_string(), a.to_string()))
            .collect()
        , TRAILING_MARKER
        , DEFAULT_QUESTION
        )
    }
}

/// Build with the stock instruction and examples
pub fn build(question: &str) -> String
{   PromptBuilder::default().build(question)
}

//! Caller-side retry policy.
//!
//! The pipeline itself never retries. Callers that want to can wrap a call
//! in `RetryPolicy::run`, which only repeats transient failures and, unless
//! told otherwise, only when decoding is deterministic.

use std::future::Future;
use std::time::Duration;

use log::{debug, info};

use crate::config::DecodingMethod;
use crate::error::{Error, Result};

/// Retry policy for failed requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy
{   pub max_retries: usize
  , pub backoff_multiplier: f32
  , pub initial_backoff: Duration
  , /// Also retry when sampling, accepting a different answer
    pub allow_sampling: bool
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_retries: usize
    , backoff_multiplier: f32
    , initial_backoff_ms: u64
    ) -> Self
    {   RetryPolicy
        {   max_retries
          , backoff_multiplier
          , initial_backoff: Duration::from_millis(
              initial_backoff_ms
            )
          , allow_sampling: false
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self
    {   RetryPolicy::new(0, 1.0, 0)
    }

    /// Calculate backoff duration for attempt number
    pub fn backoff_for_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   let multiplier
          = self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(
          (self.initial_backoff.as_millis() as f32
            * multiplier) as u64
        )
    }

    /// Whether `err` may be retried under `decoding`
    pub fn permits(&self, err: &Error, decoding: DecodingMethod) -> bool
    {   err.is_transient()
          && (decoding.is_deterministic() || self.allow_sampling)
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out
    pub async fn run<T, F, Fut>(
      &self
    , decoding: DecodingMethod
    , mut op: F
    ) -> Result<T>
    where
      F: FnMut() -> Fut
    , Fut: Future<Output = Result<T>>
    {   let mut attempt = 0;
        loop
        { match op().await
          {   Ok(value) => return Ok(value)
            , Err(err) => {
                if attempt >= self.max_retries
                  || !self.permits(&err, decoding)
                {   debug!("Giving up after {} attempt(s): {}", attempt + 1, err);
                    return Err(err);
                }
                let wait = self.backoff_for_attempt(attempt);
                info!(
                  "Attempt {} failed ({}), retrying in {:?}",
                  attempt + 1, err, wait
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
              }
          }
        }
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::none()
    }
}

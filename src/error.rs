use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Distinguishes why a remote generation call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteCause
{   /// Key rejected by the endpoint (401/403)
    Auth
  , /// Endpoint refused the request or its parameters
    Rejected
  , /// Connection refused, reset or any other I/O failure
    Transport
  , /// No response before the deadline
    Timeout
  , /// Success status but the body carried no result field
    MissingResult
}

impl std::fmt::Display for RemoteCause
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   let name = match self
        {   RemoteCause::Auth => "auth"
          , RemoteCause::Rejected => "rejected"
          , RemoteCause::Transport => "transport"
          , RemoteCause::Timeout => "timeout"
          , RemoteCause::MissingResult => "missing-result"
        };
        f.write_str(name)
    }
}

/// Error type for the question answering pipeline.
/// Every variant is terminal for the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error
{   /// A required environment value is absent or blank
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str)
  , /// Generation settings failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String)
  , /// The remote model call failed
    #[error("Remote invocation failed ({cause}): {detail}")]
    RemoteInvocation
    {   cause: RemoteCause
      , detail: String
    }
  , /// The call succeeded but the result could not be read
    #[error("Malformed response: {0}")]
    MalformedResponse(String)
  , /// The local async runtime could not be started
    #[error("Runtime error: {0}")]
    Runtime(String)
}

impl Error
{   pub fn remote(cause: RemoteCause, detail: impl Into<String>)
      -> Self
    {   Error::RemoteInvocation
        {   cause
          , detail: detail.into()
        }
    }

    /// Cause code for remote failures, `None` otherwise
    pub fn remote_cause(&self) -> Option<RemoteCause>
    {   match self
        {   Error::RemoteInvocation { cause, .. } => Some(*cause)
          , _ => None
        }
    }

    /// Transport level failures a caller may choose to retry
    pub fn is_transient(&self) -> bool
    {   matches!(
          self.remote_cause(),
          Some(RemoteCause::Transport) | Some(RemoteCause::Timeout)
        )
    }

    /// Short message suitable for showing to an end user
    pub fn user_message(&self) -> &'static str
    {   match self
        {   Error::MissingCredential(_) => {
              "Could not authenticate: credentials are not configured"
            }
          , Error::InvalidConfig(_) => {
              "The generation settings are invalid"
            }
          , Error::RemoteInvocation { cause, .. } => match cause
            {   RemoteCause::Auth => {
                  "Could not authenticate with the model service"
                }
              , RemoteCause::Rejected => {
                  "The model service rejected the request"
                }
              , RemoteCause::Transport | RemoteCause::Timeout => {
                  "Could not reach the model"
                }
              , RemoteCause::MissingResult => {
                  "The model response was unusable"
                }
            }
          , Error::MalformedResponse(_) => {
              "The model response was unusable"
            }
          , Error::Runtime(_) => {
              "Could not start the local runtime"
            }
        }
    }
}

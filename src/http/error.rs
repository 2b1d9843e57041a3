use thiserror::Error;

/// Failure at the HTTP client boundary.
///
/// Transport failures and envelope-level business failures both land here, so
/// downstream code only has one failure channel to check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  /// The call failed at the transport layer (connection, timeout, non-2xx status)
  #[error("request failed: {reason}")]
  Transport {
    status: Option<u16>,
    /// Envelope message from an error response body, when the server sent one
    server_message: Option<String>,
    reason: String,
  },
  /// The server answered but the envelope reported `isSuccess: false`
  #[error("{message}")]
  Business { message: String },
  /// The response body was not what we expected
  #[error("failed to decode response: {0}")]
  Decode(String),
  /// Local file handling for uploads and downloads
  #[error("i/o error: {0}")]
  Io(String),
}

impl ApiError {
  /// Transport failure without any server-supplied message.
  pub fn transport(reason: impl Into<String>) -> Self {
    Self::Transport {
      status: None,
      server_message: None,
      reason: reason.into(),
    }
  }

  pub fn business(message: impl Into<String>) -> Self {
    Self::Business {
      message: message.into(),
    }
  }

  /// The message the server supplied for this failure, if any.
  ///
  /// Blank messages count as absent.
  pub fn server_message(&self) -> Option<&str> {
    let message = match self {
      Self::Business { message } => Some(message.as_str()),
      Self::Transport { server_message, .. } => server_message.as_deref(),
      Self::Decode(_) | Self::Io(_) => None,
    };
    message.filter(|m| !m.trim().is_empty())
  }

  /// Transport-level status code, when known.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Transport { status, .. } => *status,
      _ => None,
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(error: reqwest::Error) -> Self {
    if error.is_decode() {
      return Self::Decode(error.to_string());
    }
    Self::Transport {
      status: error.status().map(|s| s.as_u16()),
      server_message: None,
      reason: error.to_string(),
    }
  }
}

impl From<std::io::Error> for ApiError {
  fn from(error: std::io::Error) -> Self {
    Self::Io(error.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_server_message_sources() {
    assert_eq!(
      ApiError::business("Company code already exists").server_message(),
      Some("Company code already exists")
    );
    assert_eq!(
      ApiError::Transport {
        status: Some(400),
        server_message: Some("Invalid site".into()),
        reason: "400 Bad Request".into(),
      }
      .server_message(),
      Some("Invalid site")
    );
    assert_eq!(ApiError::transport("connection refused").server_message(), None);
    assert_eq!(ApiError::Decode("eof".into()).server_message(), None);
  }

  #[test]
  fn test_blank_message_counts_as_absent() {
    assert_eq!(ApiError::business("  ").server_message(), None);
  }
}

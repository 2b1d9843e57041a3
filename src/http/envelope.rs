//! The `{ isSuccess, message, result }` wrapper every backend response uses.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = Value> {
  pub is_success: bool,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub result: Option<T>,
}

impl Envelope<Value> {
  /// Decode a raw response body into an envelope.
  pub fn from_body(body: Value) -> Result<Self, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::Decode(format!("invalid envelope: {}", e)))
  }

  /// Collapse the envelope into a single `Result`.
  ///
  /// `isSuccess: false` is a failure even though the transport succeeded. A
  /// missing `result` decodes as JSON `null`, which suits `()` and `Option<T>`.
  pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ApiError> {
    if !self.is_success {
      return Err(ApiError::Business {
        message: self.message.unwrap_or_default(),
      });
    }

    let result = self.result.unwrap_or(Value::Null);
    serde_json::from_value(result).map_err(|e| ApiError::Decode(e.to_string()))
  }
}

/// Pull the envelope message out of an error response body, if it has one.
pub fn message_from_body(body: &[u8]) -> Option<String> {
  #[derive(Deserialize)]
  struct MessageOnly {
    message: Option<String>,
  }

  serde_json::from_slice::<MessageOnly>(body)
    .ok()
    .and_then(|m| m.message)
    .filter(|m| !m.trim().is_empty())
}

use serde::Serialize;
use thiserror::Error;

use crate::http::ApiError;

/// Lifecycle status of a single remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  /// Never started, or reset
  #[default]
  Idle,
  /// Request in flight
  Pending,
  Succeeded,
  Failed,
}

/// Whether a successful completion produces data or just a success flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
  Read,
  Write,
}

/// Normalized, displayable failure of a remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ResourceError {
  pub message: String,
  /// Transport status code, when the failure had one
  pub status: Option<u16>,
}

impl ResourceError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      status: None,
    }
  }

  /// Surface the server's message verbatim, or `fallback` when there is none.
  pub fn from_api(error: &ApiError, fallback: &str) -> Self {
    Self {
      message: error.server_message().unwrap_or(fallback).to_string(),
      status: error.status(),
    }
  }
}

/// State of one remote operation.
///
/// `data` survives later attempts and failures so the last good value stays
/// visible during a refresh. `error` and the success flag are never set at the
/// same time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceState<T> {
  status: Status,
  data: Option<T>,
  error: Option<ResourceError>,
  success: bool,
  /// Number of attempts started so far
  generation: u64,
}

impl<T> Default for ResourceState<T> {
  fn default() -> Self {
    Self {
      status: Status::Idle,
      data: None,
      error: None,
      success: false,
      generation: 0,
    }
  }
}

impl<T> ResourceState<T> {
  pub fn status(&self) -> Status {
    self.status
  }

  pub fn data(&self) -> Option<&T> {
    self.data.as_ref()
  }

  pub fn error(&self) -> Option<&ResourceError> {
    self.error.as_ref()
  }

  /// Transient success flag set by write operations.
  pub fn is_success(&self) -> bool {
    self.success
  }

  pub fn is_loading(&self) -> bool {
    self.status == Status::Pending
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Begin a new attempt. Returns its generation.
  pub fn start(&mut self) -> u64 {
    self.status = Status::Pending;
    self.error = None;
    self.success = false;
    self.generation += 1;
    self.generation
  }

  pub fn succeed(&mut self, value: T, kind: OperationKind) {
    self.status = Status::Succeeded;
    self.data = Some(value);
    self.error = None;
    self.success = kind == OperationKind::Write;
  }

  pub fn fail(&mut self, error: ResourceError) {
    self.status = Status::Failed;
    self.error = Some(error);
    self.success = false;
  }

  pub fn dismiss_error(&mut self) {
    self.error = None;
  }

  pub fn dismiss_success(&mut self) {
    self.success = false;
  }

  /// Back to the initial idle state. The generation keeps counting so
  /// responses from before the reset stay recognizable.
  pub fn reset(&mut self) {
    *self = Self {
      generation: self.generation,
      ..Self::default()
    };
  }

  /// Edit the held data in place without touching status or flags.
  ///
  /// Returns `false` (and leaves the state alone) when there is no data.
  pub fn update_data(&mut self, f: impl FnOnce(&mut T) -> bool) -> bool {
    match self.data.as_mut() {
      Some(data) => f(data),
      None => false,
    }
  }
}

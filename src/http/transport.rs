use async_trait::async_trait;
use serde_json::Value;

use super::error::ApiError;
use super::request::{Download, Method, ProgressFn, RequestConfig, UploadForm};

/// Minimal capability interface over the REST backend.
///
/// Implementations return the raw JSON body of a 2xx response; envelope
/// decoding happens in [`ApiClient`](super::ApiClient). Non-2xx responses and
/// connection failures are reported as [`ApiError::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
    config: &RequestConfig,
  ) -> Result<Value, ApiError>;

  async fn upload(
    &self,
    path: &str,
    form: UploadForm,
    on_progress: Option<ProgressFn>,
    config: &RequestConfig,
  ) -> Result<Value, ApiError>;

  async fn download(&self, path: &str, config: &RequestConfig) -> Result<Download, ApiError>;
}

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::envelope::Envelope;
use super::error::ApiError;
use super::request::{Method, ProgressFn, RequestConfig, UploadForm};
use super::transport::Transport;

/// Typed HTTP client over a [`Transport`].
///
/// Every call decodes the response envelope, so callers see a single
/// `Result<T, ApiError>` whether the failure was at the transport or the
/// business level.
#[derive(Clone)]
pub struct ApiClient {
  transport: Arc<dyn Transport>,
}

impl ApiClient {
  pub fn new(transport: impl Transport + 'static) -> Self {
    Self {
      transport: Arc::new(transport),
    }
  }

  pub async fn get<T: DeserializeOwned>(
    &self,
    path: &str,
    config: &RequestConfig,
  ) -> Result<T, ApiError> {
    self.request(Method::Get, path, None, config).await
  }

  /// POST `body`. A body that serializes to `null` (e.g. `&()`) is omitted.
  pub async fn post<T, B>(&self, path: &str, body: &B, config: &RequestConfig) -> Result<T, ApiError>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    self
      .request(Method::Post, path, encode_body(body)?, config)
      .await
  }

  pub async fn put<T, B>(&self, path: &str, body: &B, config: &RequestConfig) -> Result<T, ApiError>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    self
      .request(Method::Put, path, encode_body(body)?, config)
      .await
  }

  pub async fn patch<T, B>(&self, path: &str, body: &B, config: &RequestConfig) -> Result<T, ApiError>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    self
      .request(Method::Patch, path, encode_body(body)?, config)
      .await
  }

  pub async fn delete<T: DeserializeOwned>(
    &self,
    path: &str,
    config: &RequestConfig,
  ) -> Result<T, ApiError> {
    self.request(Method::Delete, path, None, config).await
  }

  pub async fn upload<T: DeserializeOwned>(
    &self,
    path: &str,
    form: UploadForm,
    on_progress: Option<ProgressFn>,
    config: &RequestConfig,
  ) -> Result<T, ApiError> {
    debug!(path, files = form.files.len(), bytes = form.total_bytes(), "upload");
    let body = self
      .transport
      .upload(path, form, on_progress, config)
      .await?;
    Envelope::from_body(body)?.into_result()
  }

  /// Download `path` and write it to disk.
  ///
  /// The target is `filename` if given, else the server-suggested name, else
  /// the last segment of `path`. Returns the path written.
  pub async fn download(
    &self,
    path: &str,
    filename: Option<&Path>,
    config: &RequestConfig,
  ) -> Result<PathBuf, ApiError> {
    let download = self.transport.download(path, config).await?;

    let target = match filename {
      Some(f) => f.to_path_buf(),
      None => download
        .filename
        .as_deref()
        .and_then(safe_file_name)
        .or_else(|| path.rsplit('/').find(|s| !s.is_empty()).and_then(safe_file_name))
        .unwrap_or_else(|| PathBuf::from("download")),
    };

    tokio::fs::write(&target, &download.bytes).await?;
    info!(path, target = %target.display(), bytes = download.bytes.len(), "downloaded");
    Ok(target)
  }

  async fn request<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
    config: &RequestConfig,
  ) -> Result<T, ApiError> {
    debug!(%method, path, "request");
    let raw = self.transport.send(method, path, body, config).await?;
    Envelope::from_body(raw)?.into_result()
  }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Option<Value>, ApiError> {
  let value = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
  Ok(match value {
    Value::Null => None,
    v => Some(v),
  })
}

/// Keep only the final component of a suggested name, so a server cannot
/// steer the write outside the working directory.
fn safe_file_name(name: &str) -> Option<PathBuf> {
  Path::new(name)
    .file_name()
    .map(PathBuf::from)
    .filter(|p| !p.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::mock::{business_failure, ok, MockTransport};
  use crate::http::Download;
  use serde_json::json;

  #[tokio::test]
  async fn test_get_decodes_envelope() {
    let mock = MockTransport::new();
    mock.respond(Method::Get, "companies", ok(json!([{ "id": "c1" }])));
    let client = ApiClient::new(mock.clone());

    let value: Vec<Value> = client
      .get("companies", &RequestConfig::default())
      .await
      .unwrap();
    assert_eq!(value, vec![json!({ "id": "c1" })]);
  }

  #[tokio::test]
  async fn test_business_failure_becomes_error() {
    let mock = MockTransport::new();
    mock.respond(Method::Delete, "companies/c1", business_failure("Company in use"));
    let client = ApiClient::new(mock);

    let err = client
      .delete::<()>("companies/c1", &RequestConfig::default())
      .await
      .unwrap_err();
    assert_eq!(err.server_message(), Some("Company in use"));
  }

  #[tokio::test]
  async fn test_unit_body_is_omitted() {
    let mock = MockTransport::new();
    mock.respond(Method::Post, "reports/refresh", ok(Value::Null));
    let client = ApiClient::new(mock.clone());

    client
      .post::<(), _>("reports/refresh", &(), &RequestConfig::default())
      .await
      .unwrap();
    assert_eq!(mock.calls()[0].body, None);
  }

  #[tokio::test]
  async fn test_put_and_patch_send_method_path_and_body() {
    let mock = MockTransport::new();
    mock.respond(Method::Put, "users/u1", ok(json!({ "id": "u1", "role": "admin" })));
    mock.respond(Method::Patch, "users/u1", ok(json!({ "id": "u1", "isActive": false })));
    let client = ApiClient::new(mock.clone());

    let put: Value = client
      .put("users/u1", &json!({ "role": "admin" }), &RequestConfig::default())
      .await
      .unwrap();
    let patched: Value = client
      .patch("users/u1", &json!({ "isActive": false }), &RequestConfig::default())
      .await
      .unwrap();

    assert_eq!(put["role"], "admin");
    assert_eq!(patched["isActive"], false);
    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!((calls[0].method, calls[0].path.as_str()), (Method::Put, "users/u1"));
    assert_eq!(calls[0].body, Some(json!({ "role": "admin" })));
    assert_eq!((calls[1].method, calls[1].path.as_str()), (Method::Patch, "users/u1"));
    assert_eq!(calls[1].body, Some(json!({ "isActive": false })));
  }

  #[tokio::test]
  async fn test_download_writes_target_file() {
    let dir = tempfile::tempdir().unwrap();
    let mock = MockTransport::new();
    mock.respond_download(
      "templates/t1/download",
      Download {
        bytes: b"xlsx".to_vec(),
        filename: Some("../../Template.xlsx".into()),
      },
    );
    let client = ApiClient::new(mock);

    let target = dir.path().join("out.xlsx");
    let written = client
      .download("templates/t1/download", Some(&target), &RequestConfig::default())
      .await
      .unwrap();
    assert_eq!(written, target);
    assert_eq!(std::fs::read(&target).unwrap(), b"xlsx");

    assert_eq!(
      safe_file_name("../../Template.xlsx"),
      Some(PathBuf::from("Template.xlsx"))
    );
  }
}

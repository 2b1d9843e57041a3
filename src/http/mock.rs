//! Scripted in-memory transport for tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::ApiError;
use super::request::{Download, Method, ProgressFn, RequestConfig, UploadForm};
use super::transport::Transport;

/// A recorded request.
#[derive(Debug, Clone)]
pub struct Call {
  pub method: Method,
  pub path: String,
  pub body: Option<Value>,
  pub query: Vec<(String, String)>,
}

#[derive(Clone)]
struct Scripted {
  delay: Duration,
  response: Result<Value, ApiError>,
}

#[derive(Default)]
struct Inner {
  routes: HashMap<(Method, String), Vec<Scripted>>,
  downloads: HashMap<String, Download>,
  calls: Vec<Call>,
}

/// Transport answering from a script.
///
/// Each route holds a queue of responses; the last one repeats. Unscripted
/// routes fail with a 404 transport error carrying no server message.
/// Clones share the script and the call log.
#[derive(Clone, Default)]
pub struct MockTransport {
  inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn respond(&self, method: Method, path: &str, response: Result<Value, ApiError>) {
    self.respond_after(method, path, Duration::ZERO, response);
  }

  /// Script a response that resolves after `delay` (tokio time).
  pub fn respond_after(
    &self,
    method: Method,
    path: &str,
    delay: Duration,
    response: Result<Value, ApiError>,
  ) {
    self
      .inner
      .lock()
      .unwrap()
      .routes
      .entry((method, path.to_string()))
      .or_default()
      .push(Scripted { delay, response });
  }

  pub fn respond_download(&self, path: &str, download: Download) {
    self
      .inner
      .lock()
      .unwrap()
      .downloads
      .insert(path.to_string(), download);
  }

  pub fn calls(&self) -> Vec<Call> {
    self.inner.lock().unwrap().calls.clone()
  }

  pub fn call_count(&self, method: Method, path: &str) -> usize {
    self
      .calls()
      .iter()
      .filter(|c| c.method == method && c.path == path)
      .count()
  }

  fn next(&self, method: Method, path: &str, body: Option<Value>, config: &RequestConfig) -> Scripted {
    let mut inner = self.inner.lock().unwrap();
    inner.calls.push(Call {
      method,
      path: path.to_string(),
      body,
      query: config.query.clone(),
    });

    match inner.routes.get_mut(&(method, path.to_string())) {
      Some(queue) if queue.len() > 1 => queue.remove(0),
      Some(queue) if !queue.is_empty() => queue[0].clone(),
      _ => Scripted {
        delay: Duration::ZERO,
        response: Err(ApiError::Transport {
          status: Some(404),
          server_message: None,
          reason: format!("no scripted response for {} {}", method, path),
        }),
      },
    }
  }
}

#[async_trait]
impl Transport for MockTransport {
  async fn send(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
    config: &RequestConfig,
  ) -> Result<Value, ApiError> {
    let scripted = self.next(method, path, body, config);
    if !scripted.delay.is_zero() {
      tokio::time::sleep(scripted.delay).await;
    }
    scripted.response
  }

  async fn upload(
    &self,
    path: &str,
    form: UploadForm,
    on_progress: Option<ProgressFn>,
    config: &RequestConfig,
  ) -> Result<Value, ApiError> {
    let total = form.total_bytes();
    let names: Vec<String> = form.files.iter().map(|f| f.file_name.clone()).collect();
    if let Some(callback) = on_progress {
      callback(total, total);
    }
    let fields: serde_json::Map<String, Value> = form
      .fields
      .into_iter()
      .map(|(k, v)| (k, Value::String(v)))
      .collect();
    let body = json!({ "files": names, "fields": fields });
    self.send(Method::Post, path, Some(body), config).await
  }

  async fn download(&self, path: &str, config: &RequestConfig) -> Result<Download, ApiError> {
    self.next(Method::Get, path, None, config);
    self
      .inner
      .lock()
      .unwrap()
      .downloads
      .get(path)
      .cloned()
      .ok_or_else(|| ApiError::Transport {
        status: Some(404),
        server_message: None,
        reason: format!("no scripted download for {}", path),
      })
  }
}

/// Successful envelope around `result`.
pub fn ok(result: Value) -> Result<Value, ApiError> {
  Ok(json!({ "isSuccess": true, "message": "", "result": result }))
}

/// Transport-level success carrying `isSuccess: false`.
pub fn business_failure(message: &str) -> Result<Value, ApiError> {
  Ok(json!({ "isSuccess": false, "message": message }))
}

/// Connection-level failure with no server message.
pub fn transport_failure() -> Result<Value, ApiError> {
  Err(ApiError::transport("connection refused"))
}

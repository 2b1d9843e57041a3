//! [`Transport`] over a real HTTP connection.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use futures::{Stream, StreamExt};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::envelope::message_from_body;
use super::error::ApiError;
use super::request::{Download, Method, ProgressFn, RequestConfig, UploadForm};
use super::transport::Transport;

/// Upload bodies are streamed in chunks of this size so progress can be reported.
const UPLOAD_CHUNK: usize = 64 * 1024;

#[derive(Clone)]
pub struct ReqwestTransport {
  http: reqwest::Client,
  base_url: Url,
  token: Option<String>,
}

impl ReqwestTransport {
  pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
    // Url::join drops the last segment unless the base ends with a slash
    let normalized = if base_url.ends_with('/') {
      base_url.to_string()
    } else {
      format!("{}/", base_url)
    };
    let base_url =
      Url::parse(&normalized).map_err(|e| eyre!("Invalid API base URL {}: {}", base_url, e))?;

    let http = reqwest::Client::builder()
      .timeout(timeout)
      .gzip(true)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      token,
    })
  }

  fn url(&self, path: &str) -> Result<Url, ApiError> {
    self
      .base_url
      .join(path.trim_start_matches('/'))
      .map_err(|e| ApiError::transport(format!("invalid request path {}: {}", path, e)))
  }

  fn build(&self, method: Method, path: &str, config: &RequestConfig) -> Result<RequestBuilder, ApiError> {
    let mut request = self
      .http
      .request(method.into(), self.url(path)?)
      .query(&config.query);

    for (name, value) in &config.headers {
      request = request.header(name.as_str(), value.as_str());
    }
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }
    if let Some(timeout) = config.timeout {
      request = request.timeout(timeout);
    }
    Ok(request)
  }

  /// Turn a non-2xx response into a transport error carrying the envelope message.
  async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    Err(ApiError::Transport {
      status: Some(status.as_u16()),
      server_message: message_from_body(&body),
      reason: status.to_string(),
    })
  }

  async fn read_json(response: Response) -> Result<Value, ApiError> {
    let response = Self::check_status(response).await?;
    let body = response.bytes().await?;
    if body.is_empty() {
      return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
  }
}

#[async_trait]
impl Transport for ReqwestTransport {
  async fn send(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
    config: &RequestConfig,
  ) -> Result<Value, ApiError> {
    let mut request = self.build(method, path, config)?;
    if let Some(body) = &body {
      request = request.json(body);
    }

    let response = request.send().await?;
    Self::read_json(response).await
  }

  async fn upload(
    &self,
    path: &str,
    form: UploadForm,
    on_progress: Option<ProgressFn>,
    config: &RequestConfig,
  ) -> Result<Value, ApiError> {
    let total = form.total_bytes();
    let sent = Arc::new(AtomicU64::new(0));

    let mut multipart = Form::new();
    for (name, value) in form.fields {
      multipart = multipart.text(name, value);
    }
    for file in form.files {
      let length = file.bytes.len() as u64;
      let body = progress_body(file.bytes, Arc::clone(&sent), total, on_progress.clone());
      let part = Part::stream_with_length(body, length).file_name(file.file_name);
      multipart = multipart.part(file.field, part);
    }

    let response = self
      .build(Method::Post, path, config)?
      .multipart(multipart)
      .send()
      .await?;
    Self::read_json(response).await
  }

  async fn download(&self, path: &str, config: &RequestConfig) -> Result<Download, ApiError> {
    let response = self.build(Method::Get, path, config)?.send().await?;
    let response = Self::check_status(response).await?;

    let filename = response
      .headers()
      .get(CONTENT_DISPOSITION)
      .and_then(|v| v.to_str().ok())
      .and_then(content_disposition_filename);
    let bytes = response.bytes().await?.to_vec();

    Ok(Download { bytes, filename })
  }
}

fn progress_body(
  bytes: Vec<u8>,
  sent: Arc<AtomicU64>,
  total: u64,
  on_progress: Option<ProgressFn>,
) -> reqwest::Body {
  reqwest::Body::wrap_stream(progress_stream(bytes, sent, total, on_progress))
}

/// Chunks of `bytes`, reporting the running `(sent, total)` as each is yielded.
/// `sent` is shared across the parts of one form.
fn progress_stream(
  bytes: Vec<u8>,
  sent: Arc<AtomicU64>,
  total: u64,
  on_progress: Option<ProgressFn>,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Sync + 'static {
  let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
    bytes.chunks(UPLOAD_CHUNK).map(|c| Ok(c.to_vec())).collect();

  futures::stream::iter(chunks).inspect(move |chunk| {
    if let (Ok(chunk), Some(callback)) = (chunk, &on_progress) {
      let len = chunk.len() as u64;
      let so_far = sent.fetch_add(len, Ordering::Relaxed) + len;
      callback(so_far, total);
    }
  })
}

/// Extract the file name from a `Content-Disposition` header value.
///
/// The RFC 5987 `filename*=charset'lang'percent-encoded` form wins over a
/// plain `filename=` when both are present.
fn content_disposition_filename(header: &str) -> Option<String> {
  let params: Vec<&str> = header.split(';').map(str::trim).collect();

  let extended = params
    .iter()
    .find_map(|param| param.strip_prefix("filename*="))
    .and_then(decode_ext_value);
  if extended.is_some() {
    return extended;
  }

  params
    .iter()
    .find_map(|param| param.strip_prefix("filename="))
    .map(|name| name.trim_matches('"').to_string())
    .filter(|name| !name.is_empty())
}

/// Decode an RFC 5987 ext-value such as `UTF-8''na%C3%AFve.pdf`.
fn decode_ext_value(value: &str) -> Option<String> {
  let mut parts = value.trim_matches('"').splitn(3, '\'');
  let charset = parts.next()?;
  let _language = parts.next()?;
  let encoded = parts.next()?;
  if !charset.eq_ignore_ascii_case("utf-8") {
    return None;
  }
  urlencoding::decode(encoded)
    .ok()
    .map(|name| name.into_owned())
    .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  /// Serve one canned HTTP response on a local port and return its base URL.
  async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut request = Vec::new();
      let mut buf = [0u8; 1024];
      while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
          break;
        }
        request.extend_from_slice(&buf[..n]);
      }
      let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
      );
      socket.write_all(response.as_bytes()).await.unwrap();
      socket.shutdown().await.ok();
    });
    format!("http://{}/api", addr)
  }

  fn transport(base_url: &str) -> ReqwestTransport {
    ReqwestTransport::new(base_url, Some("secret".into()), Duration::from_secs(5)).unwrap()
  }

  #[tokio::test]
  async fn test_error_status_carries_envelope_message() {
    let base = serve_once("400 Bad Request", r#"{"isSuccess":false,"message":"Code already taken"}"#).await;

    let err = transport(&base)
      .send(Method::Post, "companies", None, &RequestConfig::default())
      .await
      .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.server_message(), Some("Code already taken"));
  }

  #[tokio::test]
  async fn test_error_status_without_envelope_has_no_server_message() {
    let base = serve_once("502 Bad Gateway", "<html>upstream down</html>").await;

    let err = transport(&base)
      .send(Method::Get, "companies", None, &RequestConfig::default())
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      ApiError::Transport {
        status: Some(502),
        server_message: None,
        ..
      }
    ));
  }

  #[tokio::test]
  async fn test_success_returns_raw_body() {
    let base = serve_once("200 OK", r#"{"isSuccess":true,"result":[]}"#).await;

    let body = transport(&base)
      .send(Method::Get, "companies", None, &RequestConfig::default())
      .await
      .unwrap();

    assert_eq!(body, serde_json::json!({ "isSuccess": true, "result": [] }));
  }

  #[tokio::test]
  async fn test_progress_reports_cumulative_bytes_per_chunk() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&calls);
    let on_progress: ProgressFn = Arc::new(move |sent: u64, total: u64| {
      recorder.lock().unwrap().push((sent, total));
    });

    let len = UPLOAD_CHUNK * 2 + 100;
    let total = len as u64 + 10;
    let sent = Arc::new(AtomicU64::new(10));
    let chunks: Vec<_> = progress_stream(vec![7u8; len], sent, total, Some(on_progress))
      .collect()
      .await;

    assert_eq!(chunks.len(), 3);
    let chunk = UPLOAD_CHUNK as u64;
    assert_eq!(
      *calls.lock().unwrap(),
      vec![
        (10 + chunk, total),
        (10 + 2 * chunk, total),
        (total, total),
      ]
    );
  }

  #[test]
  fn test_content_disposition_extended_filename() {
    assert_eq!(
      content_disposition_filename(
        "attachment; filename=\"fallback.pdf\"; filename*=UTF-8''na%C3%AFve%20report.pdf"
      ),
      Some("naïve report.pdf".to_string())
    );
    assert_eq!(
      content_disposition_filename("attachment; filename*=ISO-8859-1''x.pdf; filename=x.pdf"),
      Some("x.pdf".to_string())
    );
  }

  #[test]
  fn test_content_disposition_filename() {
    assert_eq!(
      content_disposition_filename(r#"attachment; filename="ScoreCard.xlsx""#),
      Some("ScoreCard.xlsx".to_string())
    );
    assert_eq!(
      content_disposition_filename("attachment; filename=report.pdf"),
      Some("report.pdf".to_string())
    );
    assert_eq!(content_disposition_filename("inline"), None);
  }

  #[test]
  fn test_url_join_keeps_base_path() {
    let transport =
      ReqwestTransport::new("https://admin.example.com/api", None, Duration::from_secs(5)).unwrap();
    assert_eq!(
      transport.url("/companies/c1").unwrap().as_str(),
      "https://admin.example.com/api/companies/c1"
    );
  }
}

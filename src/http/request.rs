use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// HTTP verbs the backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Get,
  Post,
  Put,
  Patch,
  Delete,
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      Method::Get => "GET",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Patch => "PATCH",
      Method::Delete => "DELETE",
    }
  }
}

impl fmt::Display for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<Method> for reqwest::Method {
  fn from(method: Method) -> Self {
    match method {
      Method::Get => reqwest::Method::GET,
      Method::Post => reqwest::Method::POST,
      Method::Put => reqwest::Method::PUT,
      Method::Patch => reqwest::Method::PATCH,
      Method::Delete => reqwest::Method::DELETE,
    }
  }
}

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
  pub query: Vec<(String, String)>,
  pub headers: Vec<(String, String)>,
  /// Overrides the client-wide timeout
  pub timeout: Option<Duration>,
}

impl RequestConfig {
  pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
    self.query.push((key.into(), value.to_string()));
    self
  }

  pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.push((name.into(), value.into()));
    self
  }

  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }
}

/// Upload progress callback, called with `(bytes_sent, bytes_total)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// A file part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
  pub field: String,
  pub file_name: String,
  pub bytes: Vec<u8>,
}

/// Multipart form body.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
  pub fields: Vec<(String, String)>,
  pub files: Vec<UploadFile>,
}

impl UploadForm {
  pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.fields.push((name.into(), value.into()));
    self
  }

  pub fn file(mut self, field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
    self.files.push(UploadFile {
      field: field.into(),
      file_name: file_name.into(),
      bytes,
    });
    self
  }

  /// Total size of all file parts.
  pub fn total_bytes(&self) -> u64 {
    self.files.iter().map(|f| f.bytes.len() as u64).sum()
  }
}

/// Raw download payload.
#[derive(Debug, Clone, Default)]
pub struct Download {
  pub bytes: Vec<u8>,
  /// Filename suggested by the server via `Content-Disposition`
  pub filename: Option<String>,
}

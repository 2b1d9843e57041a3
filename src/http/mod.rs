//! HTTP client boundary.
//!
//! The backend wraps every response in an envelope; this module collapses the
//! envelope and transport failures into one `Result<T, ApiError>`.

mod client;
mod envelope;
mod error;
mod reqwest_transport;
mod request;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use client::ApiClient;
pub use envelope::Envelope;
pub use error::ApiError;
pub use reqwest_transport::ReqwestTransport;
pub use request::{Download, Method, ProgressFn, RequestConfig, UploadFile, UploadForm};
pub use transport::Transport;

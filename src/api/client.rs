use color_eyre::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::config::Config;
use crate::domain::{FileEntry, ScoreCardQuery, ScoreCardReport, Template};
use crate::http::{ApiClient, ApiError, ProgressFn, RequestConfig, ReqwestTransport, UploadForm};
use crate::resource::Entity;

use super::resources::CrudResource;

/// Compliance admin API client
#[derive(Clone)]
pub struct AdminApi {
  client: ApiClient,
}

impl AdminApi {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token();
    if token.is_none() {
      warn!("no API token configured, requests will be unauthenticated");
    }

    let transport = ReqwestTransport::new(
      &config.api.base_url,
      token,
      Duration::from_secs(config.api.timeout_secs),
    )?;

    Ok(Self::with_client(ApiClient::new(transport)))
  }

  pub fn with_client(client: ApiClient) -> Self {
    Self { client }
  }

  pub fn client(&self) -> &ApiClient {
    &self.client
  }

  /// List a collection, optionally scoped to a parent (e.g. sites of a company)
  pub async fn list<T: CrudResource>(&self, scope: Option<&str>) -> Result<Vec<T>, ApiError> {
    let mut config = RequestConfig::default();
    if let (Some(param), Some(scope)) = (T::SCOPE_PARAM, scope) {
      config = config.query(param, scope);
    }
    self.client.get(T::PATH, &config).await
  }

  pub async fn get<T: CrudResource>(&self, id: &str) -> Result<T, ApiError> {
    self
      .client
      .get(&format!("{}/{}", T::PATH, id), &RequestConfig::default())
      .await
  }

  /// Create an entity; the server returns it with its assigned id
  pub async fn create<T: CrudResource>(&self, item: &T) -> Result<T, ApiError> {
    self
      .client
      .post(T::PATH, item, &RequestConfig::default())
      .await
  }

  pub async fn update<T: CrudResource>(&self, item: &T) -> Result<T, ApiError> {
    let path = format!("{}/{}", T::PATH, item.entity_key());
    self.client.put(&path, item, &RequestConfig::default()).await
  }

  pub async fn delete<T: CrudResource>(&self, id: &str) -> Result<(), ApiError> {
    self
      .client
      .delete(&format!("{}/{}", T::PATH, id), &RequestConfig::default())
      .await
  }

  pub async fn list_templates(&self) -> Result<Vec<Template>, ApiError> {
    self
      .client
      .get("templates", &RequestConfig::default())
      .await
  }

  pub async fn upload_template(
    &self,
    name: &str,
    file_name: &str,
    bytes: Vec<u8>,
    on_progress: Option<ProgressFn>,
  ) -> Result<Template, ApiError> {
    let form = UploadForm::default()
      .text("name", name)
      .file("file", file_name, bytes);
    self
      .client
      .upload("templates/upload", form, on_progress, &RequestConfig::default())
      .await
  }

  pub async fn download_template(&self, id: &str, target: Option<&Path>) -> Result<PathBuf, ApiError> {
    self
      .client
      .download(&format!("templates/{}/download", id), target, &RequestConfig::default())
      .await
  }

  /// List uploaded files, optionally within one folder
  pub async fn list_files(&self, folder: Option<&str>) -> Result<Vec<FileEntry>, ApiError> {
    let mut config = RequestConfig::default();
    if let Some(folder) = folder {
      config = config.query("folder", folder);
    }
    self.client.get("files", &config).await
  }

  pub async fn upload_file(
    &self,
    folder: Option<&str>,
    file_name: &str,
    bytes: Vec<u8>,
    on_progress: Option<ProgressFn>,
  ) -> Result<FileEntry, ApiError> {
    let mut form = UploadForm::default().file("file", file_name, bytes);
    if let Some(folder) = folder {
      form = form.text("folder", folder);
    }
    self
      .client
      .upload("files/upload", form, on_progress, &RequestConfig::default())
      .await
  }

  pub async fn delete_file(&self, id: &str) -> Result<(), ApiError> {
    self
      .client
      .delete(&format!("files/{}", id), &RequestConfig::default())
      .await
  }

  pub async fn download_file(&self, id: &str, target: Option<&Path>) -> Result<PathBuf, ApiError> {
    self
      .client
      .download(&format!("files/{}/download", id), target, &RequestConfig::default())
      .await
  }

  pub async fn score_card(&self, query: &ScoreCardQuery) -> Result<ScoreCardReport, ApiError> {
    let mut config = RequestConfig::default()
      .query("from", query.from)
      .query("to", query.to);
    if let Some(company) = &query.company_id {
      config = config.query("companyId", company);
    }
    self.client.get("reports/score-card", &config).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Site;
  use crate::http::mock::{ok, MockTransport};
  use crate::http::Method;
  use serde_json::json;

  #[tokio::test]
  async fn test_scoped_list_sends_scope_param() {
    let mock = MockTransport::new();
    mock.respond(
      Method::Get,
      "sites",
      ok(json!([{ "id": "s1", "companyId": "c1", "name": "Plant 1" }])),
    );
    let api = AdminApi::with_client(ApiClient::new(mock.clone()));

    let sites: Vec<Site> = api.list(Some("c1")).await.unwrap();
    assert_eq!(sites[0].company_id, "c1");
    assert_eq!(
      mock.calls()[0].query,
      vec![("companyId".to_string(), "c1".to_string())]
    );
  }

  #[tokio::test]
  async fn test_upload_reports_progress() {
    let mock = MockTransport::new();
    mock.respond(
      Method::Post,
      "files/upload",
      ok(json!({ "id": "f1", "name": "audit.pdf", "folder": "2024" })),
    );
    let api = AdminApi::with_client(ApiClient::new(mock.clone()));

    let progress = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen = progress.clone();
    let callback: ProgressFn = std::sync::Arc::new(move |sent, total| {
      seen.lock().unwrap().push((sent, total));
    });

    let file = api
      .upload_file(Some("2024"), "audit.pdf", vec![0; 10], Some(callback))
      .await
      .unwrap();
    assert_eq!(file.id, "f1");
    assert_eq!(*progress.lock().unwrap(), vec![(10, 10)]);
    assert_eq!(
      mock.calls()[0].body,
      Some(json!({ "files": ["audit.pdf"], "fields": { "folder": "2024" } }))
    );
  }
}

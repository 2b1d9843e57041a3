//! Per-entity operation wiring over the shared cache.

mod entity;
mod files;
mod score_card;
mod templates;

pub use entity::{EntityStore, StoreOptions};
pub use files::{FileDownload, FileStore, FileUpload};
pub use score_card::ScoreCardStore;
pub use templates::{TemplateDownload, TemplateStore, TemplateUpload};

use crate::api::AdminApi;
use crate::cache::CacheLayer;
use crate::config::Config;
use crate::domain::{ActivityMaster, Company, FileEntry, Site, Template, User};
use crate::resource::Entity;

/// Every store of the dashboard, sharing one API client and one cache.
pub struct AdminStore {
  pub companies: EntityStore<Company>,
  pub sites: EntityStore<Site>,
  pub users: EntityStore<User>,
  pub activities: EntityStore<ActivityMaster>,
  pub templates: TemplateStore,
  pub files: FileStore,
  pub score_card: ScoreCardStore,
  cache: CacheLayer,
}

impl AdminStore {
  pub fn new(api: AdminApi, cache: CacheLayer, config: &Config) -> Self {
    let options = |entity: &str| StoreOptions::from_config(config, entity);

    Self {
      companies: EntityStore::new(api.clone(), cache.clone(), options(Company::entity_type())),
      sites: EntityStore::new(api.clone(), cache.clone(), options(Site::entity_type())),
      users: EntityStore::new(api.clone(), cache.clone(), options(User::entity_type())),
      activities: EntityStore::new(
        api.clone(),
        cache.clone(),
        options(ActivityMaster::entity_type()),
      ),
      templates: TemplateStore::new(api.clone(), cache.clone(), options(Template::entity_type())),
      files: FileStore::new(api.clone(), cache.clone(), options(FileEntry::entity_type())),
      score_card: ScoreCardStore::new(api, cache.clone(), options("score_card")),
      cache,
    }
  }

  pub fn cache(&self) -> &CacheLayer {
    &self.cache
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::mock::{ok, MockTransport};
  use crate::http::{ApiClient, Method};
  use serde_json::json;
  use std::time::Duration;

  #[tokio::test(start_paused = true)]
  async fn test_ttl_override_applies_per_entity() {
    let config = Config::parse(
      "api:\n  base_url: https://admin.example.com/api\ncache:\n  default_ttl_secs: 60\n  ttl_secs:\n    company: 3600\n",
    )
    .unwrap();
    let mock = MockTransport::new();
    mock.respond(Method::Get, "companies", ok(json!([{ "id": "a", "name": "Acme" }])));
    mock.respond(Method::Get, "users", ok(json!([{ "id": "u1", "userName": "ann" }])));
    let store = AdminStore::new(
      AdminApi::with_client(ApiClient::new(mock.clone())),
      CacheLayer::new(),
      &config,
    );

    store.companies.list().trigger(None).await.unwrap();
    store.users.list().trigger(None).await.unwrap();
    tokio::time::advance(Duration::from_secs(120)).await;
    store.companies.list().trigger(None).await.unwrap();
    store.users.list().trigger(None).await.unwrap();

    assert_eq!(mock.call_count(Method::Get, "companies"), 1);
    assert_eq!(mock.call_count(Method::Get, "users"), 2);
    assert_eq!(store.cache().stats().len(), 2);
  }
}

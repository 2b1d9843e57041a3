use std::path::PathBuf;

use crate::api::AdminApi;
use crate::cache::CacheLayer;
use crate::domain::{ResourceKey, Template};
use crate::http::{ApiError, ProgressFn};
use crate::resource::Operation;

use super::entity::StoreOptions;

#[derive(Clone)]
pub struct TemplateUpload {
  pub name: String,
  pub file_name: String,
  pub bytes: Vec<u8>,
  pub on_progress: Option<ProgressFn>,
}

#[derive(Debug, Clone)]
pub struct TemplateDownload {
  pub id: String,
  pub target: Option<PathBuf>,
}

/// Wiring for document templates: cached list, upload, download.
pub struct TemplateStore {
  list: Operation<(), Vec<Template>>,
  upload: Operation<TemplateUpload, Template>,
  download: Operation<TemplateDownload, PathBuf>,
}

impl TemplateStore {
  pub fn new(api: AdminApi, cache: CacheLayer, options: StoreOptions) -> Self {
    let ttl = options.ttl;

    let list = {
      let api = api.clone();
      let cache = cache.clone();
      Operation::read("template list", "Failed to fetch templates", move |()| {
        let api = api.clone();
        let cache = cache.clone();
        async move {
          let key = ResourceKey::list::<Template>(None).cache_key();
          let result = cache.fetch(&key, ttl, || api.list_templates()).await?;
          Ok::<_, ApiError>(result.data)
        }
      })
      .with_sequencing(options.sequencing)
    };

    let upload = {
      let api = api.clone();
      let op = Operation::write(
        "upload template",
        "Failed to upload template",
        move |upload: TemplateUpload| {
          let api = api.clone();
          let cache = cache.clone();
          async move {
            let template = api
              .upload_template(&upload.name, &upload.file_name, upload.bytes, upload.on_progress)
              .await?;
            cache.invalidate(&ResourceKey::list::<Template>(None).cache_key());
            Ok::<_, ApiError>(template)
          }
        },
      );
      if options.append_on_add {
        op.appends_to(&list.list_handle())
      } else {
        op
      }
    };

    let download = Operation::write(
      "download template",
      "Failed to download template",
      move |request: TemplateDownload| {
        let api = api.clone();
        async move {
          api
            .download_template(&request.id, request.target.as_deref())
            .await
        }
      },
    );

    Self {
      list,
      upload,
      download,
    }
  }

  pub fn list(&self) -> &Operation<(), Vec<Template>> {
    &self.list
  }

  pub fn upload(&self) -> &Operation<TemplateUpload, Template> {
    &self.upload
  }

  pub fn download(&self) -> &Operation<TemplateDownload, PathBuf> {
    &self.download
  }
}

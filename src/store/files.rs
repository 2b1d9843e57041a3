use std::path::PathBuf;

use crate::api::AdminApi;
use crate::cache::CacheLayer;
use crate::domain::{FileEntry, ResourceKey};
use crate::http::{ApiError, ProgressFn};
use crate::resource::Operation;

use super::entity::StoreOptions;

/// A file to upload.
#[derive(Clone)]
pub struct FileUpload {
  pub folder: Option<String>,
  pub file_name: String,
  pub bytes: Vec<u8>,
  pub on_progress: Option<ProgressFn>,
}

/// A file to download; `target` defaults to the server-suggested name.
#[derive(Debug, Clone)]
pub struct FileDownload {
  pub id: String,
  pub target: Option<PathBuf>,
}

/// Wiring for the uploaded-file store.
pub struct FileStore {
  list: Operation<Option<String>, Vec<FileEntry>>,
  upload: Operation<FileUpload, FileEntry>,
  delete: Operation<String, ()>,
  download: Operation<FileDownload, PathBuf>,
}

impl FileStore {
  pub fn new(api: AdminApi, cache: CacheLayer, options: StoreOptions) -> Self {
    let ttl = options.ttl;

    let list = {
      let api = api.clone();
      let cache = cache.clone();
      Operation::read("file list", "Failed to fetch files", move |folder: Option<String>| {
        let api = api.clone();
        let cache = cache.clone();
        async move {
          let key = ResourceKey::list::<FileEntry>(folder.as_deref()).cache_key();
          let result = cache
            .fetch(&key, ttl, || api.list_files(folder.as_deref()))
            .await?;
          Ok::<_, ApiError>(result.data)
        }
      })
      .with_sequencing(options.sequencing)
    };

    let handle = list.list_handle();

    let upload = {
      let api = api.clone();
      let cache = cache.clone();
      let op = Operation::write("upload file", "Failed to upload file", move |file: FileUpload| {
        let api = api.clone();
        let cache = cache.clone();
        async move {
          let entry = api
            .upload_file(file.folder.as_deref(), &file.file_name, file.bytes, file.on_progress)
            .await?;
          cache.invalidate_prefix(&ResourceKey::list_prefix::<FileEntry>());
          Ok::<_, ApiError>(entry)
        }
      });
      if options.append_on_add {
        op.appends_to(&handle)
      } else {
        op
      }
    };

    let delete = {
      let api = api.clone();
      Operation::write("delete file", "Failed to delete file", move |id: String| {
        let api = api.clone();
        let cache = cache.clone();
        async move {
          api.delete_file(&id).await?;
          cache.invalidate_prefix(&ResourceKey::list_prefix::<FileEntry>());
          Ok::<_, ApiError>(())
        }
      })
      .removes_from(&handle, |id: &String| id.clone())
    };

    let download = Operation::write(
      "download file",
      "Failed to download file",
      move |request: FileDownload| {
        let api = api.clone();
        async move { api.download_file(&request.id, request.target.as_deref()).await }
      },
    );

    Self {
      list,
      upload,
      delete,
      download,
    }
  }

  /// Input is the optional folder.
  pub fn list(&self) -> &Operation<Option<String>, Vec<FileEntry>> {
    &self.list
  }

  pub fn upload(&self) -> &Operation<FileUpload, FileEntry> {
    &self.upload
  }

  pub fn delete(&self) -> &Operation<String, ()> {
    &self.delete
  }

  pub fn download(&self) -> &Operation<FileDownload, PathBuf> {
    &self.download
  }
}

//! CRUD wiring for entities exposed as standard REST collections.

use std::time::Duration;

use crate::api::{AdminApi, CrudResource};
use crate::cache::CacheLayer;
use crate::config::Config;
use crate::domain::ResourceKey;
use crate::http::ApiError;
use crate::resource::{Entity, Operation, Sequencing};

/// Per-store wiring options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
  pub ttl: Duration,
  pub sequencing: Sequencing,
  pub append_on_add: bool,
}

impl StoreOptions {
  /// Options for the entity type `entity`, with its TTL override if configured.
  pub fn from_config(config: &Config, entity: &str) -> Self {
    Self {
      ttl: config.cache.ttl_for(entity),
      sequencing: config.sequencing,
      append_on_add: config.append_on_add,
    }
  }
}

impl Default for StoreOptions {
  fn default() -> Self {
    Self {
      ttl: Duration::from_secs(5 * 60),
      sequencing: Sequencing::default(),
      append_on_add: false,
    }
  }
}

/// List, fetch-by-id, add, update and delete operations for one entity type.
///
/// Reads go through the shared cache; every successful mutation drops the
/// entity's list keys (and the item key for update/delete). Delete removes the
/// item from the loaded list, update replaces it in place, and add appends
/// only when `append_on_add` is set.
pub struct EntityStore<T> {
  list: Operation<Option<String>, Vec<T>>,
  by_id: Operation<String, T>,
  add: Operation<T, T>,
  update: Operation<T, T>,
  delete: Operation<String, ()>,
}

impl<T: CrudResource> EntityStore<T> {
  pub fn new(api: AdminApi, cache: CacheLayer, options: StoreOptions) -> Self {
    let ttl = options.ttl;

    let list = {
      let api = api.clone();
      let cache = cache.clone();
      Operation::read(
        format!("{} list", T::SINGULAR),
        format!("Failed to fetch {}", T::PLURAL),
        move |scope: Option<String>| {
          let api = api.clone();
          let cache = cache.clone();
          async move {
            let key = ResourceKey::list::<T>(scope.as_deref()).cache_key();
            let result = cache
              .fetch(&key, ttl, || api.list::<T>(scope.as_deref()))
              .await?;
            Ok::<_, ApiError>(result.data)
          }
        },
      )
      .with_sequencing(options.sequencing)
    };

    let by_id = {
      let api = api.clone();
      let cache = cache.clone();
      Operation::read(
        format!("{} by id", T::SINGULAR),
        format!("Failed to fetch {}", T::SINGULAR),
        move |id: String| {
          let api = api.clone();
          let cache = cache.clone();
          async move {
            let key = ResourceKey::item::<T>(&id).cache_key();
            let result = cache.fetch(&key, ttl, || api.get::<T>(&id)).await?;
            Ok::<_, ApiError>(result.data)
          }
        },
      )
      .with_sequencing(options.sequencing)
    };

    let handle = list.list_handle();

    let add = {
      let api = api.clone();
      let cache = cache.clone();
      let op = Operation::write(
        format!("add {}", T::SINGULAR),
        format!("Failed to add {}", T::SINGULAR),
        move |item: T| {
          let api = api.clone();
          let cache = cache.clone();
          async move {
            let created = api.create(&item).await?;
            cache.invalidate_prefix(&ResourceKey::list_prefix::<T>());
            Ok::<_, ApiError>(created)
          }
        },
      );
      if options.append_on_add {
        op.appends_to(&handle)
      } else {
        op
      }
    };

    let update = {
      let api = api.clone();
      let cache = cache.clone();
      Operation::write(
        format!("update {}", T::SINGULAR),
        format!("Failed to update {}", T::SINGULAR),
        move |item: T| {
          let api = api.clone();
          let cache = cache.clone();
          async move {
            let updated = api.update(&item).await?;
            cache.invalidate_prefix(&ResourceKey::list_prefix::<T>());
            cache.invalidate(&ResourceKey::item::<T>(&item.entity_key()).cache_key());
            Ok::<_, ApiError>(updated)
          }
        },
      )
      .replaces_in(&handle)
    };

    let delete = Operation::write(
      format!("delete {}", T::SINGULAR),
      format!("Failed to delete {}", T::SINGULAR),
      move |id: String| {
        let api = api.clone();
        let cache = cache.clone();
        async move {
          api.delete::<T>(&id).await?;
          cache.invalidate_prefix(&ResourceKey::list_prefix::<T>());
          cache.invalidate(&ResourceKey::item::<T>(&id).cache_key());
          Ok::<_, ApiError>(())
        }
      },
    )
    .removes_from(&handle, |id: &String| id.clone());

    Self {
      list,
      by_id,
      add,
      update,
      delete,
    }
  }

  /// Input is the optional parent scope (e.g. company id for sites).
  pub fn list(&self) -> &Operation<Option<String>, Vec<T>> {
    &self.list
  }

  pub fn by_id(&self) -> &Operation<String, T> {
    &self.by_id
  }

  pub fn add(&self) -> &Operation<T, T> {
    &self.add
  }

  pub fn update(&self) -> &Operation<T, T> {
    &self.update
  }

  pub fn delete(&self) -> &Operation<String, ()> {
    &self.delete
  }
}

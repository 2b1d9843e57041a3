//! Side-effect hooks for list-backed resources.

use std::sync::Weak;
use tokio::sync::watch;

use super::state::ResourceState;
use super::traits::Entity;

impl<E: Entity> ResourceState<Vec<E>> {
  /// Remove the element with identity `key`. No match leaves the list unchanged.
  pub fn remove_item(&mut self, key: &str) -> bool {
    self.update_data(|items| {
      let before = items.len();
      items.retain(|item| item.entity_key() != key);
      items.len() != before
    })
  }

  /// Replace the element with the same identity in place. Never inserts.
  pub fn replace_item(&mut self, item: &E) -> bool {
    let key = item.entity_key();
    self.update_data(|items| match items.iter_mut().find(|i| i.entity_key() == key) {
      Some(existing) => {
        *existing = item.clone();
        true
      }
      None => false,
    })
  }

  pub fn append_item(&mut self, item: &E) -> bool {
    self.update_data(|items| {
      items.push(item.clone());
      true
    })
  }
}

/// Handle through which other operations edit a list resource's data.
///
/// Holds the list weakly: once the owning operation is dropped every edit is a
/// no-op. Watchers are only notified when the list actually changed.
pub struct ListHandle<E> {
  pub(super) state: Weak<watch::Sender<ResourceState<Vec<E>>>>,
}

impl<E: Entity> ListHandle<E> {
  pub fn remove(&self, key: &str) -> bool {
    self.edit(|state| state.remove_item(key))
  }

  pub fn replace(&self, item: &E) -> bool {
    self.edit(|state| state.replace_item(item))
  }

  pub fn append(&self, item: &E) -> bool {
    self.edit(|state| state.append_item(item))
  }

  fn edit(&self, f: impl FnOnce(&mut ResourceState<Vec<E>>) -> bool) -> bool {
    match self.state.upgrade() {
      Some(state) => state.send_if_modified(f),
      None => false,
    }
  }
}

impl<E> Clone for ListHandle<E> {
  fn clone(&self) -> Self {
    Self {
      state: Weak::clone(&self.state),
    }
  }
}

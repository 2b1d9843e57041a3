//! Generic lifecycle engine for network-backed operations.
//!
//! An `Operation<I, T>` wraps an async function `I -> Result<T, ApiError>` and
//! tracks its Idle/Pending/Succeeded/Failed state, so callers can ask "is
//! this in flight, did it fail, did it just succeed" without per-feature
//! boilerplate.
//!
//! # Example
//!
//! ```ignore
//! let api = api.clone();
//! let companies = Operation::read("company list", "Failed to fetch companies", move |()| {
//!     let api = api.clone();
//!     async move { api.get::<Vec<Company>>("companies", &RequestConfig::default()).await }
//! });
//!
//! // Moves to Pending before the future is polled
//! let pending = companies.trigger(());
//! assert!(companies.is_loading());
//! pending.await?;
//! ```

use futures::future::BoxFuture;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::list::ListHandle;
use super::state::{OperationKind, ResourceError, ResourceState, Status};
use super::traits::Entity;
use crate::http::ApiError;

/// How overlapping attempts of one operation are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Sequencing {
  /// Every completed response is applied in completion order, so the most
  /// recently completed call wins even if it was issued first.
  #[default]
  #[serde(rename = "last_response")]
  LastResponseWins,
  /// Responses from attempts superseded by a newer `trigger` do not touch
  /// the state. Reads drop them entirely; writes still run their success
  /// hooks.
  #[serde(rename = "latest_request")]
  LatestRequestWins,
}

type Runner<I, T> = Arc<dyn Fn(I) -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;
type Hook<I, T> = Arc<dyn Fn(&I, &T) + Send + Sync>;

/// A named remote operation with its own lifecycle state.
pub struct Operation<I, T> {
  name: String,
  kind: OperationKind,
  /// Error message used when the failure carries no server message
  fallback: String,
  sequencing: Sequencing,
  state: Arc<watch::Sender<ResourceState<T>>>,
  runner: Runner<I, T>,
  hooks: Vec<Hook<I, T>>,
}

impl<I, T> Operation<I, T>
where
  I: Clone + Send + Sync + 'static,
  T: Clone + Send + Sync + 'static,
{
  /// A read operation: success stores the value as `data`.
  pub fn read<F, Fut>(name: impl Into<String>, fallback: impl Into<String>, runner: F) -> Self
  where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    Self::new(OperationKind::Read, name.into(), fallback.into(), runner)
  }

  /// A write operation: success raises the success flag (and keeps the
  /// returned value as `data`).
  pub fn write<F, Fut>(name: impl Into<String>, fallback: impl Into<String>, runner: F) -> Self
  where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    Self::new(OperationKind::Write, name.into(), fallback.into(), runner)
  }

  fn new<F, Fut>(kind: OperationKind, name: String, fallback: String, runner: F) -> Self
  where
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    let (state, _) = watch::channel(ResourceState::default());
    Self {
      name,
      kind,
      fallback,
      sequencing: Sequencing::default(),
      state: Arc::new(state),
      runner: Arc::new(move |input| Box::pin(runner(input))),
      hooks: Vec::new(),
    }
  }

  pub fn with_sequencing(mut self, sequencing: Sequencing) -> Self {
    self.sequencing = sequencing;
    self
  }

  /// Run `hook` after every applied success.
  pub fn on_success<H>(mut self, hook: H) -> Self
  where
    H: Fn(&I, &T) + Send + Sync + 'static,
  {
    self.hooks.push(Arc::new(hook));
    self
  }

  /// On success, remove the element keyed by `key(input)` from `list`.
  pub fn removes_from<E, K>(self, list: &ListHandle<E>, key: K) -> Self
  where
    E: Entity,
    K: Fn(&I) -> String + Send + Sync + 'static,
  {
    let list = list.clone();
    self.on_success(move |input, _| {
      list.remove(&key(input));
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn kind(&self) -> OperationKind {
    self.kind
  }

  pub fn status(&self) -> Status {
    self.state.borrow().status()
  }

  pub fn is_loading(&self) -> bool {
    self.state.borrow().is_loading()
  }

  pub fn data(&self) -> Option<T> {
    self.state.borrow().data().cloned()
  }

  pub fn error(&self) -> Option<ResourceError> {
    self.state.borrow().error().cloned()
  }

  pub fn is_success(&self) -> bool {
    self.state.borrow().is_success()
  }

  pub fn snapshot(&self) -> ResourceState<T> {
    self.state.borrow().clone()
  }

  /// Receiver notified on every state transition.
  pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
    self.state.subscribe()
  }

  pub fn dismiss_error(&self) {
    self.state.send_modify(ResourceState::dismiss_error);
  }

  pub fn dismiss_success(&self) {
    self.state.send_modify(ResourceState::dismiss_success);
  }

  pub fn reset(&self) {
    self.state.send_modify(ResourceState::reset);
  }

  /// Start an attempt.
  ///
  /// The state is `Pending` as soon as this returns; the returned future
  /// drives the request and applies its outcome. Failures come back already
  /// normalized. If this operation is dropped before the request completes,
  /// the outcome is still returned but nothing is applied.
  pub fn trigger(&self, input: I) -> impl Future<Output = Result<T, ResourceError>> + Send + 'static {
    let mut generation = 0;
    self.state.send_modify(|s| generation = s.start());
    debug!(operation = %self.name, generation, "started");

    let call = (self.runner)(input.clone());
    let state = Arc::downgrade(&self.state);
    let hooks = self.hooks.clone();
    let name = self.name.clone();
    let fallback = self.fallback.clone();
    let kind = self.kind;
    let sequencing = self.sequencing;

    async move {
      let outcome = call.await;

      let Some(state) = state.upgrade() else {
        debug!(operation = %name, "completed after operation was dropped");
        return outcome.map_err(|e| ResourceError::from_api(&e, &fallback));
      };

      let superseded = sequencing == Sequencing::LatestRequestWins
        && state.borrow().generation() != generation;

      match outcome {
        Ok(value) => {
          if superseded && kind == OperationKind::Read {
            debug!(operation = %name, generation, "discarding superseded response");
            return Ok(value);
          }
          // Superseded writes keep their side effects; the state belongs to the newer attempt
          if superseded {
            debug!(operation = %name, generation, "superseded write, applying side effects only");
          } else {
            state.send_modify(|s| s.succeed(value.clone(), kind));
          }
          for hook in &hooks {
            hook(&input, &value);
          }
          debug!(operation = %name, generation, "succeeded");
          Ok(value)
        }
        Err(e) => {
          let error = ResourceError::from_api(&e, &fallback);
          if superseded {
            debug!(operation = %name, generation, "discarding superseded failure");
            return Err(error);
          }
          warn!(operation = %name, generation, error = %e, "failed");
          state.send_modify(|s| s.fail(error.clone()));
          Err(error)
        }
      }
    }
  }

  /// [`Operation::trigger`] on a background task.
  pub fn spawn(&self, input: I) -> JoinHandle<Result<T, ResourceError>> {
    tokio::spawn(self.trigger(input))
  }
}

impl<I, E> Operation<I, E>
where
  I: Clone + Send + Sync + 'static,
  E: Entity,
{
  /// On success, replace the matching element of `list` with the returned entity.
  pub fn replaces_in(self, list: &ListHandle<E>) -> Self {
    let list = list.clone();
    self.on_success(move |_, entity| {
      list.replace(entity);
    })
  }

  /// On success, append the returned entity to `list`.
  pub fn appends_to(self, list: &ListHandle<E>) -> Self {
    let list = list.clone();
    self.on_success(move |_, entity| {
      list.append(entity);
    })
  }
}

impl<I, E> Operation<I, Vec<E>> {
  /// Hook handle other operations use to edit this list.
  pub fn list_handle(&self) -> ListHandle<E> {
    ListHandle {
      state: Arc::downgrade(&self.state),
    }
  }
}

impl<I, T: std::fmt::Debug> std::fmt::Debug for Operation<I, T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Operation")
      .field("name", &self.name)
      .field("kind", &self.kind)
      .field("sequencing", &self.sequencing)
      .field("state", &*self.state.borrow())
      .finish_non_exhaustive()
  }
}

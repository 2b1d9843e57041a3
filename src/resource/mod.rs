//! Async resource lifecycle.
//!
//! Every remote operation (list fetch, fetch by id, add, update, delete, ...)
//! gets its own `Operation` with independent state, so one operation's
//! loading or error never leaks into another's.

mod list;
mod operation;
mod state;
mod traits;

pub use list::ListHandle;
pub use operation::{Operation, Sequencing};
pub use state::{OperationKind, ResourceError, ResourceState, Status};
pub use traits::Entity;

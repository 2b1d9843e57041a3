//! Process-wide caching of slow-changing reference data.
//!
//! This module provides:
//! - `TtlCache`: a thread-safe key/value store whose entries expire after a TTL
//! - `CacheLayer`: cache-first fetching over a shared `TtlCache` of JSON values
//! - `CacheStats`: diagnostic snapshots of entry ages and hit/miss counters

mod layer;
mod traits;
mod ttl;

pub use layer::CacheLayer;
pub use traits::{CacheResult, CacheSource};
pub use ttl::{CacheStats, EntryStats, TtlCache};

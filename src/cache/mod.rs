//! Result caching for "on this day" lookups.
//!
//! Lookups are keyed by the query-relevant part of the widget configuration
//! and expire at the next local midnight, when "today" changes.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! backend = "memory"   # or "file"
//! capacity = 256
//! directory = "cache"  # used by the file backend
//! ```

mod config;
mod keys;
mod store;
mod ttl;

pub use config::{CacheBackend, CacheConfig};
pub use keys::{CACHE_NAMESPACE, cache_key};
pub use store::{DisabledResultCache, MemoryResultCache, ResultCache};
pub use ttl::{DAY, seconds_left_in_day, ttl};

//! Schema caching shared by every question in a session.

pub mod clock;
pub mod schema_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use schema_cache::{CacheStats, SchemaCache, SchemaCacheEntry};

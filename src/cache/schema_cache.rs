//! # Schema Cache
//!
//! Memoizes table schemas across questions so the SQL-generation stage does not pay a
//! database round trip per table per question. Two independent expiry rules apply:
//!
//! - **Per-entry TTL**, checked lazily when an entry is read. Stale entries are evicted
//!   by the read that finds them; nothing sweeps in the background.
//! - **Question-count reset**, where the whole cache is dropped once `max_questions`
//!   questions have completed, bounding schema drift over a long session.
//!
//! All state lives behind one mutex so each read-then-write sequence is atomic with
//! respect to concurrent questions.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::database::TableSchema;

/// A cached schema and the time it was stored
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaCacheEntry {
    pub schema: TableSchema,
    pub inserted_at: DateTime<Utc>,
}

#[derive(Debug)]
struct CacheState {
    entries: HashMap<String, SchemaCacheEntry>,
    question_count: u32,
    created_at: DateTime<Utc>,
}

impl CacheState {
    fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            entries: HashMap::new(),
            question_count: 0,
            created_at,
        }
    }
}

/// Point-in-time view of the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub cached_table_names: Vec<String>,
    pub entry_count: usize,
    pub questions_since_creation: u32,
    pub cache_age_seconds: i64,
    pub cache_age_minutes: i64,
}

pub struct SchemaCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    max_questions: u32,
    clock: Arc<dyn Clock>,
}

impl SchemaCache {
    pub fn new(ttl_minutes: u32, max_questions: u32) -> Self {
        Self::with_clock(ttl_minutes, max_questions, Arc::new(SystemClock))
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl_minutes, config.max_questions)
    }

    pub fn with_clock(ttl_minutes: u32, max_questions: u32, clock: Arc<dyn Clock>) -> Self {
        info!(ttl_minutes, max_questions, "Schema cache initialized");
        Self {
            state: Mutex::new(CacheState::new(clock.now())),
            ttl: Duration::minutes(i64::from(ttl_minutes)),
            max_questions,
            clock,
        }
    }

    /// Look up a table's schema, evicting it if it has outlived the TTL
    pub fn get(&self, table_name: &str) -> Option<TableSchema> {
        let now = self.clock.now();
        let mut state = self.state.lock();

        let expired = match state.entries.get(table_name) {
            None => {
                debug!(table = %table_name, "Schema cache miss");
                return None;
            }
            Some(entry) => now - entry.inserted_at > self.ttl,
        };

        if expired {
            state.entries.remove(table_name);
            debug!(table = %table_name, "Schema cache entry expired and evicted");
            return None;
        }

        debug!(table = %table_name, "Schema cache hit");
        state.entries.get(table_name).map(|entry| entry.schema.clone())
    }

    /// Insert or overwrite, resetting the entry's age
    pub fn set(&self, table_name: impl Into<String>, schema: TableSchema) {
        let table_name = table_name.into();
        let inserted_at = self.clock.now();
        debug!(table = %table_name, "Schema cached");
        self.state.lock().entries.insert(
            table_name,
            SchemaCacheEntry {
                schema,
                inserted_at,
            },
        );
    }

    /// Count a completed question; clears everything once the threshold is reached.
    ///
    /// Returns `true` when this call triggered the reset.
    pub fn note_question_completed(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.question_count += 1;

        if state.question_count >= self.max_questions {
            *state = CacheState::new(now);
            info!(
                max_questions = self.max_questions,
                "Schema cache cleared after question limit"
            );
            return true;
        }
        false
    }

    pub fn clear(&self) {
        let now = self.clock.now();
        *self.state.lock() = CacheState::new(now);
        info!("Schema cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let state = self.state.lock();

        let mut cached_table_names: Vec<String> = state.entries.keys().cloned().collect();
        cached_table_names.sort();
        let age = now - state.created_at;

        CacheStats {
            entry_count: cached_table_names.len(),
            cached_table_names,
            questions_since_creation: state.question_count,
            cache_age_seconds: age.num_seconds(),
            cache_age_minutes: age.num_minutes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::database::ColumnInfo;

    fn schema(table: &str) -> TableSchema {
        TableSchema {
            table_name: table.to_string(),
            columns: vec![ColumnInfo {
                name: "id".to_string(),
                data_type: "INTEGER".to_string(),
                nullable: false,
                is_primary_key: true,
                default: None,
            }],
        }
    }

    fn cache_with_clock(ttl_minutes: u32, max_questions: u32) -> (SchemaCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = SchemaCache::with_clock(ttl_minutes, max_questions, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_set_then_get_within_ttl() {
        let (cache, clock) = cache_with_clock(30, 20);
        cache.set("customers", schema("customers"));
        clock.advance(Duration::minutes(29));
        assert_eq!(cache.get("customers"), Some(schema("customers")));
    }

    #[test]
    fn test_entry_at_exact_ttl_is_still_valid() {
        let (cache, clock) = cache_with_clock(30, 20);
        cache.set("customers", schema("customers"));
        clock.advance(Duration::minutes(30));
        assert!(cache.get("customers").is_some());
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let (cache, clock) = cache_with_clock(30, 20);
        cache.set("customers", schema("customers"));
        clock.advance(Duration::minutes(30) + Duration::seconds(1));

        assert_eq!(cache.stats().entry_count, 1);
        assert_eq!(cache.get("customers"), None);
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn test_set_resets_entry_age() {
        let (cache, clock) = cache_with_clock(10, 20);
        cache.set("orders", schema("orders"));
        clock.advance(Duration::minutes(8));
        cache.set("orders", schema("orders"));
        clock.advance(Duration::minutes(8));
        assert!(cache.get("orders").is_some());
    }

    #[test]
    fn test_question_limit_clears_cache() {
        let (cache, _clock) = cache_with_clock(30, 3);
        cache.set("customers", schema("customers"));
        cache.set("orders", schema("orders"));

        assert!(!cache.note_question_completed());
        assert!(!cache.note_question_completed());
        assert_eq!(cache.stats().questions_since_creation, 2);
        assert!(cache.note_question_completed());

        let stats = cache.stats();
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.questions_since_creation, 0);
        assert!(cache.get("customers").is_none());
        assert!(cache.get("orders").is_none());
    }

    #[test]
    fn test_clear_resets_age_and_counter() {
        let (cache, clock) = cache_with_clock(30, 20);
        cache.set("products", schema("products"));
        cache.note_question_completed();
        clock.advance(Duration::minutes(7));
        assert_eq!(cache.stats().cache_age_minutes, 7);

        cache.clear();
        let stats = cache.stats();
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.questions_since_creation, 0);
        assert_eq!(stats.cache_age_seconds, 0);
    }

    #[test]
    fn test_stats_lists_tables_sorted() {
        let (cache, _clock) = cache_with_clock(30, 20);
        cache.set("orders", schema("orders"));
        cache.set("customers", schema("customers"));
        assert_eq!(
            cache.stats().cached_table_names,
            vec!["customers".to_string(), "orders".to_string()]
        );
    }
}

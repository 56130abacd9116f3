//! Process-local query result cache (C10): memoizes a rendered
//! [`AssistantResponse`] keyed by `(campaignUuid, normalized_query_string)`,
//! with a TTL and explicit per-campaign invalidation.
//!
//! Built on `dashmap` for the concurrent-map shape, the way
//! `CloudLLM`-style connector crates in this ecosystem reach for `dashmap`
//! over a `Mutex<HashMap<..>>` when reads vastly outnumber writes. A
//! per-key `tokio::sync::Mutex` guards the get-or-populate path so that two
//! concurrent misses for the same key don't both pay for a full pipeline
//! run (single-flight, per the concurrency model's recommendation).

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::types::AssistantResponse;

#[derive(Clone)]
struct Entry {
    response: AssistantResponse,
    inserted_at: Instant,
}

/// Normalizes a query string the way the cache key requires: strip
/// surrounding whitespace, lowercase. Richer normalization is intentionally
/// not performed — it must stay deterministic and cheap.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

#[derive(Clone, Hash, PartialEq, Eq)]
struct CacheKey {
    campaign_id: Uuid,
    normalized_query: String,
}

/// The query result cache. One instance is shared (via `Arc`) across all
/// requests for the process's lifetime.
pub struct QueryResultCache {
    ttl: Duration,
    entries: DashMap<CacheKey, Entry>,
    in_flight: DashMap<CacheKey, Arc<Mutex<()>>>,
}

impl QueryResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
            in_flight: DashMap::new(),
        }
    }

    fn key(campaign_id: Uuid, query: &str) -> CacheKey {
        CacheKey {
            campaign_id,
            normalized_query: normalize_query(query),
        }
    }

    /// Returns a cached, still-fresh response if one exists.
    pub fn get(&self, campaign_id: Uuid, query: &str) -> Option<AssistantResponse> {
        let key = Self::key(campaign_id, query);
        let entry = self.entries.get(&key)?;
        if entry.inserted_at.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(&key);
            return None;
        }
        Some(entry.response.clone())
    }

    /// Stores `response` unless it is an error response (errors are never
    /// cached).
    pub fn put(&self, campaign_id: Uuid, query: &str, response: AssistantResponse) {
        if !response.is_cacheable() {
            return;
        }
        let key = Self::key(campaign_id, query);
        self.entries.insert(
            key,
            Entry {
                response,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Returns the single-flight guard for `(campaign_id, query)`, creating
    /// one if absent. Callers should acquire the guard's lock, re-check
    /// `get`, and only run the full pipeline on a second miss.
    pub fn in_flight_guard(&self, campaign_id: Uuid, query: &str) -> Arc<Mutex<()>> {
        let key = Self::key(campaign_id, query);
        self.in_flight
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Evicts all entries for a campaign. Called synchronously from the
    /// ingestion collaborator's commit path (outside this crate) to
    /// guarantee read-your-writes.
    pub fn invalidate_all(&self, campaign_id: Uuid) {
        self.entries.retain(|key, _| key.campaign_id != campaign_id);
        self.in_flight.retain(|key, _| key.campaign_id != campaign_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssistantResponse, ResponseType};

    fn sample_response(response_type: ResponseType) -> AssistantResponse {
        AssistantResponse {
            response_type,
            error_type: None,
            text_response: "hi".to_string(),
            graph_data: None,
            sources: vec![],
            executed_actions: vec![],
            debug_info: None,
        }
    }

    #[test]
    fn normalizes_whitespace_and_case() {
        assert_eq!(normalize_query("  What Happened?  "), "what happened?");
    }

    #[test]
    fn hit_after_put_within_ttl() {
        let cache = QueryResultCache::new(Duration::from_secs(60));
        let campaign = Uuid::new_v4();
        cache.put(campaign, "Who is Adam?", sample_response(ResponseType::Text));
        assert!(cache.get(campaign, "who is adam?").is_some());
    }

    #[test]
    fn error_responses_are_never_cached() {
        let cache = QueryResultCache::new(Duration::from_secs(60));
        let campaign = Uuid::new_v4();
        cache.put(campaign, "q", sample_response(ResponseType::Error));
        assert!(cache.get(campaign, "q").is_none());
    }

    #[test]
    fn expired_entries_are_evicted_on_read() {
        let cache = QueryResultCache::new(Duration::from_millis(1));
        let campaign = Uuid::new_v4();
        cache.put(campaign, "q", sample_response(ResponseType::Text));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(campaign, "q").is_none());
    }

    #[test]
    fn invalidate_all_clears_only_that_campaign() {
        let cache = QueryResultCache::new(Duration::from_secs(60));
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        cache.put(a, "q", sample_response(ResponseType::Text));
        cache.put(b, "q", sample_response(ResponseType::Text));
        cache.invalidate_all(a);
        assert!(cache.get(a, "q").is_none());
        assert!(cache.get(b, "q").is_some());
    }
}

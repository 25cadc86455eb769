//! Path-keyed response cache.
//!
//! Stores fully rendered responses keyed by request path, bounded by an LRU
//! limit. An entry is served only while it is younger than the configured
//! revalidation interval; stale entries are evicted on access and recomputed
//! by the next handler run. Explicit invalidation removes entries ahead of
//! the interval.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use lru::LruCache;

use crate::config::CacheSettings;

use super::lock::rw_write;

const SOURCE: &str = "cache::store";

pub struct ResponseCache {
    entries: RwLock<LruCache<String, CachedEntry>>,
    revalidate: Duration,
}

#[derive(Clone)]
pub struct CachedEntry {
    status: StatusCode,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Bytes,
    stored_at: Instant,
}

impl CachedEntry {
    pub fn new(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Self {
        let mut stored_headers = Vec::with_capacity(headers.len());
        for (name, value) in headers.iter() {
            stored_headers.push((name.clone(), value.clone()));
        }

        Self {
            status,
            headers: stored_headers,
            body,
            stored_at: Instant::now(),
        }
    }

    fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }

    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.clear();
        for (name, value) in self.headers {
            headers.append(name, value);
        }

        response
    }
}

impl ResponseCache {
    pub fn new(config: &CacheSettings) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.max_entries)),
            revalidate: config.revalidate,
        }
    }

    /// Fetch a fresh entry for the path. Entries past the revalidation
    /// interval are dropped here and read as a miss.
    pub fn get(&self, path: &str) -> Option<CachedEntry> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let stale = match entries.get(path) {
            Some(entry) if entry.age() < self.revalidate => return Some(entry.clone()),
            Some(_) => true,
            None => false,
        };
        if stale {
            entries.pop(path);
        }
        None
    }

    pub fn put(&self, path: String, entry: CachedEntry) {
        rw_write(&self.entries, SOURCE, "put").put(path, entry);
    }

    /// Remove one path. Returns whether an entry was present.
    pub fn invalidate(&self, path: &str) -> bool {
        rw_write(&self.entries, SOURCE, "invalidate")
            .pop(path)
            .is_some()
    }

    pub fn invalidate_all(&self) {
        rw_write(&self.entries, SOURCE, "invalidate_all").clear();
    }

    pub fn len(&self) -> usize {
        rw_write(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    fn cache(revalidate: Duration, max_entries: usize) -> ResponseCache {
        ResponseCache::new(&CacheSettings {
            enabled: true,
            revalidate,
            max_entries: NonZeroUsize::new(max_entries).unwrap(),
        })
    }

    fn entry(body: &str) -> CachedEntry {
        CachedEntry::new(StatusCode::OK, &HeaderMap::new(), Bytes::from(body.to_string()))
    }

    #[test]
    fn stores_and_serves_fresh_entries() {
        let cache = cache(Duration::from_secs(60), 8);
        cache.put("/about".to_string(), entry("about page"));

        assert!(cache.get("/about").is_some());
        assert!(cache.get("/contact").is_none());
    }

    #[test]
    fn stale_entries_read_as_miss_and_are_evicted() {
        let cache = cache(Duration::ZERO, 8);
        cache.put("/".to_string(), entry("home"));

        // Zero interval: immediately stale.
        assert!(cache.get("/").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_removes_only_the_named_path() {
        let cache = cache(Duration::from_secs(60), 8);
        cache.put("/blog".to_string(), entry("listing"));
        cache.put("/blog/hello".to_string(), entry("detail"));

        assert!(cache.invalidate("/blog"));
        assert!(!cache.invalidate("/blog"));
        assert!(cache.get("/blog").is_none());
        assert!(cache.get("/blog/hello").is_some());
    }

    #[test]
    fn lru_bound_holds() {
        let cache = cache(Duration::from_secs(60), 2);
        cache.put("/a".to_string(), entry("a"));
        cache.put("/b".to_string(), entry("b"));
        cache.put("/c".to_string(), entry("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("/a").is_none());
    }

    #[test]
    fn cached_entry_round_trips_into_response() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/html"));
        let entry = CachedEntry::new(StatusCode::OK, &headers, Bytes::from_static(b"<p>hi</p>"));

        let response = entry.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html"
        );
    }
}

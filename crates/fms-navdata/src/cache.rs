//! Response cache keyed by request path.
//!
//! Navigation data changes once per AIRAC cycle, so responses are kept for
//! a fixed time and the map is bounded by evicting the oldest entries.

use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CachedResponse {
    body: Value,
    fetched_at: Instant,
}

#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CachedResponse>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries,
        }
    }

    /// Fresh cached body for `path`. Expired entries are dropped on read.
    pub fn get(&self, path: &str) -> Option<Value> {
        {
            let entry = self.entries.get(path)?;
            if entry.fetched_at.elapsed() <= self.ttl {
                return Some(entry.body.clone());
            }
        }
        self.entries.remove(path);
        None
    }

    pub fn insert(&self, path: &str, body: Value) {
        self.entries.insert(
            path.to_string(),
            CachedResponse {
                body,
                fetched_at: Instant::now(),
            },
        );
        self.prune();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drop expired entries, then the oldest ones until the size bound holds.
    pub fn prune(&self) {
        let now = Instant::now();
        let mut ages: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().fetched_at))
            .collect();

        ages.retain(|(path, fetched_at)| {
            let stale = now.duration_since(*fetched_at) > self.ttl;
            if stale {
                self.entries.remove(path);
            }
            !stale
        });

        if self.entries.len() <= self.max_entries {
            return;
        }

        ages.sort_by_key(|(_, fetched_at)| *fetched_at);
        for (path, _) in ages {
            if self.entries.len() <= self.max_entries {
                break;
            }
            self.entries.remove(&path);
        }
    }
}

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tastemap_core::errors::EngineError;
use tokio::sync::Mutex;

/// Cached recommendation payloads keyed by `(endpoint, filter signature)`.
///
/// Single writer per key: the first request for a missing or stale key
/// computes while holding that key's entry lock; concurrent requests for
/// the same key await the lock and then read the freshly stored value
/// instead of recomputing. Different keys never contend. Failed
/// computations are not cached.
pub struct ScoreCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Arc<Entry>>>,
}

/// Map size at which inserting a new key first sweeps out expired entries,
/// so the map stays bounded by the working set instead of growing with
/// every distinct key ever requested.
const SWEEP_THRESHOLD: usize = 256;

#[derive(Default)]
struct Entry {
    slot: Mutex<Option<(Instant, serde_json::Value)>>,
}

impl ScoreCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    async fn entry(&self, key: &str) -> Arc<Entry> {
        let mut entries = self.entries.lock().await;
        if entries.len() >= SWEEP_THRESHOLD {
            let ttl = self.ttl;
            entries.retain(|_, entry| match entry.slot.try_lock() {
                // A locked slot has a computation in flight; keep it.
                Err(_) => true,
                Ok(slot) => {
                    slot.as_ref().is_some_and(|(stored_at, _)| stored_at.elapsed() < ttl)
                }
            });
        }
        Arc::clone(entries.entry(key.to_string()).or_default())
    }

    #[cfg(test)]
    pub(crate) async fn entry_count(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &str,
        compute: F,
    ) -> Result<serde_json::Value, EngineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, EngineError>>,
    {
        let entry = self.entry(key).await;
        let mut slot = entry.slot.lock().await;

        if let Some((stored_at, value)) = slot.as_ref() {
            if stored_at.elapsed() < self.ttl {
                return Ok(value.clone());
            }
        }

        let value = compute().await?;
        *slot = Some((Instant::now(), value.clone()));
        Ok(value)
    }

    /// Drop every cached entry, e.g. after the record store changed.
    pub async fn invalidate_all(&self) {
        self.entries.lock().await.clear();
    }
}

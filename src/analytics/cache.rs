/// Single-slot cache for generated insights
///
/// One well-known key in the local key-value store holds the last insight
/// together with when it was made and the fingerprint of the statistics it
/// describes. Stale, mismatched or unreadable entries are evicted when read.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, StorageError};

pub const CACHE_KEY: &str = "ai_insights_cache";

/// Entries older than this are misses
pub const CACHE_TTL_HOURS: i64 = 24;

/// The persisted cache record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedInsight {
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub fingerprint: String,
}

impl CachedInsight {
    /// A hit needs a younger-than-TTL entry for the same fingerprint
    pub fn is_valid_for(&self, fingerprint: &str, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at < ttl && self.fingerprint == fingerprint
    }
}

pub struct InsightCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl InsightCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            ttl: Duration::hours(CACHE_TTL_HOURS),
        }
    }

    /// Return the cached text if the slot holds a valid entry
    ///
    /// Any entry that fails the check is removed before the miss is
    /// reported. Storage errors also count as misses.
    pub async fn lookup(&self, fingerprint: &str, now: DateTime<Utc>) -> Option<String> {
        let raw = match self.store.get(CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read insight cache: {}", e);
                return None;
            }
        };

        let entry: CachedInsight = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding corrupt insight cache entry: {}", e);
                self.evict().await;
                return None;
            }
        };

        if !entry.is_valid_for(fingerprint, now, self.ttl) {
            tracing::debug!(
                expired = now - entry.created_at >= self.ttl,
                fingerprint_changed = entry.fingerprint != fingerprint,
                "Insight cache entry is stale"
            );
            self.evict().await;
            return None;
        }

        Some(entry.text)
    }

    /// Write the slot, replacing whatever was there
    pub async fn store(
        &self,
        text: &str,
        fingerprint: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let entry = CachedInsight {
            text: text.to_string(),
            created_at: now,
            fingerprint: fingerprint.to_string(),
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.set(CACHE_KEY, &raw).await?;
        tracing::debug!("Insight cached");
        Ok(())
    }

    /// Remove the slot unconditionally
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(CACHE_KEY).await
    }

    async fn evict(&self) {
        if let Err(e) = self.clear().await {
            tracing::warn!("Failed to evict insight cache entry: {}", e);
        }
    }
}

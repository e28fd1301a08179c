use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, instrument};

use crate::feed::Feed;
use crate::fetch::{FeedSource, FetchError};

type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;
type Slot = Arc<AsyncMutex<Option<CacheEntry>>>;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub feed: Arc<Feed>,
    pub fetched_at: OffsetDateTime,
}

impl CacheEntry {
    /// An entry is fresh while its age does not exceed the TTL (the boundary itself is still fresh).
    pub fn is_fresh(&self, now: OffsetDateTime, ttl: Duration) -> bool {
        now - self.fetched_at <= ttl
    }
}

/// Keeps the most recently fetched feed of every user who has been asked for.
///
/// Each user has their own slot guarded by an async mutex, so concurrent requests for a user whose
/// entry is missing or stale wait for a single upstream fetch instead of issuing one each.
/// A failed fetch leaves the slot as it was, and a slot that never held an entry is dropped again
/// once nobody else is waiting on it.
pub struct FeedCache<S> {
    source: S,
    ttl: Duration,
    clock: Clock,
    slots: Mutex<HashMap<String, Slot>>,
}

impl<S: FeedSource> FeedCache<S> {
    pub fn new(source: S, ttl: std::time::Duration) -> Self {
        Self {
            source,
            ttl: Duration::try_from(ttl).unwrap_or(Duration::MAX),
            clock: Arc::new(OffsetDateTime::now_utc),
            slots: Default::default(),
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: impl Fn() -> OffsetDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);

        self
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    fn slot(&self, username: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());

        slots.entry(username.into()).or_default().clone()
    }

    /// Removes the slot of `username` if it is still empty and only the map and the caller hold it.
    fn release_vacant(&self, username: &str, slot: &Slot) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());

        // New handles are only handed out under the map lock, so the count cannot grow here.
        let vacant = Arc::strong_count(slot) == 2
            && slot.try_lock().is_ok_and(|entry| entry.is_none())
            && slots.get(username).is_some_and(|s| Arc::ptr_eq(s, slot));

        if vacant {
            slots.remove(username);
        }
    }

    /// Returns the feed of `username`, fetching it if the cached copy is missing or stale.
    #[instrument(level = "DEBUG", skip(self))]
    pub async fn resolve(&self, username: &str) -> Result<Arc<Feed>, FetchError> {
        let slot = self.slot(username);
        let mut entry = slot.lock().await;

        if let Some(entry) = entry.as_ref() {
            if entry.is_fresh((self.clock)(), self.ttl) {
                debug!("Cache hit");

                return Ok(entry.feed.clone());
            }

            debug!(fetched_at = %entry.fetched_at, "Cache entry expired");
        } else {
            debug!("Cache miss");
        }

        let feed = match self.source.fetch(username).await {
            Ok(feed) => Arc::new(feed),

            Err(e) => {
                let vacant = entry.is_none();
                drop(entry);

                if vacant {
                    self.release_vacant(username, &slot);
                }

                return Err(e);
            }
        };

        *entry = Some(CacheEntry {
            feed: feed.clone(),
            fetched_at: (self.clock)(),
        });

        Ok(feed)
    }

    /// Returns the cached entry of `username` without fetching anything.
    #[cfg(test)]
    pub async fn get(&self, username: &str) -> Option<CacheEntry> {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(username)
            .cloned()?;
        let entry = slot.lock().await;

        entry.clone()
    }

    #[cfg(test)]
    pub fn slot_count(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[cfg(test)]
    pub async fn insert(&self, username: &str, entry: CacheEntry) {
        *self.slot(username).lock().await = Some(entry);
    }
}

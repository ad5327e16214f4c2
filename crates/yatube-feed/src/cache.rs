//! Process-wide feed cache.
//!
//! Entries live until their TTL passes or the cache is cleared. Writes to
//! the store never touch it, so a cached feed can be stale for up to one
//! TTL. Concurrent misses may both fill the same key; the last write wins,
//! and both writers computed the same value.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use tracing::{debug, warn};

use yatube_types::models::Post;

pub type CachedPosts = Arc<Vec<Post>>;

pub trait FeedCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedPosts>;
    fn set(&self, key: &str, posts: CachedPosts, ttl: Duration);
    fn clear(&self);
}

struct Entry {
    posts: CachedPosts,
    expires_at: DateTime<Utc>,
}

pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// A TTL past what the calendar can hold never expires.
    fn expiry(&self, ttl: Duration) -> DateTime<Utc> {
        TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| self.clock.utc().checked_add_signed(ttl))
            .unwrap_or_else(|| {
                warn!(ttl_secs = ttl.as_secs(), "cache TTL out of range, entry never expires");
                DateTime::<Utc>::MAX_UTC
            })
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedCache for MemoryCache {
    fn get(&self, key: &str) -> Option<CachedPosts> {
        let now = self.clock.utc();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Some(entry.posts.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it so the map doesn't hold dead feeds.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
            debug!(key, "cache entry expired");
        }
        None
    }

    fn set(&self, key: &str, posts: CachedPosts, ttl: Duration) {
        let expires_at = self.expiry(ttl);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), Entry { posts, expires_at });
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("cache cleared");
    }
}

/// Never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl FeedCache for NoCache {
    fn get(&self, _key: &str) -> Option<CachedPosts> {
        None
    }

    fn set(&self, _key: &str, _posts: CachedPosts, _ttl: Duration) {}

    fn clear(&self) {}
}

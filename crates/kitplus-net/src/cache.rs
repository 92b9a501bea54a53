//! Response cache keyed by URL.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;

use crate::transport::HttpResponse;

/// Stores successful responses by request URL.
pub trait UrlCache: Send + Sync {
    fn cached_response(&self, url: &str) -> Option<HttpResponse>;

    fn store(&self, url: &str, response: HttpResponse);
}

/// In-memory LRU cache bounded by entry count. Bodies larger than
/// `max_entry_bytes` are not stored.
pub struct MemoryUrlCache {
    entries: Mutex<LruCache<String, HttpResponse>>,
    max_entry_bytes: usize,
}

impl MemoryUrlCache {
    pub fn new(capacity: usize, max_entry_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            max_entry_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, HttpResponse>> {
        // Entries stay consistent even if a holder panicked
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl UrlCache for MemoryUrlCache {
    fn cached_response(&self, url: &str) -> Option<HttpResponse> {
        self.lock().get(url).cloned()
    }

    fn store(&self, url: &str, response: HttpResponse) {
        if response.body.len() > self.max_entry_bytes {
            log::debug!(
                "not caching {url}: {} bytes exceeds {}",
                response.body.len(),
                self.max_entry_bytes
            );
            return;
        }
        self.lock().put(url.to_string(), response);
    }
}

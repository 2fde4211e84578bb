/*!
 * Process-lifetime meaning cache.
 *
 * First tier of the dictionary lookup. Clones share storage and counters.
 */

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use log::debug;

/// Hit and miss counters of the session tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionStats {
    pub hits: usize,
    pub misses: usize,
    /// Fraction of lookups answered from memory, 0.0 to 1.0
    pub hit_rate: f64,
}

impl std::fmt::Display for SessionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} hits, {} misses ({:.1}% hit rate)",
            self.hits,
            self.misses,
            self.hit_rate * 100.0
        )
    }
}

/// In-memory word to meaning map
pub struct SessionCache {
    /// Internal cache storage
    cache: Arc<RwLock<HashMap<String, String>>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
        }
    }

    /// Get a meaning from the cache
    pub fn get(&self, word: &str) -> Option<String> {
        let cache = self.cache.read();

        match cache.get(word) {
            Some(meaning) => {
                *self.hits.write() += 1;
                debug!("Session cache hit for '{}'", word);
                Some(meaning.clone())
            }
            None => {
                *self.misses.write() += 1;
                debug!("Session cache miss for '{}'", word);
                None
            }
        }
    }

    /// Store a meaning in the cache
    pub fn store(&self, word: &str, meaning: &str) {
        self.cache.write().insert(word.to_string(), meaning.to_string());
    }

    pub fn stats(&self) -> SessionStats {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        SessionStats { hits, misses, hit_rate }
    }

    /// Drop all entries and reset the counters
    pub fn clear(&self) {
        self.cache.write().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;
        debug!("Session cache cleared");
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SessionCache {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
        }
    }
}

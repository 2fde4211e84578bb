/*!
 * Three-tier meaning lookup: session cache, persistent store, remote service.
 */

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::remote::MeaningService;
use super::session::{SessionCache, SessionStats};

/// Persistent tier of the dictionary
#[async_trait]
pub trait MeaningStore: Send + Sync {
    async fn get_meaning(&self, word: &str) -> anyhow::Result<Option<String>>;

    /// Insert a meaning. Inserting a word that is already stored is not an error.
    async fn put_meaning(&self, word: &str, meaning: &str) -> anyhow::Result<()>;
}

/// Tiered dictionary lookup
pub struct DictionaryCache {
    session: SessionCache,
    store: Option<Arc<dyn MeaningStore>>,
    remote: Arc<dyn MeaningService>,
}

impl DictionaryCache {
    pub fn new(session: SessionCache, store: Option<Arc<dyn MeaningStore>>, remote: Arc<dyn MeaningService>) -> Self {
        Self { session, store, remote }
    }

    /// Resolve a word to its meaning.
    ///
    /// Misses and remote failures yield `None`; nothing is retried.
    pub async fn lookup(&self, word: &str) -> Option<String> {
        if let Some(meaning) = self.session.get(word) {
            return Some(meaning);
        }

        if let Some(store) = &self.store {
            match store.get_meaning(word).await {
                Ok(Some(meaning)) => {
                    debug!("Persistent cache hit for '{}'", word);
                    self.session.store(word, &meaning);
                    return Some(meaning);
                }
                Ok(None) => {}
                Err(e) => warn!("Persistent cache read failed for '{}': {}", word, e),
            }
        }

        let meaning = match self.remote.fetch_meaning(word).await {
            Ok(Some(meaning)) => meaning,
            Ok(None) => {
                info!("No dictionary entry for '{}'", word);
                return None;
            }
            Err(e) => {
                warn!("Dictionary lookup failed for '{}': {}", word, e);
                return None;
            }
        };

        if let Some(store) = &self.store {
            if let Err(e) = store.put_meaning(word, &meaning).await {
                warn!("Failed to persist meaning for '{}': {}", word, e);
            }
        }
        self.session.store(word, &meaning);

        Some(meaning)
    }

    /// Resolve several words in order. Only found meanings are returned.
    pub async fn lookup_batch(&self, words: &[String]) -> HashMap<String, String> {
        let mut results = HashMap::new();

        for word in words {
            if let Some(meaning) = self.lookup(word).await {
                results.insert(word.clone(), meaning);
            }
        }

        results
    }

    pub fn session_stats(&self) -> SessionStats {
        self.session.stats()
    }

    pub fn session(&self) -> &SessionCache {
        &self.session
    }
}

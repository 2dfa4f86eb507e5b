// Caller-owned memoization of parsed sources.
//
// Entries are keyed by source id plus a digest of the source bytes, so an
// edited file misses the cache on its own. Nothing is evicted unless the
// caller asks.
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source_id: String,
    pub version_hash: String,
}

impl CacheKey {
    pub fn new(source_id: &str, bytes: &[u8]) -> Self {
        CacheKey {
            source_id: source_id.to_string(),
            version_hash: version_hash(bytes),
        }
    }
}

/// Hex SHA-256 of the raw source bytes.
pub fn version_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[derive(Debug)]
pub struct SourceCache<T> {
    entries: HashMap<CacheKey, Arc<T>>,
}

impl<T> Default for SourceCache<T> {
    fn default() -> Self {
        SourceCache { entries: HashMap::new() }
    }
}

impl<T> SourceCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<T>> {
        self.entries.get(key).cloned()
    }

    /// Return the cached value for these exact bytes, or run `load` and keep
    /// its result. A new version of a source replaces the old entry. Errors
    /// from `load` are not cached.
    pub fn get_or_try_insert<E, F>(&mut self, source_id: &str, bytes: &[u8], load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce(&[u8]) -> Result<T, E>,
    {
        let key = CacheKey::new(source_id, bytes);
        if let Some(hit) = self.entries.get(&key) {
            debug!(source = source_id, "cache hit");
            return Ok(Arc::clone(hit));
        }
        debug!(source = source_id, hash = %key.version_hash, "cache miss");
        let value = Arc::new(load(bytes)?);
        self.invalidate(source_id);
        self.entries.insert(key, Arc::clone(&value));
        Ok(value)
    }

    /// Forget every version of `source_id`. Returns how many entries went.
    pub fn invalidate(&mut self, source_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| k.source_id != source_id);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

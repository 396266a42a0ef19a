use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

use super::buffer::SampleBuffer;
use super::decode::decode_bytes;
use crate::error::{AnalysisError, Result};

/// Decoded buffers keyed by the content hash of the encoded file.
///
/// Owned by the caller and passed to whatever needs it; holds at most
/// `max_entries` buffers and evicts the least recently used one on overflow.
pub struct BufferCache {
    entries: HashMap<String, Arc<SampleBuffer>>,
    order: VecDeque<String>,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl BufferCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries: max_entries.max(1),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &str) -> Option<Arc<SampleBuffer>> {
        let value = self.entries.get(key).cloned();
        if value.is_some() {
            self.touch(key);
        }
        value
    }

    pub fn insert(&mut self, key: String, value: Arc<SampleBuffer>) {
        self.entries.insert(key.clone(), value);
        self.touch(&key);
        self.evict_overflow();
    }

    /// Read `path`, return the cached buffer for identical bytes, else decode
    /// and remember the result.
    pub fn load(&mut self, path: &Path) -> Result<Arc<SampleBuffer>> {
        let bytes = std::fs::read(path).map_err(|e| AnalysisError::decode(path, e))?;
        let key = hash_bytes(&bytes);
        if let Some(buffer) = self.get(&key) {
            self.hits += 1;
            log::debug!("Buffer cache hit for {}", path.display());
            return Ok(buffer);
        }
        self.misses += 1;
        let buffer = Arc::new(decode_bytes(path, bytes)?);
        self.insert(key, Arc::clone(&buffer));
        Ok(buffer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    fn touch(&mut self, key: &str) {
        self.order.retain(|existing| existing != key);
        self.order.push_front(key.to_string());
    }

    fn evict_overflow(&mut self) {
        while self.order.len() > self.max_entries {
            if let Some(removed) = self.order.pop_back() {
                log::debug!("Evicting cached buffer {}", removed);
                self.entries.remove(&removed);
            }
        }
    }
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

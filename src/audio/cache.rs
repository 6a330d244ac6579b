use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::audio::buffer::AudioBuffer;

/// Decoded clips keyed by symbol id. Append-only: entries are never evicted
/// or replaced, the inventory bounds its size. Clones share the same store.
#[derive(Clone, Default)]
pub struct AudioCache {
    entries: Arc<Mutex<HashMap<String, Arc<AudioBuffer>>>>,
}

impl AudioCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<AudioBuffer>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, id: &str) -> Option<Arc<AudioBuffer>> {
        self.lock().get(id).cloned()
    }

    /// First insert wins; returns the buffer now stored under `id`.
    pub fn put(&self, id: &str, buffer: Arc<AudioBuffer>) -> Arc<AudioBuffer> {
        self.lock()
            .entry(id.to_string())
            .or_insert(buffer)
            .clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

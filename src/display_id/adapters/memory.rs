//! In-memory display identifier allocator.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::display_id::{
    domain::{DisplayId, IdPrefix, SequenceCounters},
    ports::{DisplayIdAllocator, DisplayIdAllocatorError, DisplayIdAllocatorResult},
};

/// Thread-safe allocator backed by per-prefix counters behind a mutex.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDisplayIdAllocator {
    counters: Arc<Mutex<SequenceCounters>>,
}

impl InMemoryDisplayIdAllocator {
    /// Creates an allocator with nothing issued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DisplayIdAllocator for InMemoryDisplayIdAllocator {
    async fn allocate(&self, prefix: &IdPrefix) -> DisplayIdAllocatorResult<DisplayId> {
        let mut counters = self.counters.lock().map_err(|err| {
            DisplayIdAllocatorError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(counters.next(prefix)?)
    }

    async fn last_issued(&self, prefix: &IdPrefix) -> DisplayIdAllocatorResult<u64> {
        let counters = self.counters.lock().map_err(|err| {
            DisplayIdAllocatorError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(counters.last_issued(prefix))
    }
}

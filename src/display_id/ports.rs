//! Allocator port for display identifiers.

use super::domain::{DisplayId, DisplayIdError, IdPrefix};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for display identifier allocation.
pub type DisplayIdAllocatorResult<T> = Result<T, DisplayIdAllocatorError>;

/// Atomic per-prefix counter.
///
/// Implementations must never return the same sequence number twice for a
/// prefix, including under concurrent callers.
#[async_trait]
pub trait DisplayIdAllocator: Send + Sync {
    /// Issues the next identifier for `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayIdAllocatorError::DisplayId`] when the counter is
    /// exhausted or [`DisplayIdAllocatorError::Persistence`] on storage
    /// failure.
    async fn allocate(&self, prefix: &IdPrefix) -> DisplayIdAllocatorResult<DisplayId>;

    /// Returns the highest sequence number issued for `prefix`, or zero.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayIdAllocatorError::Persistence`] on storage failure.
    async fn last_issued(&self, prefix: &IdPrefix) -> DisplayIdAllocatorResult<u64>;
}

/// Errors returned by allocator implementations.
#[derive(Debug, Clone, Error)]
pub enum DisplayIdAllocatorError {
    /// The identifier could not be formed.
    #[error(transparent)]
    DisplayId(#[from] DisplayIdError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DisplayIdAllocatorError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

//! Transactional store port for a workspace catalog.

use crate::tracker::domain::{Catalog, IntegrityViolation};
use crate::tracker::error::EngineResult;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Transactional access to one workspace [`Catalog`].
///
/// A transaction works on an attached copy of the catalog. The copy is
/// committed only when the closure succeeds and the structural invariants
/// verify; otherwise the committed state is left untouched, so no partial
/// cascade is ever observable.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Runs `f` against the committed catalog.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or [`StoreError`] when the catalog cannot
    /// be loaded.
    async fn read<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&Catalog) -> EngineResult<T> + Send,
        T: Send;

    /// Runs `f` against a working copy and commits it atomically.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, [`StoreError::Integrity`] when the
    /// working copy violates a structural invariant, or another
    /// [`StoreError`] when the commit fails. Nothing is committed in any of
    /// these cases.
    async fn transact<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Catalog) -> EngineResult<T> + Send,
        T: Send;
}

/// Errors raised by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),

    /// A concurrent transaction committed first; the caller may retry.
    #[error("transaction conflicted with a concurrent commit")]
    Conflict,

    /// The working copy failed verification and was discarded.
    #[error("transaction rejected: {0}")]
    Integrity(#[from] IntegrityViolation),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

//! In-memory workspace store.

use async_trait::async_trait;
use mockable::Clock;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::config::EngineConfig;
use crate::display_id::{
    domain::{DisplayId, IdPrefix},
    ports::{DisplayIdAllocator, DisplayIdAllocatorError, DisplayIdAllocatorResult},
};
use crate::tracker::{
    domain::Catalog,
    error::EngineResult,
    ports::{StoreError, WorkspaceStore},
};

/// Thread-safe store holding one committed catalog.
///
/// Transactions are serialised behind the write lock, so two cascades or two
/// cycle checks can never interleave. Readers see either the state before a
/// transaction or the state after it.
#[derive(Debug, Clone)]
pub struct InMemoryWorkspaceStore {
    state: Arc<RwLock<Catalog>>,
}

impl InMemoryWorkspaceStore {
    /// Creates a store whose catalog holds only the protected defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when `config` names an invalid default team, task
    /// type or workflow.
    pub fn bootstrap(config: &EngineConfig, clock: &impl Clock) -> EngineResult<Self> {
        Ok(Self::from_catalog(Catalog::bootstrap(config, clock)?))
    }

    /// Creates a store around an existing catalog.
    #[must_use]
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            state: Arc::new(RwLock::new(catalog)),
        }
    }
}

fn poisoned(err: &impl ToString) -> StoreError {
    StoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl WorkspaceStore for InMemoryWorkspaceStore {
    async fn read<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&Catalog) -> EngineResult<T> + Send,
        T: Send,
    {
        let catalog = self.state.read().map_err(|err| poisoned(&err))?;
        f(&catalog)
    }

    async fn transact<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Catalog) -> EngineResult<T> + Send,
        T: Send,
    {
        let mut committed = self.state.write().map_err(|err| poisoned(&err))?;
        let mut working = committed.clone();
        let value = f(&mut working)?;
        if let Err(violation) = working.verify_integrity() {
            debug!(%violation, "discarding working copy");
            return Err(StoreError::from(violation).into());
        }
        *committed = working;
        Ok(value)
    }
}

#[async_trait]
impl DisplayIdAllocator for InMemoryWorkspaceStore {
    async fn allocate(&self, prefix: &IdPrefix) -> DisplayIdAllocatorResult<DisplayId> {
        let mut catalog = self.state.write().map_err(|err| {
            DisplayIdAllocatorError::persistence(std::io::Error::other(err.to_string()))
        })?;
        catalog.issue_display_id(prefix).map_err(Into::into)
    }

    async fn last_issued(&self, prefix: &IdPrefix) -> DisplayIdAllocatorResult<u64> {
        let catalog = self.state.read().map_err(|err| {
            DisplayIdAllocatorError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(catalog.last_issued(prefix))
    }
}

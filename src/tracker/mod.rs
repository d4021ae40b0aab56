//! Teams, types, tasks and projects kept consistent under mutation.
//!
//! The context follows hexagonal architecture:
//!
//! - The [`domain::Catalog`] aggregate and entity types in [`domain`]
//! - The transactional [`ports::WorkspaceStore`] contract in [`ports`]
//! - The in-memory store in [`adapters`]
//! - Registry, directory, task, project and cascade services in [`services`]
//!
//! Every failure surfaces as an [`EngineError`].

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{EngineError, EngineResult};

#[cfg(test)]
mod tests;

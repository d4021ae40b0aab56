//! Port contracts for tracker persistence.

mod store;

pub use store::{StoreError, WorkspaceStore};

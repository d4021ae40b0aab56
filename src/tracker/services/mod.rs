//! Application services over a [`WorkspaceStore`](crate::tracker::ports::WorkspaceStore).
//!
//! Every operation runs as exactly one store call: lookups as a read, every
//! mutation (including a whole cascade) as one transaction.

mod cascade;
mod directory;
mod projects;
mod registry;
mod tasks;

pub use cascade::CascadeCoordinator;
pub use directory::{DirectoryService, TeamDefinition};
pub use projects::ProjectService;
pub use registry::{SchemaRegistryService, TypeDefinition};
pub use tasks::TaskService;

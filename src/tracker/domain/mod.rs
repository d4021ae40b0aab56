//! Domain model for the work tracker.
//!
//! Entities are plain values with validated constructors. The [`Catalog`]
//! aggregate owns every entity of a workspace together with the task and
//! project dependency graphs, and is the only place multi-entity rules are
//! enforced.

mod catalog;
mod entity;
mod error;
mod ids;
mod project;
mod project_type;
mod release;
mod slug;
mod task;
mod task_type;
mod team;
mod theme;

pub use catalog::{
    CascadeSummary, Catalog, Disposal, IntegrityViolation, StatusCount, StatusReassignment,
    StatusRemoval, TeamStats, TypeStats, UnassignedDefaults,
};
pub use entity::{EntityKind, EntityRef, SchemaOwner};
pub use error::TrackerDomainError;
pub use ids::{ProjectId, ProjectTypeId, ReleaseId, TaskId, TaskTypeId, TeamId, ThemeId};
pub use project::{NewProject, Project, ProjectFilter, ProjectUpdate};
pub use project_type::ProjectType;
pub use release::{Release, ReleaseStatus};
pub use slug::Slug;
pub use task::{NewTask, Task, TaskFilter, TaskUpdate};
pub use task_type::TaskType;
pub use team::Team;
pub use theme::{Theme, ThemeFilter, ThemeStatus};

//! Error taxonomy surfaced by tracker operations.

use super::domain::{EntityKind, EntityRef, TaskTypeId, TeamId, TrackerDomainError};
use super::ports::StoreError;
use crate::display_id::domain::DisplayIdError;
use crate::graph::DependencyError;
use crate::schema::domain::SchemaError;
use crate::schema::validation::ValidationError;
use thiserror::Error;

/// Result type for tracker operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Uniqueness conflicts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Conflict {
    /// The workflow already holds the label, ignoring case.
    #[error("status '{status}' already exists in the workflow")]
    DuplicateStatus {
        /// The rejected label.
        status: String,
    },

    /// The slug is already taken within its scope.
    #[error("{kind} slug '{slug}' is already in use")]
    DuplicateSlug {
        /// Kind of the entity owning the slug.
        kind: EntityKind,
        /// The rejected slug.
        slug: String,
    },

    /// Another release already uses the version.
    #[error("release version '{version}' is already in use")]
    DuplicateReleaseVersion {
        /// The rejected version.
        version: String,
    },
}

/// Reasons a reassignment target is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidTarget {
    /// The target status is the status being removed.
    #[error("target status '{status}' is the status being removed")]
    SameStatus {
        /// The offending status.
        status: String,
    },

    /// The target status is not part of the destination workflow.
    #[error("target status '{status}' is not part of the workflow")]
    StatusNotInWorkflow {
        /// The offending status.
        status: String,
    },

    /// The target is the entity being removed or migrated.
    #[error("{0} cannot be its own reassignment target")]
    SameEntity(EntityRef),

    /// The task type belongs to a different team than required.
    #[error("task type {task_type} belongs to team {actual}, expected team {expected}")]
    TeamMismatch {
        /// The offending task type.
        task_type: TaskTypeId,
        /// The team the type had to belong to.
        expected: TeamId,
        /// The team the type belongs to.
        actual: TeamId,
    },
}

/// Failures of tracker operations.
///
/// Every variant carries enough detail for a caller to render an actionable
/// message.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(EntityRef),

    /// A status or custom-data value does not satisfy the current schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A dependency edge mutation was rejected.
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// A uniqueness constraint was violated.
    #[error(transparent)]
    Conflict(#[from] Conflict),

    /// The status is still used and cannot be removed directly.
    #[error("{count} entities still use status '{status}'")]
    Blocked {
        /// The status in use.
        status: String,
        /// Number of tasks or projects using it.
        count: usize,
    },

    /// Removing the status requires a target status for its users.
    #[error("{count} entities still use status '{status}'; choose a target status")]
    TargetRequired {
        /// The status being removed.
        status: String,
        /// Number of tasks or projects that need a target.
        count: usize,
    },

    /// The supplied reassignment target is itself invalid.
    #[error(transparent)]
    InvalidTarget(#[from] InvalidTarget),

    /// The entity is a protected default and cannot be deleted.
    #[error("{0} is protected and cannot be deleted")]
    ProtectedEntity(EntityRef),

    /// A workflow or field definition is malformed.
    #[error(transparent)]
    Schema(SchemaError),

    /// An entity failed construction checks.
    #[error(transparent)]
    Domain(#[from] TrackerDomainError),

    /// A display identifier could not be issued or parsed.
    #[error(transparent)]
    DisplayId(#[from] DisplayIdError),

    /// The store failed or rejected the transaction.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SchemaError> for EngineError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::DuplicateStatus(status) => Conflict::DuplicateStatus { status }.into(),
            SchemaError::UnknownStatus(status) => ValidationError::InvalidStatus { status }.into(),
            other => Self::Schema(other),
        }
    }
}

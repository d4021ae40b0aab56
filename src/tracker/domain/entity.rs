//! Entity kinds and typed references used in error reporting.

use super::{ProjectId, ProjectTypeId, ReleaseId, TaskId, TaskTypeId, TeamId, ThemeId};
use crate::display_id::domain::DisplayId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of tracker entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A team.
    Team,
    /// A team-scoped task type.
    TaskType,
    /// A project type.
    ProjectType,
    /// A task.
    Task,
    /// A project.
    Project,
    /// A theme grouping projects.
    Theme,
    /// A release grouping tasks.
    Release,
}

impl EntityKind {
    /// Returns a human-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::TaskType => "task type",
            Self::ProjectType => "project type",
            Self::Task => "task",
            Self::Project => "project",
            Self::Theme => "theme",
            Self::Release => "release",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed reference to one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// Team by identifier.
    Team(TeamId),
    /// Task type by identifier.
    TaskType(TaskTypeId),
    /// Project type by identifier.
    ProjectType(ProjectTypeId),
    /// Task by identifier.
    Task(TaskId),
    /// Task by display identifier.
    TaskDisplayId(DisplayId),
    /// Project by identifier.
    Project(ProjectId),
    /// Theme by identifier.
    Theme(ThemeId),
    /// Release by identifier.
    Release(ReleaseId),
}

impl EntityRef {
    /// Returns the kind of the referenced entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Team(_) => EntityKind::Team,
            Self::TaskType(_) => EntityKind::TaskType,
            Self::ProjectType(_) => EntityKind::ProjectType,
            Self::Task(_) | Self::TaskDisplayId(_) => EntityKind::Task,
            Self::Project(_) => EntityKind::Project,
            Self::Theme(_) => EntityKind::Theme,
            Self::Release(_) => EntityKind::Release,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            Self::Team(id) => write!(f, "{kind} {id}"),
            Self::TaskType(id) => write!(f, "{kind} {id}"),
            Self::ProjectType(id) => write!(f, "{kind} {id}"),
            Self::Task(id) => write!(f, "{kind} {id}"),
            Self::TaskDisplayId(id) => write!(f, "{kind} {id}"),
            Self::Project(id) => write!(f, "{kind} {id}"),
            Self::Theme(id) => write!(f, "{kind} {id}"),
            Self::Release(id) => write!(f, "{kind} {id}"),
        }
    }
}

/// Type whose workflow and field schema govern a task or project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaOwner {
    /// A task type.
    TaskType(TaskTypeId),
    /// A project type.
    ProjectType(ProjectTypeId),
}

impl SchemaOwner {
    /// Returns the owner as an entity reference.
    #[must_use]
    pub const fn entity_ref(self) -> EntityRef {
        match self {
            Self::TaskType(id) => EntityRef::TaskType(id),
            Self::ProjectType(id) => EntityRef::ProjectType(id),
        }
    }
}

impl From<TaskTypeId> for SchemaOwner {
    fn from(id: TaskTypeId) -> Self {
        Self::TaskType(id)
    }
}

impl From<ProjectTypeId> for SchemaOwner {
    fn from(id: ProjectTypeId) -> Self {
        Self::ProjectType(id)
    }
}

impl fmt::Display for SchemaOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entity_ref().fmt(f)
    }
}

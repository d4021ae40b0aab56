//! Task records and their create and update requests.

use super::{
    EntityKind, ProjectId, ReleaseId, TaskId, TaskTypeId, TeamId, TrackerDomainError,
    error::optional_text, error::required_text,
};
use crate::display_id::domain::DisplayId;
use crate::schema::domain::{CustomData, StatusLabel};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

const MAX_TITLE_LENGTH: usize = 255;

/// A unit of work owned by one team and typed by one of its task types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    display_id: DisplayId,
    title: String,
    description: Option<String>,
    estimation: Option<String>,
    team_id: TeamId,
    task_type_id: TaskTypeId,
    project_id: Option<ProjectId>,
    release_id: Option<ReleaseId>,
    status: StatusLabel,
    custom_data: CustomData,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Team, type, status and custom data that have been validated together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TaskPlacement {
    pub(crate) team_id: TeamId,
    pub(crate) task_type_id: TaskTypeId,
    pub(crate) status: StatusLabel,
    pub(crate) custom_data: CustomData,
}

impl Task {
    /// Builds a task from a title already checked by `task_title`.
    pub(crate) fn new(
        display_id: DisplayId,
        title: String,
        request: NewTask,
        placement: TaskPlacement,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            display_id,
            title,
            description: optional_text(request.description),
            estimation: optional_text(request.estimation),
            team_id: placement.team_id,
            task_type_id: placement.task_type_id,
            project_id: request.project_id,
            release_id: request.release_id,
            status: placement.status,
            custom_data: placement.custom_data,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns the internal identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the immutable display identifier.
    #[must_use]
    pub const fn display_id(&self) -> &DisplayId {
        &self.display_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the free-form estimation, if any.
    #[must_use]
    pub fn estimation(&self) -> Option<&str> {
        self.estimation.as_deref()
    }

    /// Returns the owning team.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the task type.
    #[must_use]
    pub const fn task_type_id(&self) -> TaskTypeId {
        self.task_type_id
    }

    /// Returns the linked project, if any.
    #[must_use]
    pub const fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Returns the linked release, if any.
    #[must_use]
    pub const fn release_id(&self) -> Option<ReleaseId> {
        self.release_id
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> &StatusLabel {
        &self.status
    }

    /// Returns the validated custom data.
    #[must_use]
    pub const fn custom_data(&self) -> &CustomData {
        &self.custom_data
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub(crate) fn place(&mut self, placement: TaskPlacement, clock: &impl Clock) {
        self.team_id = placement.team_id;
        self.task_type_id = placement.task_type_id;
        self.status = placement.status;
        self.custom_data = placement.custom_data;
        self.updated_at = clock.utc();
    }

    pub(crate) fn move_to_team(&mut self, team_id: TeamId, clock: &impl Clock) {
        self.team_id = team_id;
        self.updated_at = clock.utc();
    }

    pub(crate) fn set_project(&mut self, project_id: Option<ProjectId>, clock: &impl Clock) {
        self.project_id = project_id;
        self.updated_at = clock.utc();
    }

    pub(crate) fn set_release(&mut self, release_id: Option<ReleaseId>, clock: &impl Clock) {
        self.release_id = release_id;
        self.updated_at = clock.utc();
    }

    pub(crate) fn apply_details(
        &mut self,
        update: &TaskUpdate,
        clock: &impl Clock,
    ) -> Result<(), TrackerDomainError> {
        if let Some(title) = &update.title {
            self.title = task_title(title.clone())?;
        }
        if let Some(description) = &update.description {
            self.description = optional_text(description.clone());
        }
        if let Some(estimation) = &update.estimation {
            self.estimation = optional_text(estimation.clone());
        }
        if let Some(project_id) = update.project_id {
            self.project_id = project_id;
        }
        if let Some(release_id) = update.release_id {
            self.release_id = release_id;
        }
        self.updated_at = clock.utc();
        Ok(())
    }
}

pub(crate) fn task_title(title: String) -> Result<String, TrackerDomainError> {
    required_text(EntityKind::Task, title, MAX_TITLE_LENGTH)
}

/// Request to create a task.
///
/// The status defaults to the initial status of the task type's workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub(crate) title: String,
    pub(crate) team_id: TeamId,
    pub(crate) task_type_id: TaskTypeId,
    pub(crate) description: Option<String>,
    pub(crate) estimation: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) project_id: Option<ProjectId>,
    pub(crate) release_id: Option<ReleaseId>,
    pub(crate) custom_data: CustomData,
}

impl NewTask {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, team_id: TeamId, task_type_id: TaskTypeId) -> Self {
        Self {
            title: title.into(),
            team_id,
            task_type_id,
            description: None,
            estimation: None,
            status: None,
            project_id: None,
            release_id: None,
            custom_data: CustomData::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the estimation.
    #[must_use]
    pub fn with_estimation(mut self, estimation: impl Into<String>) -> Self {
        self.estimation = Some(estimation.into());
        self
    }

    /// Sets an explicit initial status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Links the task to a project.
    #[must_use]
    pub const fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Links the task to a release.
    #[must_use]
    pub const fn with_release(mut self, release_id: ReleaseId) -> Self {
        self.release_id = Some(release_id);
        self
    }

    /// Sets the custom data.
    #[must_use]
    pub fn with_custom_data(mut self, custom_data: CustomData) -> Self {
        self.custom_data = custom_data;
        self
    }

    /// Returns the requested team.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the requested task type.
    #[must_use]
    pub const fn task_type_id(&self) -> TaskTypeId {
        self.task_type_id
    }
}

/// Partial update of a task. Absent fields are left unchanged.
///
/// Changing the task type (or the team together with a type of that team)
/// keeps the status when the new workflow contains it and otherwise resets it
/// to the new initial status. Custom data is revalidated whenever it or the
/// type changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<Option<String>>,
    pub(crate) estimation: Option<Option<String>>,
    pub(crate) status: Option<String>,
    pub(crate) team_id: Option<TeamId>,
    pub(crate) task_type_id: Option<TaskTypeId>,
    pub(crate) project_id: Option<Option<ProjectId>>,
    pub(crate) release_id: Option<Option<ReleaseId>>,
    pub(crate) custom_data: Option<CustomData>,
}

impl TaskUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces or clears the estimation.
    #[must_use]
    pub fn with_estimation(mut self, estimation: Option<String>) -> Self {
        self.estimation = Some(estimation);
        self
    }

    /// Moves the task to another status of its workflow.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Moves the task to another team.
    #[must_use]
    pub const fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Moves the task to another task type.
    #[must_use]
    pub const fn with_task_type(mut self, task_type_id: TaskTypeId) -> Self {
        self.task_type_id = Some(task_type_id);
        self
    }

    /// Links to a project, or unlinks with `None`.
    #[must_use]
    pub const fn with_project(mut self, project_id: Option<ProjectId>) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Links to a release, or unlinks with `None`.
    #[must_use]
    pub const fn with_release(mut self, release_id: Option<ReleaseId>) -> Self {
        self.release_id = Some(release_id);
        self
    }

    /// Replaces the custom data.
    #[must_use]
    pub fn with_custom_data(mut self, custom_data: CustomData) -> Self {
        self.custom_data = Some(custom_data);
        self
    }
}

/// Criteria for listing tasks. Every criterion set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    team_id: Option<TeamId>,
    task_type_id: Option<TaskTypeId>,
    project_id: Option<ProjectId>,
    release_id: Option<ReleaseId>,
    statuses: Vec<String>,
}

impl TaskFilter {
    /// Creates a filter matching every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one team.
    #[must_use]
    pub const fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Restricts to one task type.
    #[must_use]
    pub const fn with_task_type(mut self, task_type_id: TaskTypeId) -> Self {
        self.task_type_id = Some(task_type_id);
        self
    }

    /// Restricts to one project.
    #[must_use]
    pub const fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Restricts to one release.
    #[must_use]
    pub const fn with_release(mut self, release_id: ReleaseId) -> Self {
        self.release_id = Some(release_id);
        self
    }

    /// Restricts to any of the given statuses.
    #[must_use]
    pub fn with_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statuses = statuses.into_iter().map(Into::into).collect();
        self
    }

    /// Returns `true` when `task` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.team_id.is_none_or(|id| id == task.team_id)
            && self.task_type_id.is_none_or(|id| id == task.task_type_id)
            && self.project_id.is_none_or(|id| task.project_id == Some(id))
            && self.release_id.is_none_or(|id| task.release_id == Some(id))
            && (self.statuses.is_empty()
                || self.statuses.iter().any(|status| task.status == status.as_str()))
    }
}

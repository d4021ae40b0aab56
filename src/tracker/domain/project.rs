//! Projects and their create and update requests.

use super::{
    EntityKind, ProjectId, ProjectTypeId, ThemeId, TrackerDomainError, error::optional_text,
    error::required_text,
};
use crate::schema::domain::{CustomData, StatusLabel};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

const MAX_TITLE_LENGTH: usize = 255;

/// Cross-team work item typed by a project type and optionally grouped
/// under a theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    title: String,
    description: Option<String>,
    project_type_id: ProjectTypeId,
    theme_id: Option<ThemeId>,
    status: StatusLabel,
    custom_data: CustomData,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Project {
    pub(crate) fn new(
        request: NewProject,
        status: StatusLabel,
        custom_data: CustomData,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        let title = project_title(request.title)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: ProjectId::new(),
            title,
            description: optional_text(request.description),
            project_type_id: request.project_type_id,
            theme_id: request.theme_id,
            status,
            custom_data,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
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

    /// Returns the project type.
    #[must_use]
    pub const fn project_type_id(&self) -> ProjectTypeId {
        self.project_type_id
    }

    /// Returns the linked theme, if any.
    #[must_use]
    pub const fn theme_id(&self) -> Option<ThemeId> {
        self.theme_id
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

    pub(crate) fn retype(
        &mut self,
        project_type_id: ProjectTypeId,
        status: StatusLabel,
        custom_data: CustomData,
        clock: &impl Clock,
    ) {
        self.project_type_id = project_type_id;
        self.status = status;
        self.custom_data = custom_data;
        self.updated_at = clock.utc();
    }

    pub(crate) fn set_status(&mut self, status: StatusLabel, clock: &impl Clock) {
        self.status = status;
        self.updated_at = clock.utc();
    }

    pub(crate) fn set_custom_data(&mut self, custom_data: CustomData, clock: &impl Clock) {
        self.custom_data = custom_data;
        self.updated_at = clock.utc();
    }

    pub(crate) fn set_theme(&mut self, theme_id: Option<ThemeId>, clock: &impl Clock) {
        self.theme_id = theme_id;
        self.updated_at = clock.utc();
    }

    pub(crate) fn apply_details(
        &mut self,
        update: &ProjectUpdate,
        clock: &impl Clock,
    ) -> Result<(), TrackerDomainError> {
        if let Some(title) = &update.title {
            self.title = project_title(title.clone())?;
        }
        if let Some(description) = &update.description {
            self.description = optional_text(description.clone());
        }
        if let Some(theme_id) = update.theme_id {
            self.theme_id = theme_id;
        }
        self.updated_at = clock.utc();
        Ok(())
    }
}

fn project_title(title: String) -> Result<String, TrackerDomainError> {
    required_text(EntityKind::Project, title, MAX_TITLE_LENGTH)
}

/// Request to create a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub(crate) title: String,
    pub(crate) project_type_id: ProjectTypeId,
    pub(crate) description: Option<String>,
    pub(crate) theme_id: Option<ThemeId>,
    pub(crate) status: Option<String>,
    pub(crate) custom_data: CustomData,
}

impl NewProject {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, project_type_id: ProjectTypeId) -> Self {
        Self {
            title: title.into(),
            project_type_id,
            description: None,
            theme_id: None,
            status: None,
            custom_data: CustomData::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Links the project to a theme.
    #[must_use]
    pub const fn with_theme(mut self, theme_id: ThemeId) -> Self {
        self.theme_id = Some(theme_id);
        self
    }

    /// Sets an explicit initial status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the custom data.
    #[must_use]
    pub fn with_custom_data(mut self, custom_data: CustomData) -> Self {
        self.custom_data = custom_data;
        self
    }

    /// Returns the requested project type.
    #[must_use]
    pub const fn project_type_id(&self) -> ProjectTypeId {
        self.project_type_id
    }
}

/// Partial update of a project. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<Option<String>>,
    pub(crate) status: Option<String>,
    pub(crate) theme_id: Option<Option<ThemeId>>,
    pub(crate) custom_data: Option<CustomData>,
}

impl ProjectUpdate {
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

    /// Moves the project to another status of its workflow.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Links to a theme, or unlinks with `None`.
    #[must_use]
    pub const fn with_theme(mut self, theme_id: Option<ThemeId>) -> Self {
        self.theme_id = Some(theme_id);
        self
    }

    /// Replaces the custom data.
    #[must_use]
    pub fn with_custom_data(mut self, custom_data: CustomData) -> Self {
        self.custom_data = Some(custom_data);
        self
    }
}

/// Criteria for listing projects. Every criterion set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    project_type_ids: Vec<ProjectTypeId>,
    theme_id: Option<ThemeId>,
    statuses: Vec<String>,
}

impl ProjectFilter {
    /// Creates a filter matching every project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to any of the given project types.
    #[must_use]
    pub fn with_project_types(mut self, ids: impl IntoIterator<Item = ProjectTypeId>) -> Self {
        self.project_type_ids = ids.into_iter().collect();
        self
    }

    /// Restricts to one theme.
    #[must_use]
    pub const fn with_theme(mut self, theme_id: ThemeId) -> Self {
        self.theme_id = Some(theme_id);
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

    /// Returns `true` when `project` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, project: &Project) -> bool {
        (self.project_type_ids.is_empty()
            || self.project_type_ids.contains(&project.project_type_id))
            && self.theme_id.is_none_or(|id| project.theme_id == Some(id))
            && (self.statuses.is_empty()
                || self
                    .statuses
                    .iter()
                    .any(|status| project.status == status.as_str()))
    }
}

//! Team-scoped task types.

use super::{
    EntityKind, Slug, TaskTypeId, TeamId, TrackerDomainError, error::optional_text,
    error::required_text,
};
use crate::schema::domain::{FieldSchema, TypeSchema, Workflow};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

const MAX_NAME_LENGTH: usize = 100;

/// A kind of task within one team, such as `Bug` or `Story`.
///
/// The slug is unique within the owning team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    id: TaskTypeId,
    team_id: TeamId,
    name: String,
    slug: Slug,
    description: Option<String>,
    color: Option<String>,
    schema: TypeSchema,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskType {
    /// Creates a task type with the given workflow and no custom fields.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError`] when the name is empty, too long, or
    /// yields no slug characters.
    pub fn new(
        team_id: TeamId,
        name: impl Into<String>,
        workflow: Workflow,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        let type_name = required_text(EntityKind::TaskType, name, MAX_NAME_LENGTH)?;
        let slug = Slug::from_name(&type_name)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskTypeId::new(),
            team_id,
            name: type_name,
            slug,
            description: None,
            color: None,
            schema: TypeSchema::new(workflow, FieldSchema::empty()),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Replaces the derived slug.
    #[must_use]
    pub fn with_slug(mut self, slug: Slug) -> Self {
        self.slug = slug;
        self
    }

    /// Sets the custom field schema.
    #[must_use]
    pub fn with_fields(mut self, fields: FieldSchema) -> Self {
        self.schema.replace_fields(fields);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = optional_text(Some(description.into()));
        self
    }

    /// Sets the display colour.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = optional_text(Some(color.into()));
        self
    }

    /// Returns the task type identifier.
    #[must_use]
    pub const fn id(&self) -> TaskTypeId {
        self.id
    }

    /// Returns the owning team.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the slug, unique within the team.
    #[must_use]
    pub const fn slug(&self) -> &Slug {
        &self.slug
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the display colour, if any.
    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Returns the workflow and field schema.
    #[must_use]
    pub const fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    /// Returns the workflow.
    #[must_use]
    pub const fn workflow(&self) -> &Workflow {
        self.schema.workflow()
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

    pub(crate) const fn schema_mut(&mut self) -> &mut TypeSchema {
        &mut self.schema
    }

    pub(crate) fn move_to_team(&mut self, team_id: TeamId, clock: &impl Clock) {
        self.team_id = team_id;
        self.updated_at = clock.utc();
    }

    pub(crate) fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

//! Combined workflow and field schema owned by a task or project type.

use super::{CustomData, FieldSchema, SchemaError, StatusLabel, Workflow};
use crate::schema::validation::{self, ValidationResult};
use serde::{Deserialize, Serialize};

/// Current workflow and field schema of a task type or project type.
///
/// Entities are always validated against the schema as it is at the time of
/// the write; schemas are not versioned per entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSchema {
    workflow: Workflow,
    fields: FieldSchema,
}

impl TypeSchema {
    /// Creates a schema from a workflow and field list.
    #[must_use]
    pub const fn new(workflow: Workflow, fields: FieldSchema) -> Self {
        Self { workflow, fields }
    }

    /// Returns the ordered workflow.
    #[must_use]
    pub const fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Returns the ordered field schema.
    #[must_use]
    pub const fn fields(&self) -> &FieldSchema {
        &self.fields
    }

    /// Inserts a status into the workflow.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateStatus`] when the label already exists
    /// ignoring case.
    pub fn add_status(
        &mut self,
        label: StatusLabel,
        position: Option<usize>,
    ) -> Result<(), SchemaError> {
        self.workflow.insert(label, position)
    }

    /// Removes a status from the workflow.
    ///
    /// Callers are responsible for retargeting entities that still use it.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownStatus`] or [`SchemaError::LastStatus`].
    pub fn remove_status(&mut self, status: &str) -> Result<StatusLabel, SchemaError> {
        self.workflow.remove(status)
    }

    /// Replaces the field list without touching stored custom data.
    pub fn replace_fields(&mut self, fields: FieldSchema) {
        self.fields = fields;
    }

    /// Validates a candidate status against the current workflow.
    ///
    /// # Errors
    ///
    /// Returns [`crate::schema::validation::ValidationError::InvalidStatus`]
    /// when the status is not a member.
    pub fn validate_status(&self, candidate: &str) -> ValidationResult<StatusLabel> {
        validation::validate_status(&self.workflow, candidate)
    }

    /// Validates candidate custom data against the current field schema.
    ///
    /// # Errors
    ///
    /// Returns the first field validation failure in schema order.
    pub fn validate_custom_data(&self, candidate: &CustomData) -> ValidationResult<CustomData> {
        validation::validate_custom_data(&self.fields, candidate)
    }

    /// Resolves the status an entity keeps when moved onto this schema:
    /// its current status when still a member, otherwise the initial status.
    #[must_use]
    pub fn carry_over_status(&self, current: &StatusLabel) -> StatusLabel {
        self.workflow
            .find(current.as_str())
            .unwrap_or_else(|| self.workflow.initial())
            .clone()
    }
}

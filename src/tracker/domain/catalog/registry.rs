//! Schema registry operations: types, workflows and field schemas.

use super::Catalog;
use crate::schema::domain::{FieldSchema, StatusLabel, Workflow};
use crate::tracker::domain::{
    EntityKind, ProjectType, ProjectTypeId, SchemaOwner, TaskType, TaskTypeId,
};
use crate::tracker::error::{Conflict, EngineError, EngineResult};
use mockable::Clock;

/// Whether a workflow status can be removed without a reassignment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRemoval {
    /// No live task or project uses the status.
    Removable,
    /// `count` tasks or projects still use the status.
    Blocked {
        /// Number of entities using the status.
        count: usize,
    },
}

/// Number of entities holding one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    /// The workflow status.
    pub status: StatusLabel,
    /// Entities currently holding it.
    pub count: usize,
}

/// Usage of a task type or project type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeStats {
    /// The current workflow.
    pub workflow: Workflow,
    /// Total number of tasks or projects of the type.
    pub total: usize,
    /// Per-status counts, in workflow order.
    pub by_status: Vec<StatusCount>,
}

impl Catalog {
    /// Registers a task type under its team.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the team does not exist or
    /// [`Conflict::DuplicateSlug`] when the team already has a type with the
    /// same slug.
    pub fn insert_task_type(&mut self, task_type: TaskType) -> EngineResult<TaskTypeId> {
        self.team(task_type.team_id())?;
        let taken = self.task_types.values().any(|existing| {
            existing.team_id() == task_type.team_id() && existing.slug() == task_type.slug()
        });
        if taken {
            return Err(Conflict::DuplicateSlug {
                kind: EntityKind::TaskType,
                slug: task_type.slug().to_string(),
            }
            .into());
        }
        let id = task_type.id();
        self.task_types.insert(id, task_type);
        Ok(id)
    }

    /// Registers a project type.
    ///
    /// # Errors
    ///
    /// Returns [`Conflict::DuplicateSlug`] when the slug is already in use.
    pub fn insert_project_type(
        &mut self,
        project_type: ProjectType,
    ) -> EngineResult<ProjectTypeId> {
        let taken = self
            .project_types
            .values()
            .any(|existing| existing.slug() == project_type.slug());
        if taken {
            return Err(Conflict::DuplicateSlug {
                kind: EntityKind::ProjectType,
                slug: project_type.slug().to_string(),
            }
            .into());
        }
        let id = project_type.id();
        self.project_types.insert(id, project_type);
        Ok(id)
    }

    /// Inserts `label` into the workflow of `owner` at `position`, appending
    /// when the position is absent or past the end.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`], [`Conflict::DuplicateStatus`] when
    /// the label exists ignoring case, or [`EngineError::Schema`] for a
    /// malformed label.
    pub fn add_status(
        &mut self,
        owner: SchemaOwner,
        label: &str,
        position: Option<usize>,
        clock: &impl Clock,
    ) -> EngineResult<Workflow> {
        let status = StatusLabel::new(label)?;
        self.edit_schema(owner, clock, |schema| {
            schema.add_status(status, position)?;
            Ok(schema.workflow().clone())
        })
    }

    /// Reports whether `status` is still used by live entities of `owner`.
    ///
    /// Nothing is removed; see [`Catalog::remove_workflow_status`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`], or [`EngineError::Validation`]
    /// when `status` is not a member.
    pub fn status_removal(&self, owner: SchemaOwner, status: &str) -> EngineResult<StatusRemoval> {
        self.schema(owner)?.validate_status(status)?;
        let count = self.status_usage(owner, status);
        Ok(if count == 0 {
            StatusRemoval::Removable
        } else {
            StatusRemoval::Blocked { count }
        })
    }

    /// Removes a status that no live entity uses.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Blocked`] while any task or project of `owner`
    /// still holds the status, [`EngineError::Validation`] when it is not a
    /// member, or [`EngineError::Schema`] when it is the last status.
    pub fn remove_unused_status(
        &mut self,
        owner: SchemaOwner,
        status: &str,
        clock: &impl Clock,
    ) -> EngineResult<Workflow> {
        match self.status_removal(owner, status)? {
            StatusRemoval::Blocked { count } => Err(EngineError::Blocked {
                status: status.to_owned(),
                count,
            }),
            StatusRemoval::Removable => self.edit_schema(owner, clock, |schema| {
                schema.remove_status(status)?;
                Ok(schema.workflow().clone())
            }),
        }
    }

    /// Replaces the field schema of `owner`.
    ///
    /// Stored custom data is left as it is; keys the new schema no longer
    /// declares are dropped on each entity's next validated write.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the type does not exist.
    pub fn set_field_schema(
        &mut self,
        owner: SchemaOwner,
        fields: FieldSchema,
        clock: &impl Clock,
    ) -> EngineResult<()> {
        self.edit_schema(owner, clock, |schema| {
            schema.replace_fields(fields);
            Ok(())
        })
    }

    /// Returns per-status usage of `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the type does not exist.
    pub fn type_stats(&self, owner: SchemaOwner) -> EngineResult<TypeStats> {
        let workflow = self.schema(owner)?.workflow().clone();
        let by_status: Vec<StatusCount> = workflow
            .iter()
            .map(|status| StatusCount {
                status: status.clone(),
                count: self.status_usage(owner, status.as_str()),
            })
            .collect();
        let total = by_status.iter().map(|entry| entry.count).sum();
        Ok(TypeStats {
            workflow,
            total,
            by_status,
        })
    }
}

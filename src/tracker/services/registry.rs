//! Schema registry service: task types, project types and their schemas.

use crate::schema::domain::{CustomData, FieldSchema, StatusLabel, Workflow};
use crate::tracker::{
    domain::{
        ProjectType, SchemaOwner, Slug, StatusRemoval, TaskType, TeamId, TrackerDomainError,
        TypeStats,
    },
    error::EngineResult,
    ports::WorkspaceStore,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, instrument};

/// Request payload for creating a task type or project type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    name: String,
    workflow: Workflow,
    fields: FieldSchema,
    slug: Option<Slug>,
    description: Option<String>,
    color: Option<String>,
}

impl TypeDefinition {
    /// Creates a definition with a workflow and no custom fields.
    #[must_use]
    pub fn new(name: impl Into<String>, workflow: Workflow) -> Self {
        Self {
            name: name.into(),
            workflow,
            fields: FieldSchema::empty(),
            slug: None,
            description: None,
            color: None,
        }
    }

    /// Sets the custom field schema.
    #[must_use]
    pub fn with_fields(mut self, fields: FieldSchema) -> Self {
        self.fields = fields;
        self
    }

    /// Sets an explicit slug instead of deriving one from the name.
    #[must_use]
    pub fn with_slug(mut self, slug: Slug) -> Self {
        self.slug = Some(slug);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the display colour.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    fn into_task_type(
        self,
        team_id: TeamId,
        clock: &impl Clock,
    ) -> Result<TaskType, TrackerDomainError> {
        let mut task_type =
            TaskType::new(team_id, self.name, self.workflow, clock)?.with_fields(self.fields);
        if let Some(slug) = self.slug {
            task_type = task_type.with_slug(slug);
        }
        if let Some(description) = self.description {
            task_type = task_type.with_description(description);
        }
        if let Some(color) = self.color {
            task_type = task_type.with_color(color);
        }
        Ok(task_type)
    }

    fn into_project_type(self, clock: &impl Clock) -> Result<ProjectType, TrackerDomainError> {
        let mut project_type =
            ProjectType::new(self.name, self.workflow, clock)?.with_fields(self.fields);
        if let Some(slug) = self.slug {
            project_type = project_type.with_slug(slug);
        }
        if let Some(description) = self.description {
            project_type = project_type.with_description(description);
        }
        if let Some(color) = self.color {
            project_type = project_type.with_color(color);
        }
        Ok(project_type)
    }
}

/// Source of truth for which statuses and fields are valid right now.
#[derive(Clone)]
pub struct SchemaRegistryService<S, C>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> SchemaRegistryService<S, C>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    /// Creates a new schema registry service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a task type owned by `team_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing team, `Conflict` when the team
    /// already has a type with the same slug, or a domain error for an
    /// invalid name.
    #[instrument(skip(self, definition), fields(name = %definition.name))]
    pub async fn create_task_type(
        &self,
        team_id: TeamId,
        definition: TypeDefinition,
    ) -> EngineResult<TaskType> {
        let clock = &*self.clock;
        let task_type = self
            .store
            .transact(move |catalog| {
                let task_type = definition.into_task_type(team_id, clock)?;
                catalog.insert_task_type(task_type.clone())?;
                Ok(task_type)
            })
            .await?;
        info!(task_type = %task_type.id(), slug = %task_type.slug(), "created task type");
        Ok(task_type)
    }

    /// Creates a project type.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` when the slug is taken or a domain error for an
    /// invalid name.
    #[instrument(skip(self, definition), fields(name = %definition.name))]
    pub async fn create_project_type(
        &self,
        definition: TypeDefinition,
    ) -> EngineResult<ProjectType> {
        let clock = &*self.clock;
        let project_type = self
            .store
            .transact(move |catalog| {
                let project_type = definition.into_project_type(clock)?;
                catalog.insert_project_type(project_type.clone())?;
                Ok(project_type)
            })
            .await?;
        info!(
            project_type = %project_type.id(),
            slug = %project_type.slug(),
            "created project type"
        );
        Ok(project_type)
    }

    /// Returns the task types owned by `team_id`, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the team does not exist.
    #[instrument(skip(self))]
    pub async fn list_task_types(&self, team_id: TeamId) -> EngineResult<Vec<TaskType>> {
        self.store
            .read(move |catalog| {
                catalog.team(team_id)?;
                let mut task_types: Vec<TaskType> = catalog
                    .task_types()
                    .filter(|task_type| task_type.team_id() == team_id)
                    .cloned()
                    .collect();
                task_types.sort_by(|left, right| left.name().cmp(right.name()));
                Ok(task_types)
            })
            .await
    }

    /// Returns every project type, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a store error when the catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn list_project_types(&self) -> EngineResult<Vec<ProjectType>> {
        self.store
            .read(|catalog| {
                let mut project_types: Vec<ProjectType> =
                    catalog.project_types().cloned().collect();
                project_types.sort_by(|left, right| left.name().cmp(right.name()));
                Ok(project_types)
            })
            .await
    }

    /// Returns the current workflow of `owner`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the type does not exist.
    #[instrument(skip(self))]
    pub async fn get_workflow(&self, owner: SchemaOwner) -> EngineResult<Workflow> {
        self.store
            .read(move |catalog| Ok(catalog.schema(owner)?.workflow().clone()))
            .await
    }

    /// Returns the current field schema of `owner`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the type does not exist.
    #[instrument(skip(self))]
    pub async fn get_field_schema(&self, owner: SchemaOwner) -> EngineResult<FieldSchema> {
        self.store
            .read(move |catalog| Ok(catalog.schema(owner)?.fields().clone()))
            .await
    }

    /// Inserts a status at `position`, appending when it is absent or past
    /// the end.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Conflict` when the label exists ignoring case, or
    /// a schema error for a malformed label.
    #[instrument(skip(self))]
    pub async fn add_status(
        &self,
        owner: SchemaOwner,
        label: &str,
        position: Option<usize>,
    ) -> EngineResult<Workflow> {
        let clock = &*self.clock;
        let workflow = self
            .store
            .transact(move |catalog| catalog.add_status(owner, label, position, clock))
            .await?;
        info!(%owner, label, "added workflow status");
        Ok(workflow)
    }

    /// Reports whether `status` can be removed without a reassignment target.
    ///
    /// Nothing is removed; use
    /// [`CascadeCoordinator::remove_workflow_status`][retarget] to retarget
    /// users and remove it, or [`Self::remove_unused_status`] once it is
    /// unused.
    ///
    /// [retarget]: super::CascadeCoordinator::remove_workflow_status
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `InvalidStatus` when `status` is not a member.
    #[instrument(skip(self))]
    pub async fn remove_status(
        &self,
        owner: SchemaOwner,
        status: &str,
    ) -> EngineResult<StatusRemoval> {
        self.store
            .read(move |catalog| catalog.status_removal(owner, status))
            .await
    }

    /// Removes a status no task or project uses.
    ///
    /// # Errors
    ///
    /// Returns `Blocked` with the usage count while the status is in use,
    /// `InvalidStatus` when it is not a member, or a schema error when it is
    /// the last status.
    #[instrument(skip(self))]
    pub async fn remove_unused_status(
        &self,
        owner: SchemaOwner,
        status: &str,
    ) -> EngineResult<Workflow> {
        let clock = &*self.clock;
        let workflow = self
            .store
            .transact(move |catalog| catalog.remove_unused_status(owner, status, clock))
            .await?;
        info!(%owner, status, "removed unused workflow status");
        Ok(workflow)
    }

    /// Replaces the field schema of `owner` without touching stored data.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the type does not exist.
    #[instrument(skip(self, field_schema), fields(field_count = field_schema.len()))]
    pub async fn set_field_schema(
        &self,
        owner: SchemaOwner,
        field_schema: FieldSchema,
    ) -> EngineResult<()> {
        let clock = &*self.clock;
        self.store
            .transact(move |catalog| catalog.set_field_schema(owner, field_schema, clock))
            .await?;
        info!(%owner, "replaced field schema");
        Ok(())
    }

    /// Checks `candidate` against the current workflow of `owner`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InvalidStatus`.
    #[instrument(skip(self))]
    pub async fn validate_status(
        &self,
        owner: SchemaOwner,
        candidate: &str,
    ) -> EngineResult<StatusLabel> {
        self.store
            .read(move |catalog| Ok(catalog.schema(owner)?.validate_status(candidate)?))
            .await
    }

    /// Checks `candidate` against the current field schema of `owner`,
    /// returning the data with undeclared keys dropped.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `MissingRequiredField`, `TypeMismatch` or
    /// `InvalidOption`.
    #[instrument(skip(self, candidate))]
    pub async fn validate_custom_data(
        &self,
        owner: SchemaOwner,
        candidate: &CustomData,
    ) -> EngineResult<CustomData> {
        self.store
            .read(move |catalog| Ok(catalog.schema(owner)?.validate_custom_data(candidate)?))
            .await
    }

    /// Returns total and per-status usage of `owner`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the type does not exist.
    #[instrument(skip(self))]
    pub async fn type_stats(&self, owner: SchemaOwner) -> EngineResult<TypeStats> {
        self.store.read(move |catalog| catalog.type_stats(owner)).await
    }
}

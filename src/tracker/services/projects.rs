//! Project service: creation, updates, lookups and the project dependency
//! graph.

use crate::tracker::{
    domain::{NewProject, Project, ProjectFilter, ProjectId, ProjectUpdate},
    error::EngineResult,
    ports::WorkspaceStore,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Project orchestration service.
#[derive(Clone)]
pub struct ProjectService<S, C>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> ProjectService<S, C>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing type or theme, or a validation
    /// failure.
    #[instrument(skip(self, request), fields(project_type = %request.project_type_id()))]
    pub async fn create_project(&self, request: NewProject) -> EngineResult<Project> {
        let clock = &*self.clock;
        let project = self
            .store
            .transact(move |catalog| catalog.create_project(request, clock))
            .await?;
        info!(project = %project.id(), "created project");
        Ok(project)
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or a validation failure.
    #[instrument(skip(self, update))]
    pub async fn update_project(
        &self,
        id: ProjectId,
        update: ProjectUpdate,
    ) -> EngineResult<Project> {
        let clock = &*self.clock;
        let project = self
            .store
            .transact(move |catalog| catalog.update_project(id, &update, clock))
            .await?;
        debug!(project = %id, status = %project.status(), "updated project");
        Ok(project)
    }

    /// Returns the project with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the project does not exist.
    #[instrument(skip(self))]
    pub async fn find_project(&self, id: ProjectId) -> EngineResult<Project> {
        self.store
            .read(move |catalog| catalog.project(id).cloned())
            .await
    }

    /// Returns the projects matching `filter`, ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns a store error when the catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn list_projects(&self, filter: ProjectFilter) -> EngineResult<Vec<Project>> {
        self.store
            .read(move |catalog| Ok(catalog.find_projects(&filter)))
            .await
    }

    /// Records that project `from` depends on project `to`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `SelfDependency`, `DuplicateEdge` or
    /// `CycleDetected`.
    #[instrument(skip(self))]
    pub async fn add_dependency(&self, from: ProjectId, to: ProjectId) -> EngineResult<()> {
        self.store
            .transact(move |catalog| catalog.add_project_dependency(from, to))
            .await?;
        info!(%from, %to, "added project dependency");
        Ok(())
    }

    /// Removes the edge `from -> to`. Removing an absent edge succeeds.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when either project does not exist.
    #[instrument(skip(self))]
    pub async fn remove_dependency(&self, from: ProjectId, to: ProjectId) -> EngineResult<()> {
        self.store
            .transact(move |catalog| catalog.remove_project_dependency(from, to))
            .await?;
        Ok(())
    }

    /// Returns the projects `id` depends on.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the project does not exist.
    #[instrument(skip(self))]
    pub async fn dependencies(&self, id: ProjectId) -> EngineResult<Vec<Project>> {
        self.store
            .read(move |catalog| catalog.project_dependencies(id))
            .await
    }

    /// Returns the projects that depend on `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the project does not exist.
    #[instrument(skip(self))]
    pub async fn dependents(&self, id: ProjectId) -> EngineResult<Vec<Project>> {
        self.store
            .read(move |catalog| catalog.project_dependents(id))
            .await
    }
}

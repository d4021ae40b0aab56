//! Task service: creation, updates, lookups and the task dependency graph.

use crate::display_id::domain::DisplayId;
use crate::tracker::{
    domain::{NewTask, Task, TaskFilter, TaskId, TaskUpdate},
    error::EngineResult,
    ports::WorkspaceStore,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Task orchestration service.
///
/// Status and custom data are validated against the type's current schema on
/// every create and every update.
#[derive(Clone)]
pub struct TaskService<S, C>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> TaskService<S, C>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a task and issues its display identifier.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing team, type, project or release,
    /// `InvalidTarget` when the type belongs to another team, or a
    /// validation failure.
    #[instrument(
        skip(self, request),
        fields(team = %request.team_id(), task_type = %request.task_type_id())
    )]
    pub async fn create_task(&self, request: NewTask) -> EngineResult<Task> {
        let clock = &*self.clock;
        let task = self
            .store
            .transact(move |catalog| catalog.create_task(request, clock))
            .await?;
        info!(task = %task.id(), display_id = %task.display_id(), "created task");
        Ok(task)
    }

    /// Applies a partial update.
    ///
    /// Moving the task to another type keeps its status when the new
    /// workflow contains it and otherwise uses the new initial status.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidTarget` for a type of another team, or a
    /// validation failure.
    #[instrument(skip(self, update))]
    pub async fn update_task(&self, id: TaskId, update: TaskUpdate) -> EngineResult<Task> {
        let clock = &*self.clock;
        let task = self
            .store
            .transact(move |catalog| catalog.update_task(id, &update, clock))
            .await?;
        debug!(task = %id, status = %task.status(), "updated task");
        Ok(task)
    }

    /// Deletes a task together with every dependency edge touching it.
    /// Returns the number of edges removed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    #[instrument(skip(self))]
    pub async fn delete_task(&self, id: TaskId) -> EngineResult<usize> {
        let edges_removed = self
            .store
            .transact(move |catalog| catalog.delete_task(id))
            .await?;
        info!(task = %id, edges_removed, "deleted task");
        Ok(edges_removed)
    }

    /// Returns the task with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    #[instrument(skip(self))]
    pub async fn find_task(&self, id: TaskId) -> EngineResult<Task> {
        self.store
            .read(move |catalog| catalog.task(id).cloned())
            .await
    }

    /// Returns the task carrying a display identifier such as `CORE-42`.
    ///
    /// # Errors
    ///
    /// Returns a display identifier error when `display_id` cannot be
    /// parsed, or `NotFound`.
    #[instrument(skip(self))]
    pub async fn find_by_display_id(&self, display_id: &str) -> EngineResult<Task> {
        let parsed: DisplayId = display_id.parse()?;
        self.store
            .read(move |catalog| catalog.task_by_display_id(&parsed).cloned())
            .await
    }

    /// Returns the tasks matching `filter`, ordered by display identifier.
    ///
    /// # Errors
    ///
    /// Returns a store error when the catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn list_tasks(&self, filter: TaskFilter) -> EngineResult<Vec<Task>> {
        self.store
            .read(move |catalog| Ok(catalog.find_tasks(&filter)))
            .await
    }

    /// Records that task `from` depends on task `to`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `SelfDependency`, `DuplicateEdge` or
    /// `CycleDetected`; the graph is unchanged on failure.
    #[instrument(skip(self))]
    pub async fn add_dependency(&self, from: TaskId, to: TaskId) -> EngineResult<()> {
        self.store
            .transact(move |catalog| catalog.add_task_dependency(from, to))
            .await?;
        info!(%from, %to, "added task dependency");
        Ok(())
    }

    /// Removes the edge `from -> to`. Removing an absent edge succeeds.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when either task does not exist.
    #[instrument(skip(self))]
    pub async fn remove_dependency(&self, from: TaskId, to: TaskId) -> EngineResult<()> {
        let removed = self
            .store
            .transact(move |catalog| catalog.remove_task_dependency(from, to))
            .await?;
        debug!(%from, %to, removed, "removed task dependency");
        Ok(())
    }

    /// Returns the tasks `id` depends on.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    #[instrument(skip(self))]
    pub async fn dependencies(&self, id: TaskId) -> EngineResult<Vec<Task>> {
        self.store
            .read(move |catalog| catalog.task_dependencies(id))
            .await
    }

    /// Returns the tasks that depend on `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    #[instrument(skip(self))]
    pub async fn dependents(&self, id: TaskId) -> EngineResult<Vec<Task>> {
        self.store
            .read(move |catalog| catalog.task_dependents(id))
            .await
    }
}

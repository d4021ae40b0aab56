//! Cascade coordinator: the only path for multi-entity structural mutations.
//!
//! Each operation runs as one store transaction. The catalog computes and
//! validates every per-entity change before applying any of them, and the
//! store discards the working copy when anything fails, so a cascade is
//! either fully visible or not at all.

use crate::tracker::{
    domain::{
        CascadeSummary, Disposal, ProjectId, ProjectTypeId, ReleaseId, SchemaOwner,
        StatusReassignment, TaskTypeId, TeamId, ThemeId,
    },
    error::EngineResult,
    ports::WorkspaceStore,
};
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Orchestrates atomic multi-entity mutations.
#[derive(Clone)]
pub struct CascadeCoordinator<S, C>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> CascadeCoordinator<S, C>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    /// Creates a new cascade coordinator.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Moves every task or project holding `status` to `target`, then
    /// removes `status` from the workflow.
    ///
    /// A target is only required while entities use the status.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` when `status` is not a member,
    /// `InvalidTarget` when `target` equals `status` or is not a member,
    /// `TargetRequired` with the affected count when users exist and no
    /// target was given, or a custom-data validation failure of any affected
    /// entity. Nothing changes on failure.
    #[instrument(skip(self))]
    pub async fn remove_workflow_status(
        &self,
        owner: SchemaOwner,
        status: &str,
        target: Option<&str>,
    ) -> EngineResult<StatusReassignment> {
        let clock = &*self.clock;
        let outcome = self
            .store
            .transact(move |catalog| catalog.remove_workflow_status(owner, status, target, clock))
            .await?;
        info!(
            %owner,
            removed = %outcome.removed,
            reassigned = outcome.reassigned,
            "removed workflow status"
        );
        Ok(outcome)
    }

    /// Deletes a task type, first moving its tasks to another type of the
    /// same team or deleting them.
    ///
    /// # Errors
    ///
    /// Returns `ProtectedEntity` for the default task type, `NotFound`,
    /// `InvalidTarget`, or a custom-data validation failure of a moved task.
    #[instrument(skip(self))]
    pub async fn delete_task_type(
        &self,
        id: TaskTypeId,
        disposal: Disposal<TaskTypeId>,
    ) -> EngineResult<CascadeSummary> {
        let clock = &*self.clock;
        let summary = self
            .store
            .transact(move |catalog| catalog.delete_task_type(id, disposal, clock))
            .await?;
        log_summary("deleted task type", &summary);
        Ok(summary)
    }

    /// Deletes a team after resolving every task type it owns.
    ///
    /// # Errors
    ///
    /// Returns `ProtectedEntity` for the unassigned team, `NotFound`,
    /// `InvalidTarget`, or a custom-data validation failure during a merge.
    #[instrument(skip(self))]
    pub async fn delete_team(
        &self,
        id: TeamId,
        disposal: Disposal<TeamId>,
    ) -> EngineResult<CascadeSummary> {
        let clock = &*self.clock;
        let summary = self
            .store
            .transact(move |catalog| catalog.delete_team(id, disposal, clock))
            .await?;
        log_summary("deleted team", &summary);
        Ok(summary)
    }

    /// Deletes a theme, unlinking its projects. Returns the number of
    /// projects unlinked.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the theme does not exist, including on a
    /// repeated call.
    #[instrument(skip(self))]
    pub async fn delete_theme(&self, id: ThemeId) -> EngineResult<usize> {
        let clock = &*self.clock;
        let unlinked = self
            .store
            .transact(move |catalog| catalog.delete_theme(id, clock))
            .await?;
        info!(theme = %id, unlinked, "deleted theme");
        Ok(unlinked)
    }

    /// Deletes a project, relinking its tasks to `reassign_to` or unlinking
    /// them when `None`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InvalidTarget`.
    #[instrument(skip(self))]
    pub async fn delete_project(
        &self,
        id: ProjectId,
        reassign_to: Option<ProjectId>,
    ) -> EngineResult<CascadeSummary> {
        let clock = &*self.clock;
        let summary = self
            .store
            .transact(move |catalog| catalog.delete_project(id, reassign_to, clock))
            .await?;
        log_summary("deleted project", &summary);
        Ok(summary)
    }

    /// Deletes a project type, first moving its projects to another type or
    /// deleting them.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidTarget`, or a custom-data validation
    /// failure of a moved project.
    #[instrument(skip(self))]
    pub async fn delete_project_type(
        &self,
        id: ProjectTypeId,
        disposal: Disposal<ProjectTypeId>,
    ) -> EngineResult<CascadeSummary> {
        let clock = &*self.clock;
        let summary = self
            .store
            .transact(move |catalog| catalog.delete_project_type(id, disposal, clock))
            .await?;
        log_summary("deleted project type", &summary);
        Ok(summary)
    }

    /// Deletes a release, unlinking its tasks. Returns the number of tasks
    /// unlinked.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the release does not exist.
    #[instrument(skip(self))]
    pub async fn delete_release(&self, id: ReleaseId) -> EngineResult<usize> {
        let clock = &*self.clock;
        let unlinked = self
            .store
            .transact(move |catalog| catalog.delete_release(id, clock))
            .await?;
        info!(release = %id, unlinked, "deleted release");
        Ok(unlinked)
    }

    /// Moves every project of type `from` to type `to`, mapping statuses
    /// through `status_map` and falling back to the target's initial status.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTarget` when the types are equal or a mapped status is
    /// not in the target workflow, `NotFound`, or a custom-data validation
    /// failure.
    #[instrument(skip(self))]
    pub async fn migrate_projects(
        &self,
        from: ProjectTypeId,
        to: ProjectTypeId,
        status_map: BTreeMap<String, String>,
    ) -> EngineResult<usize> {
        let clock = &*self.clock;
        let migrated = self
            .store
            .transact(move |catalog| catalog.migrate_projects(from, to, &status_map, clock))
            .await?;
        info!(%from, %to, migrated, "migrated projects");
        Ok(migrated)
    }
}

fn log_summary(message: &'static str, summary: &CascadeSummary) {
    info!(
        reassigned = summary.reassigned,
        purged = summary.purged,
        unlinked = summary.unlinked,
        edges_removed = summary.edges_removed,
        types_moved = summary.types_moved,
        "{message}"
    );
}

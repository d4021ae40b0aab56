//! Multi-entity structural mutations.
//!
//! Each operation first computes and validates every per-entity change
//! against the current state, then applies them, then performs the
//! structural deletion. A failure in the first phase returns before anything
//! is touched.

use super::Catalog;
use crate::schema::domain::{CustomData, StatusLabel, TypeSchema, Workflow};
use crate::tracker::domain::{
    EntityRef, ProjectId, ProjectTypeId, ReleaseId, SchemaOwner, TaskId, TaskType, TaskTypeId,
    TeamId, ThemeId, task::TaskPlacement,
};
use crate::tracker::error::{EngineError, EngineResult, InvalidTarget};
use mockable::Clock;
use std::collections::BTreeMap;
use tracing::debug;

/// How the dependents of a deleted type or team are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposal<T> {
    /// Move every dependent onto the given replacement.
    Reassign(T),
    /// Delete every dependent.
    Purge,
}

/// Counts of entities touched by a cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    /// Tasks or projects moved onto a replacement.
    pub reassigned: usize,
    /// Tasks or projects deleted.
    pub purged: usize,
    /// Tasks or projects whose optional link was cleared.
    pub unlinked: usize,
    /// Dependency edges removed with deleted entities.
    pub edges_removed: usize,
    /// Task types re-parented onto another team.
    pub types_moved: usize,
}

/// Outcome of removing a workflow status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReassignment {
    /// The removed status.
    pub removed: StatusLabel,
    /// Status given to former users of the removed status, if any existed.
    pub target: Option<StatusLabel>,
    /// Number of tasks or projects reassigned.
    pub reassigned: usize,
    /// The workflow after removal.
    pub workflow: Workflow,
}

impl Catalog {
    /// Removes `status` from the workflow of `owner`, first moving every
    /// task or project holding it to `target`.
    ///
    /// Reassigned entities have their custom data revalidated against the
    /// current field schema; any failure leaves everything unchanged.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` when `status` is not a member,
    /// [`InvalidTarget`] when `target` equals `status` or is not a member,
    /// [`EngineError::TargetRequired`] when entities use the status and no
    /// target was given, or a custom-data validation failure.
    pub fn remove_workflow_status(
        &mut self,
        owner: SchemaOwner,
        status: &str,
        target: Option<&str>,
        clock: &impl Clock,
    ) -> EngineResult<StatusReassignment> {
        let schema = self.schema(owner)?;
        let removed = schema.validate_status(status)?;
        let count = self.status_usage(owner, status);
        let resolved_target = match target {
            Some(candidate) => Some(reassignment_target(schema, status, candidate)?),
            None if count > 0 => {
                return Err(EngineError::TargetRequired {
                    status: status.to_owned(),
                    count,
                });
            }
            None => None,
        };
        schema.clone().remove_status(status)?;

        let mut reassigned = 0;
        if let Some(new_status) = &resolved_target {
            reassigned = match owner {
                SchemaOwner::TaskType(type_id) => {
                    let plan = self.plan_status_move(type_id, status, new_status, schema)?;
                    self.apply_task_placements(plan, clock)
                }
                SchemaOwner::ProjectType(type_id) => {
                    let plan = self.plan_project_status_move(type_id, status, schema)?;
                    self.apply_project_data(plan, new_status, clock)
                }
            };
        }

        let workflow = self.edit_schema(owner, clock, |editable| {
            editable.remove_status(status)?;
            Ok(editable.workflow().clone())
        })?;
        Ok(StatusReassignment {
            removed,
            target: resolved_target,
            reassigned,
            workflow,
        })
    }

    /// Deletes a task type after resolving its tasks.
    ///
    /// Reassigned tasks keep their status when the target workflow contains
    /// it, otherwise they take the target's initial status; custom data is
    /// revalidated against the target schema. Purged tasks lose their
    /// dependency edges.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProtectedEntity`] for the default task type,
    /// `NotFound`, [`InvalidTarget`] for a target that is the type itself or
    /// belongs to another team, or a custom-data validation failure.
    pub fn delete_task_type(
        &mut self,
        id: TaskTypeId,
        disposal: Disposal<TaskTypeId>,
        clock: &impl Clock,
    ) -> EngineResult<CascadeSummary> {
        if id == self.defaults.task_type_id() {
            return Err(EngineError::ProtectedEntity(EntityRef::TaskType(id)));
        }
        let source_team = self.task_type(id)?.team_id();
        let affected = self.task_ids_where(|task| task.task_type_id() == id);
        let mut summary = CascadeSummary::default();

        match disposal {
            Disposal::Reassign(target_id) => {
                if target_id == id {
                    return Err(InvalidTarget::SameEntity(EntityRef::TaskType(id)).into());
                }
                let target_team = self.task_type(target_id)?.team_id();
                if target_team != source_team {
                    return Err(InvalidTarget::TeamMismatch {
                        task_type: target_id,
                        expected: source_team,
                        actual: target_team,
                    }
                    .into());
                }
                let plan = self.plan_task_retarget(&affected, target_id)?;
                summary.reassigned = self.apply_task_placements(plan, clock);
            }
            Disposal::Purge => self.purge_tasks(&affected, &mut summary),
        }

        self.task_types.remove(&id);
        Ok(summary)
    }

    /// Deletes a team after resolving every task type it owns.
    ///
    /// In reassign mode each task type moves to the target team with its
    /// tasks. When the target team already has a type with the same slug,
    /// the tasks are merged into that type instead (as by
    /// [`Catalog::delete_task_type`]) and the source type is deleted. In
    /// purge mode every task type and task of the team is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProtectedEntity`] for the unassigned team,
    /// `NotFound`, [`InvalidTarget::SameEntity`] when the target is the team
    /// itself, or a custom-data validation failure during a merge.
    pub fn delete_team(
        &mut self,
        id: TeamId,
        disposal: Disposal<TeamId>,
        clock: &impl Clock,
    ) -> EngineResult<CascadeSummary> {
        if id == self.defaults.team_id() {
            return Err(EngineError::ProtectedEntity(EntityRef::Team(id)));
        }
        self.team(id)?;
        let mut owned_types: Vec<&TaskType> = self
            .task_types
            .values()
            .filter(|task_type| task_type.team_id() == id)
            .collect();
        owned_types.sort_by(|left, right| left.slug().cmp(right.slug()));
        let owned_type_ids: Vec<TaskTypeId> = owned_types.into_iter().map(TaskType::id).collect();
        let mut summary = CascadeSummary::default();

        match disposal {
            Disposal::Reassign(target_team) => {
                if target_team == id {
                    return Err(InvalidTarget::SameEntity(EntityRef::Team(id)).into());
                }
                self.team(target_team)?;
                let mut merges = Vec::new();
                let mut moves = Vec::new();
                for type_id in owned_type_ids {
                    if let Some(merge_into) = self.same_slug_type(type_id, target_team)? {
                        let affected = self.task_ids_where(|task| task.task_type_id() == type_id);
                        merges.push((type_id, self.plan_task_retarget(&affected, merge_into)?));
                        continue;
                    }
                    moves.push(type_id);
                }

                for (type_id, plan) in merges {
                    summary.reassigned += self.apply_task_placements(plan, clock);
                    self.task_types.remove(&type_id);
                }
                for type_id in moves {
                    summary.reassigned += self.move_type_to_team(type_id, target_team, clock);
                    summary.types_moved += 1;
                }
            }
            Disposal::Purge => {
                for type_id in owned_type_ids {
                    let affected = self.task_ids_where(|task| task.task_type_id() == type_id);
                    self.purge_tasks(&affected, &mut summary);
                    self.task_types.remove(&type_id);
                }
            }
        }

        self.teams.remove(&id);
        Ok(summary)
    }

    /// Deletes a theme, unlinking every project that references it.
    /// Projects are never deleted. Returns the number of projects unlinked.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the theme does not exist, including when it
    /// was already deleted.
    pub fn delete_theme(&mut self, id: ThemeId, clock: &impl Clock) -> EngineResult<usize> {
        self.theme(id)?;
        let mut unlinked = 0;
        for project in self
            .projects
            .values_mut()
            .filter(|project| project.theme_id() == Some(id))
        {
            project.set_theme(None, clock);
            unlinked += 1;
        }
        self.themes.remove(&id);
        Ok(unlinked)
    }

    /// Deletes a project. Its tasks are relinked to `reassign_to`, or
    /// unlinked when `None`; their status and custom data are untouched.
    /// Project dependency edges touching it are removed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for the project or the target, or
    /// [`InvalidTarget::SameEntity`] when the target is the project itself.
    pub fn delete_project(
        &mut self,
        id: ProjectId,
        reassign_to: Option<ProjectId>,
        clock: &impl Clock,
    ) -> EngineResult<CascadeSummary> {
        self.project(id)?;
        if let Some(target) = reassign_to {
            if target == id {
                return Err(InvalidTarget::SameEntity(EntityRef::Project(id)).into());
            }
            self.project(target)?;
        }

        let mut summary = CascadeSummary::default();
        let relinked = self.relink_project_tasks(id, reassign_to, clock);
        if reassign_to.is_some() {
            summary.reassigned = relinked;
        } else {
            summary.unlinked = relinked;
        }
        summary.edges_removed = self.project_graph.remove_node(id);
        self.projects.remove(&id);
        Ok(summary)
    }

    /// Deletes a project type after resolving its projects.
    ///
    /// Reassigned projects keep their status when the target workflow
    /// contains it, otherwise they take the target's initial status; custom
    /// data is revalidated. Purged projects unlink their tasks and lose their
    /// dependency edges.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, [`InvalidTarget::SameEntity`], or a custom-data
    /// validation failure.
    pub fn delete_project_type(
        &mut self,
        id: ProjectTypeId,
        disposal: Disposal<ProjectTypeId>,
        clock: &impl Clock,
    ) -> EngineResult<CascadeSummary> {
        self.project_type(id)?;
        let affected = self.project_ids_where(|project| project.project_type_id() == id);
        let mut summary = CascadeSummary::default();

        match disposal {
            Disposal::Reassign(target_id) => {
                if target_id == id {
                    return Err(InvalidTarget::SameEntity(EntityRef::ProjectType(id)).into());
                }
                let target = self.project_type(target_id)?.schema();
                let plan = self.plan_project_retype(&affected, target, |status| {
                    target.carry_over_status(status)
                })?;
                summary.reassigned = self.apply_project_retype(plan, target_id, clock);
            }
            Disposal::Purge => {
                for project_id in affected {
                    summary.unlinked += self.relink_project_tasks(project_id, None, clock);
                    summary.edges_removed += self.project_graph.remove_node(project_id);
                    self.projects.remove(&project_id);
                    summary.purged += 1;
                }
            }
        }

        self.project_types.remove(&id);
        Ok(summary)
    }

    /// Deletes a release, unlinking its tasks. Returns the number of tasks
    /// unlinked.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the release does not exist.
    pub fn delete_release(&mut self, id: ReleaseId, clock: &impl Clock) -> EngineResult<usize> {
        self.release(id)?;
        let mut unlinked = 0;
        for task in self
            .tasks
            .values_mut()
            .filter(|task| task.release_id() == Some(id))
        {
            task.set_release(None, clock);
            unlinked += 1;
        }
        self.releases.remove(&id);
        Ok(unlinked)
    }

    /// Moves every project of type `from` to type `to`.
    ///
    /// Each project's status is mapped through `status_map`; statuses
    /// without a mapping become the target's initial status. Custom data is
    /// revalidated against the target schema. Returns the number of projects
    /// migrated.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTarget::SameEntity`] when `from` equals `to`,
    /// [`InvalidTarget::StatusNotInWorkflow`] when a mapped status is not in
    /// the target workflow, `NotFound`, or a custom-data validation failure.
    pub fn migrate_projects(
        &mut self,
        from: ProjectTypeId,
        to: ProjectTypeId,
        status_map: &BTreeMap<String, String>,
        clock: &impl Clock,
    ) -> EngineResult<usize> {
        if from == to {
            return Err(InvalidTarget::SameEntity(EntityRef::ProjectType(from)).into());
        }
        self.project_type(from)?;
        let target = self.project_type(to)?.schema();
        let mut resolved_map = BTreeMap::new();
        for (source_status, target_status) in status_map {
            let label = target.workflow().find(target_status).cloned().ok_or_else(|| {
                EngineError::from(InvalidTarget::StatusNotInWorkflow {
                    status: target_status.clone(),
                })
            })?;
            resolved_map.insert(source_status.as_str(), label);
        }

        let affected = self.project_ids_where(|project| project.project_type_id() == from);
        let plan = self.plan_project_retype(&affected, target, |status| {
            resolved_map
                .get(status.as_str())
                .unwrap_or_else(|| target.workflow().initial())
                .clone()
        })?;
        Ok(self.apply_project_retype(plan, to, clock))
    }

    /// Type owned by `team_id` with the same slug as `type_id`, if any.
    fn same_slug_type(
        &self,
        type_id: TaskTypeId,
        team_id: TeamId,
    ) -> EngineResult<Option<TaskTypeId>> {
        let slug = self.task_type(type_id)?.slug();
        Ok(self
            .task_types
            .values()
            .find(|candidate| candidate.team_id() == team_id && candidate.slug() == slug)
            .map(TaskType::id))
    }

    fn plan_task_retarget(
        &self,
        task_ids: &[TaskId],
        target_id: TaskTypeId,
    ) -> EngineResult<Vec<(TaskId, TaskPlacement)>> {
        let target = self.task_type(target_id)?;
        let schema = target.schema();
        task_ids
            .iter()
            .map(|&task_id| {
                let task = self.task(task_id)?;
                let placement = TaskPlacement {
                    team_id: target.team_id(),
                    task_type_id: target_id,
                    status: schema.carry_over_status(task.status()),
                    custom_data: schema.validate_custom_data(task.custom_data())?,
                };
                Ok((task_id, placement))
            })
            .collect()
    }

    fn plan_status_move(
        &self,
        type_id: TaskTypeId,
        status: &str,
        new_status: &StatusLabel,
        schema: &TypeSchema,
    ) -> EngineResult<Vec<(TaskId, TaskPlacement)>> {
        self.task_ids_where(|task| task.task_type_id() == type_id && task.status() == status)
            .into_iter()
            .map(|task_id| {
                let task = self.task(task_id)?;
                let placement = TaskPlacement {
                    team_id: task.team_id(),
                    task_type_id: type_id,
                    status: new_status.clone(),
                    custom_data: schema.validate_custom_data(task.custom_data())?,
                };
                Ok((task_id, placement))
            })
            .collect()
    }

    fn plan_project_status_move(
        &self,
        type_id: ProjectTypeId,
        status: &str,
        schema: &TypeSchema,
    ) -> EngineResult<Vec<(ProjectId, CustomData)>> {
        self.project_ids_where(|project| {
            project.project_type_id() == type_id && project.status() == status
        })
        .into_iter()
        .map(|project_id| {
            let project = self.project(project_id)?;
            Ok((project_id, schema.validate_custom_data(project.custom_data())?))
        })
        .collect()
    }

    fn plan_project_retype(
        &self,
        project_ids: &[ProjectId],
        target: &TypeSchema,
        status_for: impl Fn(&StatusLabel) -> StatusLabel,
    ) -> EngineResult<Vec<(ProjectId, StatusLabel, CustomData)>> {
        project_ids
            .iter()
            .map(|&project_id| {
                let project = self.project(project_id)?;
                let status = status_for(project.status());
                let custom_data = target.validate_custom_data(project.custom_data())?;
                Ok((project_id, status, custom_data))
            })
            .collect()
    }

    fn apply_task_placements(
        &mut self,
        plan: Vec<(TaskId, TaskPlacement)>,
        clock: &impl Clock,
    ) -> usize {
        let mut applied = 0;
        for (task_id, placement) in plan {
            if let Some(task) = self.tasks.get_mut(&task_id) {
                debug!(task = %task_id, status = %placement.status, "reassigning task");
                task.place(placement, clock);
                applied += 1;
            }
        }
        applied
    }

    fn apply_project_data(
        &mut self,
        plan: Vec<(ProjectId, CustomData)>,
        new_status: &StatusLabel,
        clock: &impl Clock,
    ) -> usize {
        let mut applied = 0;
        for (project_id, custom_data) in plan {
            if let Some(project) = self.projects.get_mut(&project_id) {
                debug!(project = %project_id, status = %new_status, "reassigning project");
                project.set_status(new_status.clone(), clock);
                project.set_custom_data(custom_data, clock);
                applied += 1;
            }
        }
        applied
    }

    fn apply_project_retype(
        &mut self,
        plan: Vec<(ProjectId, StatusLabel, CustomData)>,
        target_id: ProjectTypeId,
        clock: &impl Clock,
    ) -> usize {
        let mut applied = 0;
        for (project_id, status, custom_data) in plan {
            if let Some(project) = self.projects.get_mut(&project_id) {
                debug!(project = %project_id, %status, "retyping project");
                project.retype(target_id, status, custom_data, clock);
                applied += 1;
            }
        }
        applied
    }

    fn move_type_to_team(
        &mut self,
        type_id: TaskTypeId,
        team_id: TeamId,
        clock: &impl Clock,
    ) -> usize {
        if let Some(task_type) = self.task_types.get_mut(&type_id) {
            task_type.move_to_team(team_id, clock);
        }
        let mut moved = 0;
        for task in self
            .tasks
            .values_mut()
            .filter(|task| task.task_type_id() == type_id)
        {
            task.move_to_team(team_id, clock);
            moved += 1;
        }
        moved
    }

    fn purge_tasks(&mut self, task_ids: &[TaskId], summary: &mut CascadeSummary) {
        for &task_id in task_ids {
            summary.edges_removed += self.purge_task(task_id);
            summary.purged += 1;
        }
    }

    fn relink_project_tasks(
        &mut self,
        project_id: ProjectId,
        reassign_to: Option<ProjectId>,
        clock: &impl Clock,
    ) -> usize {
        let mut relinked = 0;
        for task in self
            .tasks
            .values_mut()
            .filter(|task| task.project_id() == Some(project_id))
        {
            task.set_project(reassign_to, clock);
            relinked += 1;
        }
        relinked
    }
}

/// Checks that `candidate` is a member of `schema` other than `removed`.
fn reassignment_target(
    schema: &TypeSchema,
    removed: &str,
    candidate: &str,
) -> EngineResult<StatusLabel> {
    if candidate == removed {
        return Err(InvalidTarget::SameStatus {
            status: candidate.to_owned(),
        }
        .into());
    }
    schema.workflow().find(candidate).cloned().ok_or_else(|| {
        InvalidTarget::StatusNotInWorkflow {
            status: candidate.to_owned(),
        }
        .into()
    })
}

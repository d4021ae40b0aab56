//! Task and project records and their dependency edges.

use super::Catalog;
use crate::schema::domain::{CustomData, StatusLabel, TypeSchema};
use crate::tracker::domain::{
    NewProject, NewTask, Project, ProjectFilter, ProjectId, ProjectUpdate, ReleaseId, Task,
    TaskFilter, TaskId, TaskTypeId, TaskUpdate, TeamId,
    task::{TaskPlacement, task_title},
};
use crate::tracker::error::{EngineResult, InvalidTarget};
use mockable::Clock;

impl Catalog {
    /// Creates a task, issuing its display identifier.
    ///
    /// The status defaults to the initial status of the type's workflow; an
    /// explicit status and the custom data are validated against the type's
    /// current schema.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing team, type, project or
    /// release, [`InvalidTarget::TeamMismatch`] when the type belongs to
    /// another team, a domain error for a blank title, or a validation failure.
    pub fn create_task(&mut self, request: NewTask, clock: &impl Clock) -> EngineResult<Task> {
        let title = task_title(request.title.clone())?;
        self.team(request.team_id)?;
        let schema = self.team_type_schema(request.team_id, request.task_type_id)?;
        let status = match &request.status {
            Some(candidate) => schema.validate_status(candidate)?,
            None => schema.workflow().initial().clone(),
        };
        let custom_data = schema.validate_custom_data(&request.custom_data)?;
        self.ensure_links_exist(request.project_id, request.release_id)?;

        let placement = TaskPlacement {
            team_id: request.team_id,
            task_type_id: request.task_type_id,
            status,
            custom_data,
        };
        let prefix = self.id_prefix.clone();
        let display_id = self.issue_display_id(&prefix)?;
        let task = Task::new(display_id, title, request, placement, clock);
        self.tasks.insert(task.id(), task.clone());
        Ok(task)
    }

    /// Applies a partial update to a task.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for the task or any newly referenced
    /// entity, [`InvalidTarget::TeamMismatch`] when the resulting type does
    /// not belong to the resulting team, or a validation failure.
    pub fn update_task(
        &mut self,
        id: TaskId,
        update: &TaskUpdate,
        clock: &impl Clock,
    ) -> EngineResult<Task> {
        let current = self.task(id)?;
        let team_id = update.team_id.unwrap_or_else(|| current.team_id());
        let task_type_id = update.task_type_id.unwrap_or_else(|| current.task_type_id());
        let retyped = task_type_id != current.task_type_id();
        self.team(team_id)?;
        let schema = self.team_type_schema(team_id, task_type_id)?;

        let status = match &update.status {
            Some(candidate) => schema.validate_status(candidate)?,
            None if retyped => schema.carry_over_status(current.status()),
            None => current.status().clone(),
        };
        let custom_data = match &update.custom_data {
            Some(candidate) => schema.validate_custom_data(candidate)?,
            None if retyped => schema.validate_custom_data(current.custom_data())?,
            None => current.custom_data().clone(),
        };
        self.ensure_links_exist(update.project_id.flatten(), update.release_id.flatten())?;

        let mut updated = current.clone();
        updated.apply_details(update, clock)?;
        updated.place(
            TaskPlacement {
                team_id,
                task_type_id,
                status,
                custom_data,
            },
            clock,
        );
        self.tasks.insert(id, updated.clone());
        Ok(updated)
    }

    /// Deletes a task and every dependency edge touching it, returning the
    /// number of edges removed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    pub fn delete_task(&mut self, id: TaskId) -> EngineResult<usize> {
        self.task(id)?;
        Ok(self.purge_task(id))
    }

    /// Returns the tasks matching `filter`, ordered by display identifier.
    #[must_use]
    pub fn find_tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        self.task_ids_where(|task| filter.matches(task))
            .into_iter()
            .filter_map(|id| self.tasks.get(&id).cloned())
            .collect()
    }

    /// Records that task `from` depends on task `to`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing task or
    /// a dependency error for a self, duplicate or cyclic edge.
    pub fn add_task_dependency(&mut self, from: TaskId, to: TaskId) -> EngineResult<()> {
        self.task(from)?;
        self.task(to)?;
        self.task_graph.add_edge(from, to)?;
        Ok(())
    }

    /// Removes the edge `from -> to`, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when either task does not exist.
    pub fn remove_task_dependency(&mut self, from: TaskId, to: TaskId) -> EngineResult<bool> {
        self.task(from)?;
        self.task(to)?;
        Ok(self.task_graph.remove_edge(from, to))
    }

    /// Returns the tasks `id` depends on.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    pub fn task_dependencies(&self, id: TaskId) -> EngineResult<Vec<Task>> {
        self.task(id)?;
        Ok(self.collect_tasks(self.task_graph.dependencies(id)))
    }

    /// Returns the tasks that depend on `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the task does not exist.
    pub fn task_dependents(&self, id: TaskId) -> EngineResult<Vec<Task>> {
        self.task(id)?;
        Ok(self.collect_tasks(self.task_graph.dependents(id)))
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing type or theme, or a
    /// validation failure.
    pub fn create_project(
        &mut self,
        request: NewProject,
        clock: &impl Clock,
    ) -> EngineResult<Project> {
        let schema = self.project_type(request.project_type_id)?.schema();
        let status = match &request.status {
            Some(candidate) => schema.validate_status(candidate)?,
            None => schema.workflow().initial().clone(),
        };
        let custom_data = schema.validate_custom_data(&request.custom_data)?;
        if let Some(theme_id) = request.theme_id {
            self.theme(theme_id)?;
        }
        let project = Project::new(request, status, custom_data, clock)?;
        self.projects.insert(project.id(), project.clone());
        Ok(project)
    }

    /// Applies a partial update to a project.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for the project or a newly linked
    /// theme, or a validation failure.
    pub fn update_project(
        &mut self,
        id: ProjectId,
        update: &ProjectUpdate,
        clock: &impl Clock,
    ) -> EngineResult<Project> {
        let current = self.project(id)?;
        let schema = self.project_type(current.project_type_id())?.schema();
        let status: StatusLabel = match &update.status {
            Some(candidate) => schema.validate_status(candidate)?,
            None => current.status().clone(),
        };
        let custom_data: Option<CustomData> = update
            .custom_data
            .as_ref()
            .map(|candidate| schema.validate_custom_data(candidate))
            .transpose()?;
        if let Some(theme_id) = update.theme_id.flatten() {
            self.theme(theme_id)?;
        }

        let mut updated = current.clone();
        updated.apply_details(update, clock)?;
        updated.set_status(status, clock);
        if let Some(validated) = custom_data {
            updated.set_custom_data(validated, clock);
        }
        self.projects.insert(id, updated.clone());
        Ok(updated)
    }

    /// Returns the projects matching `filter`, ordered by creation time.
    #[must_use]
    pub fn find_projects(&self, filter: &ProjectFilter) -> Vec<Project> {
        self.project_ids_where(|project| filter.matches(project))
            .into_iter()
            .filter_map(|id| self.projects.get(&id).cloned())
            .collect()
    }

    /// Records that project `from` depends on project `to`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a missing project or
    /// a dependency error for a self, duplicate or cyclic edge.
    pub fn add_project_dependency(&mut self, from: ProjectId, to: ProjectId) -> EngineResult<()> {
        self.project(from)?;
        self.project(to)?;
        self.project_graph.add_edge(from, to)?;
        Ok(())
    }

    /// Removes the edge `from -> to`, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when either project does not exist.
    pub fn remove_project_dependency(
        &mut self,
        from: ProjectId,
        to: ProjectId,
    ) -> EngineResult<bool> {
        self.project(from)?;
        self.project(to)?;
        Ok(self.project_graph.remove_edge(from, to))
    }

    /// Returns the projects `id` depends on.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the project does not exist.
    pub fn project_dependencies(&self, id: ProjectId) -> EngineResult<Vec<Project>> {
        self.project(id)?;
        Ok(self.collect_projects(self.project_graph.dependencies(id)))
    }

    /// Returns the projects that depend on `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the project does not exist.
    pub fn project_dependents(&self, id: ProjectId) -> EngineResult<Vec<Project>> {
        self.project(id)?;
        Ok(self.collect_projects(self.project_graph.dependents(id)))
    }

    /// Schema of `task_type_id`, checking it belongs to `team_id`.
    fn team_type_schema(
        &self,
        team_id: TeamId,
        task_type_id: TaskTypeId,
    ) -> EngineResult<&TypeSchema> {
        let task_type = self.task_type(task_type_id)?;
        if task_type.team_id() != team_id {
            return Err(InvalidTarget::TeamMismatch {
                task_type: task_type_id,
                expected: team_id,
                actual: task_type.team_id(),
            }
            .into());
        }
        Ok(task_type.schema())
    }

    fn ensure_links_exist(
        &self,
        project_id: Option<ProjectId>,
        release_id: Option<ReleaseId>,
    ) -> EngineResult<()> {
        if let Some(project) = project_id {
            self.project(project)?;
        }
        if let Some(release) = release_id {
            self.release(release)?;
        }
        Ok(())
    }

    /// Removes a task and its edges, returning the number of edges removed.
    pub(super) fn purge_task(&mut self, id: TaskId) -> usize {
        self.tasks.remove(&id);
        self.task_graph.remove_node(id)
    }

    fn collect_tasks(&self, ids: impl Iterator<Item = TaskId>) -> Vec<Task> {
        let mut tasks: Vec<Task> = ids.filter_map(|id| self.tasks.get(&id).cloned()).collect();
        tasks.sort_by_key(|task| task.display_id().sequence());
        tasks
    }

    fn collect_projects(&self, ids: impl Iterator<Item = ProjectId>) -> Vec<Project> {
        let mut projects: Vec<Project> = ids
            .filter_map(|id| self.projects.get(&id).cloned())
            .collect();
        projects.sort_by_key(|project| (project.created_at(), project.id()));
        projects
    }
}

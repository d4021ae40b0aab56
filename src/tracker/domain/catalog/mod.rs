//! The tracker aggregate: every entity, both dependency graphs and the
//! display identifier counters of one workspace.
//!
//! A [`Catalog`] is the attached copy a transaction works on. Its mutating
//! methods check every precondition before touching state, so a failed call
//! leaves the catalog as it was; stores additionally discard the working copy
//! of any transaction whose closure fails.

mod cascade;
mod directory;
mod integrity;
mod records;
mod registry;

pub use cascade::{CascadeSummary, Disposal, StatusReassignment};
pub use directory::TeamStats;
pub use integrity::IntegrityViolation;
pub use registry::{StatusCount, StatusRemoval, TypeStats};

use super::{
    EntityRef, Project, ProjectId, ProjectType, ProjectTypeId, Release, ReleaseId, SchemaOwner,
    Task, TaskId, TaskType, TaskTypeId, Team, TeamId, Theme, ThemeId,
};
use crate::config::EngineConfig;
use crate::display_id::domain::{DisplayId, DisplayIdError, IdPrefix, SequenceCounters};
use crate::graph::DependencyGraph;
use crate::schema::domain::TypeSchema;
use crate::tracker::error::{EngineError, EngineResult};
use mockable::Clock;
use std::collections::HashMap;

/// Identities of the protected fallback team and its task type.
///
/// Both are created when a catalog is bootstrapped and can never be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnassignedDefaults {
    team_id: TeamId,
    task_type_id: TaskTypeId,
}

impl UnassignedDefaults {
    /// Returns the protected team.
    #[must_use]
    pub const fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Returns the protected task type.
    #[must_use]
    pub const fn task_type_id(&self) -> TaskTypeId {
        self.task_type_id
    }
}

/// Complete state of one workspace.
#[derive(Debug, Clone)]
pub struct Catalog {
    defaults: UnassignedDefaults,
    id_prefix: IdPrefix,
    sequences: SequenceCounters,
    teams: HashMap<TeamId, Team>,
    task_types: HashMap<TaskTypeId, TaskType>,
    project_types: HashMap<ProjectTypeId, ProjectType>,
    themes: HashMap<ThemeId, Theme>,
    releases: HashMap<ReleaseId, Release>,
    projects: HashMap<ProjectId, Project>,
    tasks: HashMap<TaskId, Task>,
    task_graph: DependencyGraph<TaskId>,
    project_graph: DependencyGraph<ProjectId>,
}

impl Catalog {
    /// Creates a catalog holding only the protected defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the configured team name, task type name
    /// or workflow is invalid.
    pub fn bootstrap(config: &EngineConfig, clock: &impl Clock) -> EngineResult<Self> {
        let team = Team::new(config.unassigned_team_name.as_str(), clock)?;
        let task_type = TaskType::new(
            team.id(),
            config.default_task_type_name.as_str(),
            config.default_workflow()?,
            clock,
        )?;
        let defaults = UnassignedDefaults {
            team_id: team.id(),
            task_type_id: task_type.id(),
        };

        Ok(Self {
            defaults,
            id_prefix: config.task_id_prefix.clone(),
            sequences: SequenceCounters::new(),
            teams: HashMap::from([(team.id(), team)]),
            task_types: HashMap::from([(task_type.id(), task_type)]),
            project_types: HashMap::new(),
            themes: HashMap::new(),
            releases: HashMap::new(),
            projects: HashMap::new(),
            tasks: HashMap::new(),
            task_graph: DependencyGraph::new(),
            project_graph: DependencyGraph::new(),
        })
    }

    /// Returns the protected defaults.
    #[must_use]
    pub const fn defaults(&self) -> &UnassignedDefaults {
        &self.defaults
    }

    /// Returns the prefix used for new display identifiers.
    #[must_use]
    pub const fn id_prefix(&self) -> &IdPrefix {
        &self.id_prefix
    }

    /// Returns the highest display identifier number issued for `prefix`.
    #[must_use]
    pub fn last_issued(&self, prefix: &IdPrefix) -> u64 {
        self.sequences.last_issued(prefix)
    }

    pub(crate) fn issue_display_id(
        &mut self,
        prefix: &IdPrefix,
    ) -> Result<DisplayId, DisplayIdError> {
        self.sequences.next(prefix)
    }

    /// Returns the team with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no such team exists.
    pub fn team(&self, id: TeamId) -> EngineResult<&Team> {
        self.teams
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(EntityRef::Team(id)))
    }

    /// Iterates every team.
    pub fn teams(&self) -> impl Iterator<Item = &Team> + '_ {
        self.teams.values()
    }

    /// Returns the task type with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no such task type exists.
    pub fn task_type(&self, id: TaskTypeId) -> EngineResult<&TaskType> {
        self.task_types
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(EntityRef::TaskType(id)))
    }

    /// Iterates every task type.
    pub fn task_types(&self) -> impl Iterator<Item = &TaskType> + '_ {
        self.task_types.values()
    }

    /// Returns the project type with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no such project type exists.
    pub fn project_type(&self, id: ProjectTypeId) -> EngineResult<&ProjectType> {
        self.project_types
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(EntityRef::ProjectType(id)))
    }

    /// Iterates every project type.
    pub fn project_types(&self) -> impl Iterator<Item = &ProjectType> + '_ {
        self.project_types.values()
    }

    /// Returns the theme with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no such theme exists.
    pub fn theme(&self, id: ThemeId) -> EngineResult<&Theme> {
        self.themes
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(EntityRef::Theme(id)))
    }

    /// Iterates every theme.
    pub fn themes(&self) -> impl Iterator<Item = &Theme> + '_ {
        self.themes.values()
    }

    /// Returns the release with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no such release exists.
    pub fn release(&self, id: ReleaseId) -> EngineResult<&Release> {
        self.releases
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(EntityRef::Release(id)))
    }

    /// Iterates every release.
    pub fn releases(&self) -> impl Iterator<Item = &Release> + '_ {
        self.releases.values()
    }

    /// Returns the project with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no such project exists.
    pub fn project(&self, id: ProjectId) -> EngineResult<&Project> {
        self.projects
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(EntityRef::Project(id)))
    }

    /// Iterates every project.
    pub fn projects(&self) -> impl Iterator<Item = &Project> + '_ {
        self.projects.values()
    }

    /// Returns the task with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no such task exists.
    pub fn task(&self, id: TaskId) -> EngineResult<&Task> {
        self.tasks
            .get(&id)
            .ok_or_else(|| EngineError::NotFound(EntityRef::Task(id)))
    }

    /// Returns the task carrying `display_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no task carries it.
    pub fn task_by_display_id(&self, display_id: &DisplayId) -> EngineResult<&Task> {
        self.tasks
            .values()
            .find(|task| task.display_id() == display_id)
            .ok_or_else(|| EngineError::NotFound(EntityRef::TaskDisplayId(display_id.clone())))
    }

    /// Iterates every task.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.values()
    }

    /// Returns the task dependency graph.
    #[must_use]
    pub const fn task_graph(&self) -> &DependencyGraph<TaskId> {
        &self.task_graph
    }

    /// Returns the project dependency graph.
    #[must_use]
    pub const fn project_graph(&self) -> &DependencyGraph<ProjectId> {
        &self.project_graph
    }

    /// Returns the current workflow and field schema of `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the type does not exist.
    pub fn schema(&self, owner: SchemaOwner) -> EngineResult<&TypeSchema> {
        match owner {
            SchemaOwner::TaskType(id) => self.task_type(id).map(TaskType::schema),
            SchemaOwner::ProjectType(id) => self.project_type(id).map(ProjectType::schema),
        }
    }

    /// Counts the tasks or projects of `owner` whose status is `status`.
    #[must_use]
    pub fn status_usage(&self, owner: SchemaOwner, status: &str) -> usize {
        match owner {
            SchemaOwner::TaskType(id) => self
                .tasks
                .values()
                .filter(|task| task.task_type_id() == id && task.status() == status)
                .count(),
            SchemaOwner::ProjectType(id) => self
                .projects
                .values()
                .filter(|project| project.project_type_id() == id && project.status() == status)
                .count(),
        }
    }

    /// Runs `edit` on the schema of `owner` and stamps the owning type.
    fn edit_schema<T>(
        &mut self,
        owner: SchemaOwner,
        clock: &impl Clock,
        edit: impl FnOnce(&mut TypeSchema) -> EngineResult<T>,
    ) -> EngineResult<T> {
        match owner {
            SchemaOwner::TaskType(id) => {
                let task_type = self
                    .task_types
                    .get_mut(&id)
                    .ok_or_else(|| EngineError::NotFound(EntityRef::TaskType(id)))?;
                let value = edit(task_type.schema_mut())?;
                task_type.touch(clock);
                Ok(value)
            }
            SchemaOwner::ProjectType(id) => {
                let project_type = self
                    .project_types
                    .get_mut(&id)
                    .ok_or_else(|| EngineError::NotFound(EntityRef::ProjectType(id)))?;
                let value = edit(project_type.schema_mut())?;
                project_type.touch(clock);
                Ok(value)
            }
        }
    }

    /// Task identifiers matching `predicate`, ordered by display identifier.
    fn task_ids_where(&self, predicate: impl Fn(&Task) -> bool) -> Vec<TaskId> {
        let mut matching: Vec<&Task> = self.tasks.values().filter(|task| predicate(task)).collect();
        matching.sort_by_key(|task| task.display_id().sequence());
        matching.into_iter().map(Task::id).collect()
    }

    /// Project identifiers matching `predicate`, ordered by creation time.
    fn project_ids_where(&self, predicate: impl Fn(&Project) -> bool) -> Vec<ProjectId> {
        let mut matching: Vec<&Project> = self
            .projects
            .values()
            .filter(|project| predicate(project))
            .collect();
        matching.sort_by_key(|project| (project.created_at(), project.id()));
        matching.into_iter().map(Project::id).collect()
    }
}

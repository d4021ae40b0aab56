//! Whole-catalog structural checks run before a transaction commits.

use super::Catalog;
use crate::display_id::domain::DisplayId;
use crate::schema::domain::StatusLabel;
use crate::tracker::domain::{EntityRef, ProjectId, ProjectTypeId, TaskId, TaskTypeId, TeamId};
use std::collections::HashSet;
use thiserror::Error;

/// A structural invariant that does not hold.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// A task holds a status outside its type's workflow.
    #[error("task {task} has status '{status}' outside the workflow of its type")]
    TaskStatus {
        /// The offending task.
        task: TaskId,
        /// Its status.
        status: StatusLabel,
    },

    /// A project holds a status outside its type's workflow.
    #[error("project {project} has status '{status}' outside the workflow of its type")]
    ProjectStatus {
        /// The offending project.
        project: ProjectId,
        /// Its status.
        status: StatusLabel,
    },

    /// A task or project references an entity that does not exist.
    #[error("{owner} references missing {missing}")]
    DanglingReference {
        /// The referencing entity.
        owner: EntityRef,
        /// The missing entity.
        missing: EntityRef,
    },

    /// A task's type belongs to another team than the task.
    #[error("task {task} belongs to team {team} but its type {task_type} does not")]
    TeamMismatch {
        /// The offending task.
        task: TaskId,
        /// The task's team.
        team: TeamId,
        /// The task's type.
        task_type: TaskTypeId,
    },

    /// The unassigned team or its default task type is missing or detached.
    #[error("the unassigned team or its default task type is missing")]
    MissingDefaults,

    /// A dependency edge touches a deleted task or project.
    #[error("dependency edge {from} -> {to} touches a missing {kind}")]
    DanglingEdge {
        /// Kind of the graph's nodes.
        kind: &'static str,
        /// Source of the edge.
        from: String,
        /// Target of the edge.
        to: String,
    },

    /// A dependency graph contains a cycle.
    #[error("{kind} dependency graph contains a cycle")]
    Cycle {
        /// Kind of the graph's nodes.
        kind: &'static str,
    },

    /// Two tasks carry the same display identifier.
    #[error("display identifier {0} is used by more than one task")]
    DuplicateDisplayId(DisplayId),

    /// A task carries a display identifier above the issued counter.
    #[error("display identifier {0} was never issued")]
    UnissuedDisplayId(DisplayId),
}

impl Catalog {
    /// Checks the structural invariants that every committed catalog holds.
    ///
    /// Custom data is not rechecked here; it is validated on every write
    /// and stale keys are tolerated until the next one.
    ///
    /// # Errors
    ///
    /// Returns the first [`IntegrityViolation`] found.
    pub fn verify_integrity(&self) -> Result<(), IntegrityViolation> {
        self.verify_defaults()?;
        self.verify_tasks()?;
        self.verify_projects()?;
        self.verify_graphs()
    }

    fn verify_defaults(&self) -> Result<(), IntegrityViolation> {
        let team_id = self.defaults.team_id();
        let attached = self.teams.contains_key(&team_id)
            && self
                .task_types
                .get(&self.defaults.task_type_id())
                .is_some_and(|task_type| task_type.team_id() == team_id);
        if attached {
            Ok(())
        } else {
            Err(IntegrityViolation::MissingDefaults)
        }
    }

    fn verify_tasks(&self) -> Result<(), IntegrityViolation> {
        let mut seen: HashSet<&DisplayId> = HashSet::new();
        for task in self.tasks.values() {
            let owner = EntityRef::Task(task.id());
            if !self.teams.contains_key(&task.team_id()) {
                return Err(IntegrityViolation::DanglingReference {
                    owner,
                    missing: EntityRef::Team(task.team_id()),
                });
            }
            let task_type = self.task_types.get(&task.task_type_id()).ok_or_else(|| {
                IntegrityViolation::DanglingReference {
                    owner: owner.clone(),
                    missing: EntityRef::TaskType(task.task_type_id()),
                }
            })?;
            if task_type.team_id() != task.team_id() {
                return Err(IntegrityViolation::TeamMismatch {
                    task: task.id(),
                    team: task.team_id(),
                    task_type: task_type.id(),
                });
            }
            if !task_type.workflow().contains(task.status().as_str()) {
                return Err(IntegrityViolation::TaskStatus {
                    task: task.id(),
                    status: task.status().clone(),
                });
            }
            if let Some(project_id) = task.project_id() {
                require_link(&owner, self.projects.contains_key(&project_id), || {
                    EntityRef::Project(project_id)
                })?;
            }
            if let Some(release_id) = task.release_id() {
                require_link(&owner, self.releases.contains_key(&release_id), || {
                    EntityRef::Release(release_id)
                })?;
            }

            let display_id = task.display_id();
            if !seen.insert(display_id) {
                return Err(IntegrityViolation::DuplicateDisplayId(display_id.clone()));
            }
            if display_id.sequence() > self.sequences.last_issued(display_id.prefix()) {
                return Err(IntegrityViolation::UnissuedDisplayId(display_id.clone()));
            }
        }
        Ok(())
    }

    fn verify_projects(&self) -> Result<(), IntegrityViolation> {
        for project in self.projects.values() {
            let owner = EntityRef::Project(project.id());
            let project_type_id: ProjectTypeId = project.project_type_id();
            let project_type = self.project_types.get(&project_type_id).ok_or_else(|| {
                IntegrityViolation::DanglingReference {
                    owner: owner.clone(),
                    missing: EntityRef::ProjectType(project_type_id),
                }
            })?;
            if !project_type.workflow().contains(project.status().as_str()) {
                return Err(IntegrityViolation::ProjectStatus {
                    project: project.id(),
                    status: project.status().clone(),
                });
            }
            if let Some(theme_id) = project.theme_id() {
                require_link(&owner, self.themes.contains_key(&theme_id), || {
                    EntityRef::Theme(theme_id)
                })?;
            }
        }
        Ok(())
    }

    fn verify_graphs(&self) -> Result<(), IntegrityViolation> {
        for (from, to) in self.task_graph.edges() {
            if !self.tasks.contains_key(&from) || !self.tasks.contains_key(&to) {
                return Err(IntegrityViolation::DanglingEdge {
                    kind: "task",
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
        for (from, to) in self.project_graph.edges() {
            if !self.projects.contains_key(&from) || !self.projects.contains_key(&to) {
                return Err(IntegrityViolation::DanglingEdge {
                    kind: "project",
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
        if self.task_graph.has_cycle() {
            return Err(IntegrityViolation::Cycle { kind: "task" });
        }
        if self.project_graph.has_cycle() {
            return Err(IntegrityViolation::Cycle { kind: "project" });
        }
        Ok(())
    }
}

fn require_link(
    owner: &EntityRef,
    present: bool,
    missing: impl FnOnce() -> EntityRef,
) -> Result<(), IntegrityViolation> {
    if present {
        Ok(())
    } else {
        Err(IntegrityViolation::DanglingReference {
            owner: owner.clone(),
            missing: missing(),
        })
    }
}

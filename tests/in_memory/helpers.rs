//! Shared fixtures for in-memory workspace integration tests.

use corepm::config::EngineConfig;
use corepm::schema::domain::{FieldDefinition, FieldSchema, FieldType, Workflow};
use corepm::tracker::{
    adapters::memory::InMemoryWorkspaceStore,
    domain::{NewTask, Task, TaskTypeId, TeamId},
    services::{
        CascadeCoordinator, DirectoryService, ProjectService, SchemaRegistryService, TaskService,
        TeamDefinition, TypeDefinition,
    },
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Every service wired to one shared in-memory store.
pub struct Engine {
    pub store: Arc<InMemoryWorkspaceStore>,
    pub directory: DirectoryService<InMemoryWorkspaceStore, DefaultClock>,
    pub registry: SchemaRegistryService<InMemoryWorkspaceStore, DefaultClock>,
    pub tasks: TaskService<InMemoryWorkspaceStore, DefaultClock>,
    pub projects: ProjectService<InMemoryWorkspaceStore, DefaultClock>,
    pub cascades: CascadeCoordinator<InMemoryWorkspaceStore, DefaultClock>,
}

/// Identifiers of the "Platform" team and its "Bug" task type.
#[derive(Debug, Clone, Copy)]
pub struct BugTracker {
    pub team: TeamId,
    pub bug: TaskTypeId,
}

/// Provides a freshly bootstrapped engine for each test.
#[fixture]
pub fn engine() -> Engine {
    let clock = Arc::new(DefaultClock);
    let store = Arc::new(
        InMemoryWorkspaceStore::bootstrap(&EngineConfig::default(), &*clock)
            .expect("default configuration is valid"),
    );
    Engine {
        directory: DirectoryService::new(Arc::clone(&store), Arc::clone(&clock)),
        registry: SchemaRegistryService::new(Arc::clone(&store), Arc::clone(&clock)),
        tasks: TaskService::new(Arc::clone(&store), Arc::clone(&clock)),
        projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
        cascades: CascadeCoordinator::new(Arc::clone(&store), clock),
        store,
    }
}

/// Builds a workflow from labels.
pub fn workflow(labels: &[&str]) -> Workflow {
    Workflow::new(labels.iter().copied()).expect("valid workflow")
}

/// A required select field `severity` with options `low` and `high`.
pub fn severity_schema() -> FieldSchema {
    FieldSchema::new(vec![
        FieldDefinition::new("severity", "Severity", FieldType::Select)
            .expect("valid field")
            .required()
            .with_options(["low", "high"]),
    ])
    .expect("valid schema")
}

impl Engine {
    /// Creates the "Platform" team with a "Bug" type whose workflow is
    /// `Backlog`, `In Progress`, `Done`.
    ///
    /// # Errors
    ///
    /// Returns an error if either creation fails.
    pub async fn bug_tracker(&self) -> eyre::Result<BugTracker> {
        let team = self
            .directory
            .create_team(TeamDefinition::new("Platform"))
            .await?;
        let bug = self
            .registry
            .create_task_type(
                team.id(),
                TypeDefinition::new("Bug", workflow(&["Backlog", "In Progress", "Done"])),
            )
            .await?;
        Ok(BugTracker {
            team: team.id(),
            bug: bug.id(),
        })
    }

    /// Creates a "Bug" task holding `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the task is rejected.
    pub async fn bug(&self, tracker: BugTracker, title: &str, status: &str) -> eyre::Result<Task> {
        let task = self
            .tasks
            .create_task(NewTask::new(title, tracker.team, tracker.bug).with_status(status))
            .await?;
        Ok(task)
    }
}

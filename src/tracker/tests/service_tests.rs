//! Service tests over the in-memory workspace store.

use super::fixtures::{severity, severity_schema, workflow};
use crate::config::EngineConfig;
use crate::graph::DependencyError;
use crate::schema::validation::ValidationError;
use crate::tracker::adapters::memory::InMemoryWorkspaceStore;
use crate::tracker::domain::{
    Disposal, EntityRef, NewProject, NewTask, SchemaOwner, StatusRemoval, Task, TaskFilter,
    TaskTypeId, TaskUpdate, TeamId, Theme, ThemeFilter, ThemeStatus,
};
use crate::tracker::error::EngineError;
use crate::tracker::services::{
    CascadeCoordinator, DirectoryService, ProjectService, SchemaRegistryService, TaskService,
    TeamDefinition, TypeDefinition,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

type Store = InMemoryWorkspaceStore;

struct Services {
    directory: DirectoryService<Store, DefaultClock>,
    registry: SchemaRegistryService<Store, DefaultClock>,
    tasks: TaskService<Store, DefaultClock>,
    projects: ProjectService<Store, DefaultClock>,
    cascades: CascadeCoordinator<Store, DefaultClock>,
}

#[fixture]
fn services() -> Services {
    let clock = Arc::new(DefaultClock);
    let store = Arc::new(
        InMemoryWorkspaceStore::bootstrap(&EngineConfig::default(), &*clock)
            .expect("default configuration"),
    );
    Services {
        directory: DirectoryService::new(Arc::clone(&store), Arc::clone(&clock)),
        registry: SchemaRegistryService::new(Arc::clone(&store), Arc::clone(&clock)),
        tasks: TaskService::new(Arc::clone(&store), Arc::clone(&clock)),
        projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
        cascades: CascadeCoordinator::new(store, clock),
    }
}

impl Services {
    async fn team_with_bug_type(&self) -> (TeamId, TaskTypeId) {
        let team = self
            .directory
            .create_team(TeamDefinition::new("Platform"))
            .await
            .expect("team should be created");
        let bug = self
            .registry
            .create_task_type(
                team.id(),
                TypeDefinition::new("Bug", workflow(&["Backlog", "In Progress", "Done"])),
            )
            .await
            .expect("task type should be created");
        (team.id(), bug.id())
    }

    async fn task(&self, team: TeamId, bug: TaskTypeId, title: &str, status: &str) -> Task {
        self.tasks
            .create_task(NewTask::new(title, team, bug).with_status(status))
            .await
            .expect("task should be created")
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_tasks_are_found_by_display_id(services: Services) {
    let (team, bug) = services.team_with_bug_type().await;
    let first = services.task(team, bug, "First", "Backlog").await;
    let second = services.task(team, bug, "Second", "Done").await;

    let found = services
        .tasks
        .find_by_display_id("CORE-2")
        .await
        .expect("task should be found");
    let missing = services.tasks.find_by_display_id("CORE-3").await;

    assert_eq!(first.display_id().to_string(), "CORE-1");
    assert_eq!(found.id(), second.id());
    assert!(matches!(missing, Err(EngineError::NotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_creation_issues_distinct_display_ids(services: Services) {
    let (team, bug) = services.team_with_bug_type().await;
    let service = Arc::new(services.tasks);

    let mut handles = Vec::new();
    for worker in 0..2 {
        let tasks = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let mut issued = Vec::new();
            for index in 0..50 {
                let title = format!("Task {worker}-{index}");
                let task = tasks
                    .create_task(NewTask::new(title, team, bug))
                    .await
                    .expect("task should be created");
                issued.push(task.display_id().sequence());
            }
            issued
        }));
    }
    let mut sequences = BTreeSet::new();
    for handle in handles {
        sequences.extend(handle.await.expect("worker should finish"));
    }

    assert_eq!(sequences, (1..=100).collect::<BTreeSet<u64>>());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_cycle_leaves_graph_unchanged(services: Services) {
    let (team, bug) = services.team_with_bug_type().await;
    let a = services.task(team, bug, "A", "Backlog").await;
    let b = services.task(team, bug, "B", "Backlog").await;
    let c = services.task(team, bug, "C", "Backlog").await;
    services
        .tasks
        .add_dependency(a.id(), b.id())
        .await
        .expect("edge should be added");
    services
        .tasks
        .add_dependency(b.id(), c.id())
        .await
        .expect("edge should be added");

    let result = services.tasks.add_dependency(c.id(), a.id()).await;

    assert!(matches!(
        result,
        Err(EngineError::Dependency(DependencyError::CycleDetected { .. }))
    ));
    let dependents = services
        .tasks
        .dependents(a.id())
        .await
        .expect("task exists");
    assert!(dependents.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_task_removes_its_edges(services: Services) {
    let (team, bug) = services.team_with_bug_type().await;
    let a = services.task(team, bug, "A", "Backlog").await;
    let b = services.task(team, bug, "B", "Backlog").await;
    services
        .tasks
        .add_dependency(a.id(), b.id())
        .await
        .expect("edge should be added");

    let removed = services
        .tasks
        .delete_task(b.id())
        .await
        .expect("task should be deleted");

    assert_eq!(removed, 1);
    let dependencies = services
        .tasks
        .dependencies(a.id())
        .await
        .expect("task exists");
    assert!(dependencies.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_cascade_is_not_committed(services: Services) {
    let (team, bug) = services.team_with_bug_type().await;
    let owner = SchemaOwner::TaskType(bug);
    let valid = services.task(team, bug, "Valid", "In Progress").await;
    let invalid = services.task(team, bug, "Invalid", "In Progress").await;
    services
        .registry
        .set_field_schema(owner, severity_schema())
        .await
        .expect("schema should be replaced");
    services
        .tasks
        .update_task(
            valid.id(),
            TaskUpdate::new().with_custom_data(severity("high")),
        )
        .await
        .expect("update should succeed");

    let result = services
        .cascades
        .remove_workflow_status(owner, "In Progress", Some("Done"))
        .await;

    assert!(matches!(
        result,
        Err(EngineError::Validation(ValidationError::MissingRequiredField(_)))
    ));
    let stored = services
        .tasks
        .find_task(invalid.id())
        .await
        .expect("task exists");
    assert_eq!(stored.status().as_str(), "In Progress");
    let current = services
        .registry
        .get_workflow(owner)
        .await
        .expect("type exists");
    assert_eq!(current.labels(), vec!["Backlog", "In Progress", "Done"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_removal_reports_blocked_until_reassigned(services: Services) {
    let (team, bug) = services.team_with_bug_type().await;
    let owner = SchemaOwner::TaskType(bug);
    services.task(team, bug, "One", "Done").await;
    services.task(team, bug, "Two", "Done").await;

    let check = services
        .registry
        .remove_status(owner, "Done")
        .await
        .expect("status exists");
    let blocked = services.registry.remove_unused_status(owner, "Done").await;
    let outcome = services
        .cascades
        .remove_workflow_status(owner, "Done", Some("In Progress"))
        .await
        .expect("cascade should succeed");

    assert_eq!(check, StatusRemoval::Blocked { count: 2 });
    assert!(matches!(blocked, Err(EngineError::Blocked { count: 2, .. })));
    assert_eq!(outcome.reassigned, 2);
    let stats = services.registry.type_stats(owner).await.expect("type exists");
    assert_eq!(stats.total, 2);
    assert_eq!(stats.workflow.labels(), vec!["Backlog", "In Progress"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_tasks_applies_filter(services: Services) {
    let (team, bug) = services.team_with_bug_type().await;
    services.task(team, bug, "Open", "Backlog").await;
    services.task(team, bug, "Closed", "Done").await;

    let done = services
        .tasks
        .list_tasks(TaskFilter::new().with_team(team).with_statuses(["Done"]))
        .await
        .expect("listing should succeed");

    assert_eq!(done.len(), 1);
    assert!(done.iter().all(|task| task.title() == "Closed"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_team_into_unassigned_keeps_tasks(services: Services) {
    let (team, bug) = services.team_with_bug_type().await;
    let task = services.task(team, bug, "Orphan", "In Progress").await;
    let unassigned = services
        .directory
        .unassigned_team()
        .await
        .expect("defaults exist");

    services
        .cascades
        .delete_team(team, Disposal::Reassign(unassigned.id()))
        .await
        .expect("cascade should succeed");

    let stored = services
        .tasks
        .find_task(task.id())
        .await
        .expect("task kept");
    assert_eq!(stored.team_id(), unassigned.id());
    assert!(matches!(
        services.directory.find_team(team).await,
        Err(EngineError::NotFound(EntityRef::Team(_)))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_theme_twice_reports_not_found(services: Services) {
    let theme = services
        .directory
        .create_theme("Reliability", None)
        .await
        .expect("theme should be created");
    let roadmap = services
        .registry
        .create_project_type(TypeDefinition::new(
            "Roadmap",
            workflow(&["Proposed", "Active"]),
        ))
        .await
        .expect("project type should be created");
    let project = services
        .projects
        .create_project(NewProject::new("Uptime", roadmap.id()).with_theme(theme.id()))
        .await
        .expect("project should be created");

    let first = services.cascades.delete_theme(theme.id()).await;
    let second = services.cascades.delete_theme(theme.id()).await;

    assert_eq!(first.expect("theme should be deleted"), 1);
    assert!(matches!(second, Err(EngineError::NotFound(_))));
    let stored = services
        .projects
        .find_project(project.id())
        .await
        .expect("project kept");
    assert_eq!(stored.theme_id(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn migrating_projects_moves_every_project(services: Services) {
    let from = services
        .registry
        .create_project_type(TypeDefinition::new("Initiative", workflow(&["Draft", "Live"])))
        .await
        .expect("project type should be created");
    let to = services
        .registry
        .create_project_type(TypeDefinition::new("Roadmap", workflow(&["Proposed", "Active"])))
        .await
        .expect("project type should be created");
    let project = services
        .projects
        .create_project(NewProject::new("Search", from.id()).with_status("Live"))
        .await
        .expect("project should be created");

    let migrated = services
        .cascades
        .migrate_projects(
            from.id(),
            to.id(),
            BTreeMap::from([("Live".to_owned(), "Active".to_owned())]),
        )
        .await
        .expect("migration should succeed");

    let stored = services
        .projects
        .find_project(project.id())
        .await
        .expect("project kept");
    assert_eq!(migrated, 1);
    assert_eq!(stored.project_type_id(), to.id());
    assert_eq!(stored.status().as_str(), "Active");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn archived_themes_are_listed_only_on_request(services: Services) {
    let kept = services
        .directory
        .create_theme("Growth", None)
        .await
        .expect("theme should be created");
    let retired = services
        .directory
        .create_theme("Legacy", Some("Old bets".to_owned()))
        .await
        .expect("theme should be created");
    services
        .directory
        .set_theme_status(retired.id(), ThemeStatus::Archived)
        .await
        .expect("theme should be archived");

    let visible = services
        .directory
        .list_themes(ThemeFilter::new())
        .await
        .expect("themes should be listed");
    let everything = services
        .directory
        .list_themes(ThemeFilter::new().including_archived())
        .await
        .expect("themes should be listed");

    assert_eq!(kept.status(), ThemeStatus::Active);
    let visible_ids: Vec<_> = visible.iter().map(Theme::id).collect();
    assert_eq!(visible_ids, vec![kept.id()]);
    let titles: Vec<&str> = everything.iter().map(Theme::title).collect();
    assert_eq!(titles, vec!["Growth", "Legacy"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn team_stats_follow_task_moves(services: Services) {
    let (team, bug) = services.team_with_bug_type().await;
    let task = services.task(team, bug, "Crash", "Backlog").await;
    services.task(team, bug, "Leak", "Done").await;

    let before = services
        .directory
        .team_stats(team)
        .await
        .expect("team should exist");
    services
        .tasks
        .update_task(task.id(), TaskUpdate::new().with_status("Done"))
        .await
        .expect("task should be updated");
    let after = services
        .directory
        .team_stats(team)
        .await
        .expect("team should exist");

    assert_eq!(before.total_tasks, 2);
    assert_eq!(before.task_type_count, 1);
    assert_eq!(before.by_status.len(), 2);
    assert_eq!(after.total_tasks, 2);
    assert_eq!(
        after.by_status.first().map(|entry| (entry.status.as_str(), entry.count)),
        Some(("Done", 2))
    );
}

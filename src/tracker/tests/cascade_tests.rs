//! Tests for multi-entity cascades on the catalog.

use super::fixtures::{Workspace, severity, severity_schema, workspace};
use crate::schema::validation::ValidationError;
use crate::tracker::domain::{
    Disposal, EntityRef, NewProject, NewTask, ProjectUpdate, Release, SchemaOwner, TaskUpdate,
    Theme,
};
use crate::tracker::error::{EngineError, InvalidTarget};
use rstest::rstest;
use std::collections::BTreeMap;

#[rstest]
fn removing_used_status_without_target_reports_count(mut workspace: Workspace) {
    for title in ["One", "Two", "Three"] {
        workspace.bug_task(title, "In Progress");
    }

    let result = workspace.catalog.remove_workflow_status(
        workspace.bug_owner(),
        "In Progress",
        None,
        &workspace.clock,
    );

    assert!(matches!(
        result,
        Err(EngineError::TargetRequired { count: 3, ref status }) if status == "In Progress"
    ));
}

#[rstest]
fn removing_status_reassigns_every_holder(mut workspace: Workspace) {
    let tasks: Vec<_> = ["One", "Two", "Three"]
        .into_iter()
        .map(|title| workspace.bug_task(title, "In Progress"))
        .collect();
    let untouched = workspace.bug_task("Four", "Done");
    let owner = workspace.bug_owner();

    let outcome = workspace
        .catalog
        .remove_workflow_status(owner, "In Progress", Some("Backlog"), &workspace.clock)
        .expect("cascade should succeed");

    assert_eq!(outcome.reassigned, 3);
    assert_eq!(outcome.workflow.labels(), vec!["Backlog", "Done"]);
    for task in &tasks {
        assert_eq!(workspace.task_status(task), "Backlog");
    }
    assert_eq!(workspace.task_status(&untouched), "Done");
    assert!(workspace.catalog.verify_integrity().is_ok());
}

#[rstest]
fn unused_status_needs_no_target(mut workspace: Workspace) {
    let owner = workspace.bug_owner();

    let outcome = workspace
        .catalog
        .remove_workflow_status(owner, "Done", None, &workspace.clock)
        .expect("unused status is removable");

    assert_eq!(outcome.target, None);
    assert_eq!(outcome.workflow.labels(), vec!["Backlog", "In Progress"]);
}

#[rstest]
#[case("In Progress", InvalidTarget::SameStatus { status: "In Progress".to_owned() })]
#[case("Closed", InvalidTarget::StatusNotInWorkflow { status: "Closed".to_owned() })]
fn invalid_status_targets_are_rejected(
    mut workspace: Workspace,
    #[case] target: &str,
    #[case] expected: InvalidTarget,
) {
    workspace.bug_task("One", "In Progress");
    let owner = workspace.bug_owner();

    let result =
        workspace
            .catalog
            .remove_workflow_status(owner, "In Progress", Some(target), &workspace.clock);

    assert!(matches!(result, Err(EngineError::InvalidTarget(ref found)) if *found == expected));
}

#[rstest]
fn failed_revalidation_leaves_status_removal_unapplied(mut workspace: Workspace) {
    let first = workspace.bug_task("Valid later", "In Progress");
    let second = workspace.bug_task("Invalid later", "In Progress");
    let owner = workspace.bug_owner();
    workspace
        .catalog
        .set_field_schema(owner, severity_schema(), &workspace.clock)
        .expect("schema should be replaced");
    workspace
        .catalog
        .update_task(
            first.id(),
            &TaskUpdate::new().with_custom_data(severity("low")),
            &workspace.clock,
        )
        .expect("update should succeed");

    let result = workspace.catalog.remove_workflow_status(
        owner,
        "In Progress",
        Some("Backlog"),
        &workspace.clock,
    );

    assert!(matches!(
        result,
        Err(EngineError::Validation(ValidationError::MissingRequiredField(_)))
    ));
    assert_eq!(workspace.task_status(&first), "In Progress");
    assert_eq!(workspace.task_status(&second), "In Progress");
    let workflow = workspace
        .catalog
        .schema(owner)
        .expect("type exists")
        .workflow();
    assert!(workflow.contains("In Progress"));
}

#[rstest]
fn project_status_removal_reassigns_projects(mut workspace: Workspace) {
    let roadmap = workspace.add_project_type("Roadmap", &["Proposed", "Active", "Shipped"]);
    let project = workspace
        .catalog
        .create_project(
            NewProject::new("Search", roadmap).with_status("Active"),
            &workspace.clock,
        )
        .expect("project should be created");

    workspace
        .catalog
        .remove_workflow_status(
            SchemaOwner::ProjectType(roadmap),
            "Active",
            Some("Shipped"),
            &workspace.clock,
        )
        .expect("cascade should succeed");

    let stored = workspace.catalog.project(project.id()).expect("project exists");
    assert_eq!(stored.status().as_str(), "Shipped");
}

#[rstest]
fn default_task_type_is_protected(mut workspace: Workspace) {
    let default_type = workspace.catalog.defaults().task_type_id();

    let result = workspace
        .catalog
        .delete_task_type(default_type, Disposal::Purge, &workspace.clock);

    assert!(matches!(
        result,
        Err(EngineError::ProtectedEntity(EntityRef::TaskType(id))) if id == default_type
    ));
}

#[rstest]
fn unassigned_team_is_protected(mut workspace: Workspace) {
    let unassigned = workspace.catalog.defaults().team_id();

    let result = workspace
        .catalog
        .delete_team(unassigned, Disposal::Purge, &workspace.clock);

    assert!(matches!(
        result,
        Err(EngineError::ProtectedEntity(EntityRef::Team(_)))
    ));
}

#[rstest]
fn reassigning_task_type_maps_status_and_keeps_edges(mut workspace: Workspace) {
    let team = workspace.team;
    let chore = workspace.add_task_type(team, "Chore", &["Todo", "Done"]);
    let done = workspace.bug_task("Done bug", "Done");
    let active = workspace.bug_task("Active bug", "In Progress");
    workspace
        .catalog
        .add_task_dependency(active.id(), done.id())
        .expect("edge should be added");

    let summary = workspace
        .catalog
        .delete_task_type(workspace.bug, Disposal::Reassign(chore), &workspace.clock)
        .expect("cascade should succeed");

    assert_eq!(summary.reassigned, 2);
    assert_eq!(workspace.task_status(&done), "Done");
    assert_eq!(workspace.task_status(&active), "Todo");
    assert!(workspace.catalog.task_type(workspace.bug).is_err());
    assert!(
        workspace
            .catalog
            .task_graph()
            .contains_edge(active.id(), done.id())
    );
    assert!(workspace.catalog.verify_integrity().is_ok());
}

#[rstest]
fn reassigning_task_type_to_other_team_is_rejected(mut workspace: Workspace) {
    let mobile = workspace.add_team("Mobile");
    let foreign = workspace.add_task_type(mobile, "Defect", &["Open"]);
    workspace.bug_task("Stays", "Backlog");

    let result =
        workspace
            .catalog
            .delete_task_type(workspace.bug, Disposal::Reassign(foreign), &workspace.clock);

    assert!(matches!(
        result,
        Err(EngineError::InvalidTarget(InvalidTarget::TeamMismatch { .. }))
    ));
    assert!(workspace.catalog.task_type(workspace.bug).is_ok());
}

#[rstest]
fn reassigning_task_type_to_itself_is_rejected(mut workspace: Workspace) {
    let bug = workspace.bug;

    let result = workspace
        .catalog
        .delete_task_type(bug, Disposal::Reassign(bug), &workspace.clock);

    assert!(matches!(
        result,
        Err(EngineError::InvalidTarget(InvalidTarget::SameEntity(_)))
    ));
}

#[rstest]
fn reassignment_revalidates_against_target_schema(mut workspace: Workspace) {
    let team = workspace.team;
    let strict = workspace.add_task_type(team, "Incident", &["Open"]);
    workspace
        .catalog
        .set_field_schema(SchemaOwner::TaskType(strict), severity_schema(), &workspace.clock)
        .expect("schema should be replaced");
    let task = workspace.bug_task("No severity", "Backlog");

    let result =
        workspace
            .catalog
            .delete_task_type(workspace.bug, Disposal::Reassign(strict), &workspace.clock);

    assert!(matches!(
        result,
        Err(EngineError::Validation(ValidationError::MissingRequiredField(_)))
    ));
    let stored = workspace.catalog.task(task.id()).expect("task untouched");
    assert_eq!(stored.task_type_id(), workspace.bug);
}

#[rstest]
fn purging_task_type_deletes_tasks_and_edges(mut workspace: Workspace) {
    let team = workspace.team;
    let chore = workspace.add_task_type(team, "Chore", &["Todo"]);
    let survivor = workspace
        .catalog
        .create_task(NewTask::new("Survivor", team, chore), &workspace.clock)
        .expect("task should be created");
    let doomed = workspace.bug_task("Doomed", "Backlog");
    workspace
        .catalog
        .add_task_dependency(survivor.id(), doomed.id())
        .expect("edge should be added");

    let summary = workspace
        .catalog
        .delete_task_type(workspace.bug, Disposal::Purge, &workspace.clock)
        .expect("cascade should succeed");

    assert_eq!(summary.purged, 1);
    assert_eq!(summary.edges_removed, 1);
    assert!(workspace.catalog.task(doomed.id()).is_err());
    assert!(workspace.catalog.task_graph().is_empty());
}

#[rstest]
fn reassigning_team_moves_and_merges_task_types(mut workspace: Workspace) {
    let source = workspace.team;
    let target = workspace.add_team("Mobile");
    let target_bug = workspace.add_task_type(target, "Bug", &["Open", "Done"]);
    let spike = workspace.add_task_type(source, "Spike", &["Idea"]);
    let bug_task = workspace.bug_task("Merged", "Done");
    let spike_task = workspace
        .catalog
        .create_task(NewTask::new("Moved", source, spike), &workspace.clock)
        .expect("task should be created");

    let summary = workspace
        .catalog
        .delete_team(source, Disposal::Reassign(target), &workspace.clock)
        .expect("cascade should succeed");

    let merged = workspace.catalog.task(bug_task.id()).expect("task kept");
    let moved = workspace.catalog.task(spike_task.id()).expect("task kept");
    assert_eq!(summary.reassigned, 2);
    assert_eq!(summary.types_moved, 1);
    assert_eq!(merged.task_type_id(), target_bug);
    assert_eq!(merged.status().as_str(), "Done");
    assert_eq!(moved.team_id(), target);
    assert_eq!(
        workspace.catalog.task_type(spike).expect("type moved").team_id(),
        target
    );
    assert!(workspace.catalog.team(source).is_err());
    assert!(workspace.catalog.verify_integrity().is_ok());
}

#[rstest]
fn purging_team_deletes_its_types_and_tasks(mut workspace: Workspace) {
    let team = workspace.team;
    let task = workspace.bug_task("Gone", "Backlog");

    let summary = workspace
        .catalog
        .delete_team(team, Disposal::Purge, &workspace.clock)
        .expect("cascade should succeed");

    assert_eq!(summary.purged, 1);
    assert!(workspace.catalog.task(task.id()).is_err());
    assert!(workspace.catalog.task_type(workspace.bug).is_err());
    assert!(workspace.catalog.team(team).is_err());
}

#[rstest]
fn deleting_theme_unlinks_projects_and_fails_the_second_time(mut workspace: Workspace) {
    let roadmap = workspace.add_project_type("Roadmap", &["Proposed"]);
    let theme = Theme::new("Growth", &workspace.clock).expect("valid theme");
    let theme_id = workspace.catalog.insert_theme(theme);
    let project = workspace
        .catalog
        .create_project(
            NewProject::new("Referrals", roadmap).with_theme(theme_id),
            &workspace.clock,
        )
        .expect("project should be created");

    let unlinked = workspace
        .catalog
        .delete_theme(theme_id, &workspace.clock)
        .expect("theme should be deleted");
    let second = workspace.catalog.delete_theme(theme_id, &workspace.clock);

    assert_eq!(unlinked, 1);
    assert_eq!(
        workspace
            .catalog
            .project(project.id())
            .expect("project kept")
            .theme_id(),
        None
    );
    assert!(matches!(
        second,
        Err(EngineError::NotFound(EntityRef::Theme(_)))
    ));
}

#[rstest]
fn deleting_project_relinks_tasks_without_touching_status(mut workspace: Workspace) {
    let roadmap = workspace.add_project_type("Roadmap", &["Proposed"]);
    let old = workspace
        .catalog
        .create_project(NewProject::new("Old", roadmap), &workspace.clock)
        .expect("project should be created");
    let new = workspace
        .catalog
        .create_project(NewProject::new("New", roadmap), &workspace.clock)
        .expect("project should be created");
    let request = NewTask::new("Linked", workspace.team, workspace.bug)
        .with_project(old.id())
        .with_status("Done");
    let task = workspace
        .catalog
        .create_task(request, &workspace.clock)
        .expect("task should be created");
    workspace
        .catalog
        .add_project_dependency(new.id(), old.id())
        .expect("edge should be added");

    let summary = workspace
        .catalog
        .delete_project(old.id(), Some(new.id()), &workspace.clock)
        .expect("cascade should succeed");

    let stored = workspace.catalog.task(task.id()).expect("task kept");
    assert_eq!(summary.reassigned, 1);
    assert_eq!(summary.edges_removed, 1);
    assert_eq!(stored.project_id(), Some(new.id()));
    assert_eq!(stored.status().as_str(), "Done");
}

#[rstest]
fn purging_project_type_unlinks_tasks(mut workspace: Workspace) {
    let roadmap = workspace.add_project_type("Roadmap", &["Proposed"]);
    let project = workspace
        .catalog
        .create_project(NewProject::new("Doomed", roadmap), &workspace.clock)
        .expect("project should be created");
    let request = NewTask::new("Linked", workspace.team, workspace.bug).with_project(project.id());
    let task = workspace
        .catalog
        .create_task(request, &workspace.clock)
        .expect("task should be created");

    let summary = workspace
        .catalog
        .delete_project_type(roadmap, Disposal::Purge, &workspace.clock)
        .expect("cascade should succeed");

    assert_eq!(summary.purged, 1);
    assert_eq!(summary.unlinked, 1);
    assert_eq!(
        workspace.catalog.task(task.id()).expect("task kept").project_id(),
        None
    );
    assert!(workspace.catalog.verify_integrity().is_ok());
}

#[rstest]
fn deleting_release_unlinks_tasks(mut workspace: Workspace) {
    let release = Release::new("2.0.0", "Second", &workspace.clock).expect("valid release");
    let release_id = workspace
        .catalog
        .insert_release(release)
        .expect("release should be inserted");
    let request = NewTask::new("Shipping", workspace.team, workspace.bug).with_release(release_id);
    let task = workspace
        .catalog
        .create_task(request, &workspace.clock)
        .expect("task should be created");

    let unlinked = workspace
        .catalog
        .delete_release(release_id, &workspace.clock)
        .expect("release should be deleted");

    assert_eq!(unlinked, 1);
    assert_eq!(
        workspace.catalog.task(task.id()).expect("task kept").release_id(),
        None
    );
}

#[rstest]
fn migrating_projects_maps_statuses_with_initial_fallback(mut workspace: Workspace) {
    let from = workspace.add_project_type("Initiative", &["Draft", "Running", "Closed"]);
    let to = workspace.add_project_type("Roadmap", &["Proposed", "Active", "Shipped"]);
    let running = workspace
        .catalog
        .create_project(
            NewProject::new("Running", from).with_status("Running"),
            &workspace.clock,
        )
        .expect("project should be created");
    let closed = workspace
        .catalog
        .create_project(
            NewProject::new("Closed", from).with_status("Closed"),
            &workspace.clock,
        )
        .expect("project should be created");
    let status_map = BTreeMap::from([("Running".to_owned(), "Active".to_owned())]);

    let migrated = workspace
        .catalog
        .migrate_projects(from, to, &status_map, &workspace.clock)
        .expect("migration should succeed");

    let status_of = |id| {
        workspace
            .catalog
            .project(id)
            .expect("project kept")
            .status()
            .as_str()
            .to_owned()
    };
    assert_eq!(migrated, 2);
    assert_eq!(status_of(running.id()), "Active");
    assert_eq!(status_of(closed.id()), "Proposed");
}

#[rstest]
fn migrating_to_unknown_status_is_rejected(mut workspace: Workspace) {
    let from = workspace.add_project_type("Initiative", &["Draft"]);
    let to = workspace.add_project_type("Roadmap", &["Proposed"]);
    let status_map = BTreeMap::from([("Draft".to_owned(), "Active".to_owned())]);

    let result = workspace
        .catalog
        .migrate_projects(from, to, &status_map, &workspace.clock);
    let same = workspace
        .catalog
        .migrate_projects(from, from, &BTreeMap::new(), &workspace.clock);

    assert!(matches!(
        result,
        Err(EngineError::InvalidTarget(InvalidTarget::StatusNotInWorkflow { .. }))
    ));
    assert!(matches!(
        same,
        Err(EngineError::InvalidTarget(InvalidTarget::SameEntity(_)))
    ));
}

#[rstest]
fn project_updates_are_validated(mut workspace: Workspace) {
    let roadmap = workspace.add_project_type("Roadmap", &["Proposed", "Active"]);
    let project = workspace
        .catalog
        .create_project(NewProject::new("Search", roadmap), &workspace.clock)
        .expect("project should be created");

    let rejected = workspace.catalog.update_project(
        project.id(),
        &ProjectUpdate::new().with_status("Closed"),
        &workspace.clock,
    );
    let accepted = workspace
        .catalog
        .update_project(
            project.id(),
            &ProjectUpdate::new().with_status("Active"),
            &workspace.clock,
        )
        .expect("update should succeed");

    assert!(matches!(rejected, Err(EngineError::Validation(_))));
    assert_eq!(accepted.status().as_str(), "Active");
}

//! Team, type, project and release cascades through the services.

use crate::in_memory::helpers::{Engine, engine, workflow};
use corepm::tracker::{
    domain::{Disposal, EntityRef, NewProject, NewTask, ProjectFilter, TaskFilter},
    error::{EngineError, InvalidTarget},
    services::{TeamDefinition, TypeDefinition},
};
use rstest::rstest;
use std::collections::BTreeMap;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn protected_defaults_cannot_be_deleted(engine: Engine) -> eyre::Result<()> {
    let unassigned = engine.directory.unassigned_team().await?;
    let default_types = engine.registry.list_task_types(unassigned.id()).await?;
    let default_type = default_types
        .first()
        .ok_or_else(|| eyre::eyre!("unassigned team has no task type"))?;

    let team = engine
        .cascades
        .delete_team(unassigned.id(), Disposal::Purge)
        .await;
    let task_type = engine
        .cascades
        .delete_task_type(default_type.id(), Disposal::Purge)
        .await;

    eyre::ensure!(
        matches!(team, Err(EngineError::ProtectedEntity(EntityRef::Team(_)))),
        "expected protected team, got {team:?}"
    );
    eyre::ensure!(
        matches!(
            task_type,
            Err(EngineError::ProtectedEntity(EntityRef::TaskType(_)))
        ),
        "expected protected task type, got {task_type:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn team_deletion_merges_matching_types(engine: Engine) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    let mobile = engine
        .directory
        .create_team(TeamDefinition::new("Mobile"))
        .await?;
    let mobile_bug = engine
        .registry
        .create_task_type(
            mobile.id(),
            TypeDefinition::new("Bug", workflow(&["Triage", "Done"])),
        )
        .await?;
    let done = engine.bug(tracker, "Done already", "Done").await?;
    let active = engine.bug(tracker, "Half way", "In Progress").await?;

    let summary = engine
        .cascades
        .delete_team(tracker.team, Disposal::Reassign(mobile.id()))
        .await?;

    assert_eq!(summary.reassigned, 2);
    assert_eq!(summary.types_moved, 0);
    let moved = engine
        .tasks
        .list_tasks(TaskFilter::new().with_task_type(mobile_bug.id()))
        .await?;
    let statuses: Vec<(String, String)> = moved
        .iter()
        .map(|task| (task.title().to_owned(), task.status().as_str().to_owned()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            (done.title().to_owned(), "Done".to_owned()),
            (active.title().to_owned(), "Triage".to_owned()),
        ]
    );
    assert_eq!(engine.directory.list_teams().await?.len(), 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_type_reassignment_across_teams_is_rejected(engine: Engine) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    let unassigned = engine.directory.unassigned_team().await?;
    let foreign = engine
        .registry
        .list_task_types(unassigned.id())
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| eyre::eyre!("unassigned team has no task type"))?;
    let task = engine.bug(tracker, "Stays put", "Backlog").await?;

    let result = engine
        .cascades
        .delete_task_type(tracker.bug, Disposal::Reassign(foreign.id()))
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(EngineError::InvalidTarget(InvalidTarget::TeamMismatch { .. }))
        ),
        "expected TeamMismatch, got {result:?}"
    );
    let stored = engine.tasks.find_task(task.id()).await?;
    assert_eq!(stored.task_type_id(), tracker.bug);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn theme_deletion_unlinks_every_project(engine: Engine) -> eyre::Result<()> {
    let roadmap = engine
        .registry
        .create_project_type(TypeDefinition::new("Roadmap", workflow(&["Proposed"])))
        .await?;
    let theme = engine.directory.create_theme("Growth", None).await?;
    for title in ["Referrals", "Onboarding"] {
        engine
            .projects
            .create_project(NewProject::new(title, roadmap.id()).with_theme(theme.id()))
            .await?;
    }

    let unlinked = engine.cascades.delete_theme(theme.id()).await?;
    let repeated = engine.cascades.delete_theme(theme.id()).await;

    assert_eq!(unlinked, 2);
    let themed = engine
        .projects
        .list_projects(ProjectFilter::new().with_theme(theme.id()))
        .await?;
    assert!(themed.is_empty());
    eyre::ensure!(
        matches!(repeated, Err(EngineError::NotFound(EntityRef::Theme(_)))),
        "expected NotFound, got {repeated:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_deletion_relinks_tasks(engine: Engine) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    let roadmap = engine
        .registry
        .create_project_type(TypeDefinition::new("Roadmap", workflow(&["Proposed"])))
        .await?;
    let old = engine
        .projects
        .create_project(NewProject::new("Legacy", roadmap.id()))
        .await?;
    let new = engine
        .projects
        .create_project(NewProject::new("Replacement", roadmap.id()))
        .await?;
    let task = engine
        .tasks
        .create_task(
            NewTask::new("Port module", tracker.team, tracker.bug)
                .with_project(old.id())
                .with_status("In Progress"),
        )
        .await?;

    let summary = engine
        .cascades
        .delete_project(old.id(), Some(new.id()))
        .await?;

    assert_eq!(summary.reassigned, 1);
    let stored = engine.tasks.find_task(task.id()).await?;
    assert_eq!(stored.project_id(), Some(new.id()));
    assert_eq!(stored.status().as_str(), "In Progress");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_type_reassignment_carries_status_over(engine: Engine) -> eyre::Result<()> {
    let initiative = engine
        .registry
        .create_project_type(TypeDefinition::new(
            "Initiative",
            workflow(&["Draft", "Active"]),
        ))
        .await?;
    let roadmap = engine
        .registry
        .create_project_type(TypeDefinition::new(
            "Roadmap",
            workflow(&["Proposed", "Active"]),
        ))
        .await?;
    let active = engine
        .projects
        .create_project(NewProject::new("Live", initiative.id()).with_status("Active"))
        .await?;
    let draft = engine
        .projects
        .create_project(NewProject::new("Idea", initiative.id()))
        .await?;

    let summary = engine
        .cascades
        .delete_project_type(initiative.id(), Disposal::Reassign(roadmap.id()))
        .await?;

    assert_eq!(summary.reassigned, 2);
    let kept = engine.projects.find_project(active.id()).await?;
    let reset = engine.projects.find_project(draft.id()).await?;
    assert_eq!(kept.status().as_str(), "Active");
    assert_eq!(reset.status().as_str(), "Proposed");
    assert_eq!(engine.registry.list_project_types().await?.len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn migration_rejects_unknown_target_status(engine: Engine) -> eyre::Result<()> {
    let from = engine
        .registry
        .create_project_type(TypeDefinition::new("Initiative", workflow(&["Draft"])))
        .await?;
    let to = engine
        .registry
        .create_project_type(TypeDefinition::new("Roadmap", workflow(&["Proposed"])))
        .await?;
    let project = engine
        .projects
        .create_project(NewProject::new("Pending", from.id()))
        .await?;

    let result = engine
        .cascades
        .migrate_projects(
            from.id(),
            to.id(),
            BTreeMap::from([("Draft".to_owned(), "Shipped".to_owned())]),
        )
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(EngineError::InvalidTarget(InvalidTarget::StatusNotInWorkflow { .. }))
        ),
        "expected StatusNotInWorkflow, got {result:?}"
    );
    let stored = engine.projects.find_project(project.id()).await?;
    assert_eq!(stored.project_type_id(), from.id());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn release_deletion_unlinks_tasks(engine: Engine) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    let release = engine
        .directory
        .create_release("1.4.0", "Spring", None)
        .await?;
    let task = engine
        .tasks
        .create_task(NewTask::new("Ship it", tracker.team, tracker.bug).with_release(release.id()))
        .await?;

    let unlinked = engine.cascades.delete_release(release.id()).await?;

    assert_eq!(unlinked, 1);
    assert_eq!(engine.tasks.find_task(task.id()).await?.release_id(), None);
    assert!(engine.directory.list_releases().await?.is_empty());
    Ok(())
}

//! End-to-end scenarios for workflows, custom fields and dependencies.

use crate::in_memory::helpers::{Engine, engine, severity_schema, workflow};
use corepm::graph::DependencyError;
use corepm::schema::{domain::CustomData, validation::ValidationError};
use corepm::tracker::{
    domain::{NewTask, SchemaOwner, TaskUpdate},
    error::EngineError,
    services::TypeDefinition,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_outside_the_workflow_is_rejected(engine: Engine) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    let task = engine.bug(tracker, "Login fails", "Backlog").await?;

    let result = engine
        .tasks
        .update_task(task.id(), TaskUpdate::new().with_status("Closed"))
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(EngineError::Validation(ValidationError::InvalidStatus { .. }))
        ),
        "expected InvalidStatus, got {result:?}"
    );
    let stored = engine.tasks.find_task(task.id()).await?;
    assert_eq!(stored.status().as_str(), "Backlog");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removing_a_used_status_requires_and_applies_a_target(
    engine: Engine,
) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    let owner = SchemaOwner::TaskType(tracker.bug);
    let mut held = Vec::new();
    for title in ["Parser", "Lexer", "Codegen"] {
        held.push(engine.bug(tracker, title, "In Progress").await?);
    }

    let refused = engine
        .cascades
        .remove_workflow_status(owner, "In Progress", None)
        .await;
    eyre::ensure!(
        matches!(refused, Err(EngineError::TargetRequired { count: 3, .. })),
        "expected TargetRequired(3), got {refused:?}"
    );

    let outcome = engine
        .cascades
        .remove_workflow_status(owner, "In Progress", Some("Backlog"))
        .await?;

    assert_eq!(outcome.reassigned, 3);
    assert_eq!(outcome.workflow.labels(), vec!["Backlog", "Done"]);
    for task in held {
        let stored = engine.tasks.find_task(task.id()).await?;
        assert_eq!(stored.status().as_str(), "Backlog");
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cycles_are_refused_and_deleted_tasks_leave_no_edges(engine: Engine) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    let a = engine.bug(tracker, "A", "Backlog").await?;
    let b = engine.bug(tracker, "B", "Backlog").await?;
    engine.tasks.add_dependency(a.id(), b.id()).await?;

    let cycle = engine.tasks.add_dependency(b.id(), a.id()).await;
    eyre::ensure!(
        matches!(
            cycle,
            Err(EngineError::Dependency(DependencyError::CycleDetected { .. }))
        ),
        "expected CycleDetected, got {cycle:?}"
    );
    assert_eq!(engine.tasks.dependencies(a.id()).await?.len(), 1);

    engine.tasks.delete_task(b.id()).await?;

    assert!(engine.tasks.dependencies(a.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn required_select_field_is_enforced_on_create(engine: Engine) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    engine
        .registry
        .set_field_schema(SchemaOwner::TaskType(tracker.bug), severity_schema())
        .await?;
    let request = |custom_data: CustomData| {
        NewTask::new("Crash", tracker.team, tracker.bug).with_custom_data(custom_data)
    };

    let missing = engine.tasks.create_task(request(CustomData::new())).await;
    let invalid = engine
        .tasks
        .create_task(request(CustomData::new().with("severity", "medium")))
        .await;
    let valid = engine
        .tasks
        .create_task(request(CustomData::new().with("severity", "high")))
        .await?;

    eyre::ensure!(
        matches!(
            missing,
            Err(EngineError::Validation(ValidationError::MissingRequiredField(ref key)))
                if key == "severity"
        ),
        "expected MissingRequiredField, got {missing:?}"
    );
    eyre::ensure!(
        matches!(
            invalid,
            Err(EngineError::Validation(ValidationError::InvalidOption { ref key, .. }))
                if key == "severity"
        ),
        "expected InvalidOption, got {invalid:?}"
    );
    assert_eq!(valid.display_id().to_string(), "CORE-1");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_reassignment_mutates_nothing(engine: Engine) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    let owner = SchemaOwner::TaskType(tracker.bug);
    let compliant = engine.bug(tracker, "Has severity", "In Progress").await?;
    let legacy = engine.bug(tracker, "Predates the field", "In Progress").await?;
    engine
        .registry
        .set_field_schema(owner, severity_schema())
        .await?;
    engine
        .tasks
        .update_task(
            compliant.id(),
            TaskUpdate::new().with_custom_data(CustomData::new().with("severity", "low")),
        )
        .await?;

    let result = engine
        .cascades
        .remove_workflow_status(owner, "In Progress", Some("Backlog"))
        .await;

    eyre::ensure!(result.is_err(), "cascade should fail on the legacy task");
    for id in [compliant.id(), legacy.id()] {
        let stored = engine.tasks.find_task(id).await?;
        assert_eq!(stored.status().as_str(), "In Progress");
    }
    let current = engine.registry.get_workflow(owner).await?;
    assert!(current.contains("In Progress"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn retyped_task_keeps_shared_status(engine: Engine) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    let story = engine
        .registry
        .create_task_type(
            tracker.team,
            TypeDefinition::new("Story", workflow(&["Todo", "Done"])),
        )
        .await?;
    let done = engine.bug(tracker, "Shipped", "Done").await?;
    let active = engine.bug(tracker, "Ongoing", "In Progress").await?;

    let kept = engine
        .tasks
        .update_task(done.id(), TaskUpdate::new().with_task_type(story.id()))
        .await?;
    let reset = engine
        .tasks
        .update_task(active.id(), TaskUpdate::new().with_task_type(story.id()))
        .await?;

    assert_eq!(kept.status().as_str(), "Done");
    assert_eq!(reset.status().as_str(), "Todo");
    assert_eq!(kept.display_id(), done.display_id());
    Ok(())
}

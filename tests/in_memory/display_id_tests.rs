//! Concurrent display identifier allocation.

use crate::in_memory::helpers::{Engine, engine};
use corepm::display_id::{
    adapters::memory::InMemoryDisplayIdAllocator,
    domain::IdPrefix,
    ports::DisplayIdAllocator,
};
use corepm::tracker::domain::NewTask;
use rstest::rstest;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Runs two callers that each allocate fifty identifiers for `ORBIT` and
/// returns every rendered identifier.
async fn allocate_from_two_callers<A>(allocator: Arc<A>) -> eyre::Result<BTreeSet<String>>
where
    A: DisplayIdAllocator + 'static,
{
    let prefix = IdPrefix::new("ORBIT")?;
    let mut handles = Vec::new();
    for _ in 0..2 {
        let caller = Arc::clone(&allocator);
        let caller_prefix = prefix.clone();
        handles.push(tokio::spawn(async move {
            let mut issued = Vec::new();
            for _ in 0..50 {
                issued.push(caller.allocate(&caller_prefix).await?.to_string());
            }
            Ok::<_, eyre::Report>(issued)
        }));
    }

    let mut all = BTreeSet::new();
    for handle in handles {
        all.extend(handle.await??);
    }
    Ok(all)
}

fn orbit_one_to_hundred() -> BTreeSet<String> {
    (1..=100).map(|sequence| format!("ORBIT-{sequence}")).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn standalone_allocator_issues_gapless_unique_ids() -> eyre::Result<()> {
    let allocator = Arc::new(InMemoryDisplayIdAllocator::new());

    let issued = allocate_from_two_callers(Arc::clone(&allocator)).await?;

    assert_eq!(issued, orbit_one_to_hundred());
    let prefix = IdPrefix::new("ORBIT")?;
    assert_eq!(allocator.last_issued(&prefix).await?, 100);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn workspace_store_issues_gapless_unique_ids(engine: Engine) -> eyre::Result<()> {
    let issued = allocate_from_two_callers(Arc::clone(&engine.store)).await?;

    assert_eq!(issued, orbit_one_to_hundred());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_tasks_do_not_release_their_numbers(engine: Engine) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    let first = engine.bug(tracker, "First", "Backlog").await?;
    engine.tasks.delete_task(first.id()).await?;

    let second = engine.bug(tracker, "Second", "Backlog").await?;

    assert_eq!(second.display_id().to_string(), "CORE-2");
    let prefix = IdPrefix::new("CORE")?;
    assert_eq!(engine.store.last_issued(&prefix).await?, 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_allocation_and_task_creation_share_one_sequence(
    engine: Engine,
) -> eyre::Result<()> {
    let tracker = engine.bug_tracker().await?;
    let prefix = IdPrefix::new("CORE")?;
    let reserved = engine.store.allocate(&prefix).await?;

    let rejected = engine
        .tasks
        .create_task(NewTask::new("  ", tracker.team, tracker.bug))
        .await;
    let task = engine.bug(tracker, "After reservation", "Backlog").await?;

    eyre::ensure!(rejected.is_err(), "blank title must be rejected");
    assert_eq!(reserved.to_string(), "CORE-1");
    assert_eq!(task.display_id().to_string(), "CORE-2");
    assert_eq!(engine.store.last_issued(&prefix).await?, 2);
    Ok(())
}

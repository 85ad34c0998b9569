//! Caller-bracketed compound actions commit or roll back as one unit.

use crate::sqlite::helpers::{create_queue, seed_task, store_ctx, StoreContext};
use foreman::domain::{DomainError, NewTask, QueueName};
use foreman::store::StoreError;
use rstest::rstest;

fn pending_titles(store: &foreman::store::TaskStore, queue: &QueueName) -> Vec<String> {
    store
        .list_tasks(queue, None, None)
        .expect("list")
        .into_iter()
        .map(|task| task.title)
        .collect()
}

#[rstest]
fn an_error_rolls_back_every_write_in_the_bracket(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");

    let result: Result<(), StoreError> = store_ctx.store.transaction(|tx| {
        tx.add_task(&NewTask::new(queue.clone(), "one").expect("valid task"))?;
        tx.add_task(&NewTask::new(queue.clone(), "two").expect("valid task"))?;
        Err(StoreError::Validation(DomainError::EmptyTitle))
    });

    assert!(result.is_err());
    assert!(
        pending_titles(&store_ctx.store, &queue).is_empty(),
        "both inserts must have rolled back"
    );
}

#[rstest]
fn a_successful_bracket_commits_every_write(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");

    let created = store_ctx
        .store
        .transaction(|tx| {
            let first = tx.add_task(&NewTask::new(queue.clone(), "one").expect("valid task"))?;
            let second = tx.add_task(&NewTask::new(queue.clone(), "two").expect("valid task"))?;
            Ok((first, second))
        })
        .expect("transaction commits");

    assert_eq!(
        pending_titles(&store_ctx.store, &queue),
        ["one", "two"],
        "both inserts must be visible after commit"
    );
    assert!(created.1.id > created.0.id);
}

#[rstest]
fn writes_are_visible_inside_the_open_bracket(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");

    store_ctx
        .store
        .transaction(|tx| {
            let task = tx.add_task(&NewTask::new(queue.clone(), "one").expect("valid task"))?;
            let seen = tx.get_task(task.id)?.expect("visible in scope");
            assert_eq!(seen.title, "one");

            let stats = tx.get_queue_stats(&queue)?;
            assert_eq!(stats.pending, 1);
            Ok(())
        })
        .expect("transaction commits");
}

#[rstest]
fn a_failed_compound_action_leaves_prior_state_intact(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    let existing = seed_task(&store_ctx.store, &queue, "keep", 5);

    let result = store_ctx.store.transaction(|tx| {
        tx.delete_task(existing.id)?;
        tx.add_task(&NewTask::new(queue.clone(), "replacement").expect("valid task"))?;
        Err::<(), _>(StoreError::Validation(DomainError::EmptyTitle))
    });

    assert!(result.is_err());
    assert_eq!(pending_titles(&store_ctx.store, &queue), ["keep"]);
}

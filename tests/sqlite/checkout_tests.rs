//! Priority-ordered dispatch and direct-id checkout.

use crate::sqlite::helpers::{create_queue, queue_name, seed_task, store_ctx, StoreContext};
use foreman::domain::{CheckoutTarget, TaskId, TaskStatus};
use foreman::store::{ErrorKind, StoreError};
use rstest::rstest;

#[rstest]
fn queue_checkout_follows_priority_order(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    for (title, priority) in [("p3", 3), ("p9", 9), ("p5", 5), ("p7", 7)] {
        seed_task(&store_ctx.store, &queue, title, priority);
    }

    let target = CheckoutTarget::Queue(queue);
    let mut titles = Vec::new();
    for _ in 0..4 {
        let task = store_ctx
            .store
            .checkout_task(&target, Some("w1"))
            .expect("checkout")
            .expect("task available");
        titles.push(task.title);
    }
    assert_eq!(titles, ["p9", "p7", "p5", "p3"]);

    let drained = store_ctx
        .store
        .checkout_task(&target, Some("w1"))
        .expect("checkout");
    assert!(drained.is_none(), "drained queue should yield no task");
}

#[rstest]
fn equal_priorities_dispatch_in_insertion_order(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    for title in ["first", "second", "third"] {
        seed_task(&store_ctx.store, &queue, title, 5);
    }

    let target = CheckoutTarget::Queue(queue);
    let mut titles = Vec::new();
    for _ in 0..3 {
        let task = store_ctx
            .store
            .checkout_task(&target, None)
            .expect("checkout")
            .expect("task available");
        titles.push(task.title);
    }
    assert_eq!(titles, ["first", "second", "third"]);
}

#[rstest]
fn queue_checkout_stamps_worker_and_time(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    seed_task(&store_ctx.store, &queue, "a", 5);

    let task = store_ctx
        .store
        .checkout_task(&CheckoutTarget::Queue(queue), Some("w7"))
        .expect("checkout")
        .expect("task available");

    assert_eq!(task.status, TaskStatus::CheckedOut);
    assert_eq!(task.worker_id.as_deref(), Some("w7"));
    assert!(task.checked_out_at.is_some());
    assert!(task.completed_at.is_none());
}

#[rstest]
fn checkout_on_empty_queue_is_a_normal_outcome(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "idle");

    let result = store_ctx
        .store
        .checkout_task(&CheckoutTarget::Queue(queue), Some("w1"))
        .expect("checkout should not fail");
    assert!(result.is_none());
}

#[rstest]
fn checkout_from_missing_queue_is_not_found(store_ctx: StoreContext) {
    let err = store_ctx
        .store
        .checkout_task(&CheckoutTarget::Queue(queue_name("missing")), Some("w1"))
        .expect_err("should fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[rstest]
fn direct_checkout_claims_a_pending_task(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    let task = seed_task(&store_ctx.store, &queue, "a", 5);

    let claimed = store_ctx
        .store
        .checkout_task(&CheckoutTarget::Task(task.id), Some("w1"))
        .expect("checkout")
        .expect("direct checkout returns the task");
    assert_eq!(claimed.id, task.id);
    assert_eq!(claimed.worker_id.as_deref(), Some("w1"));
}

#[rstest]
fn direct_checkout_of_missing_task_is_not_found(store_ctx: StoreContext) {
    let id = TaskId::new(999).expect("positive id");
    let err = store_ctx
        .store
        .checkout_task(&CheckoutTarget::Task(id), Some("w1"))
        .expect_err("should fail");
    assert!(matches!(err, StoreError::TaskNotFound(_)));
}

#[rstest]
fn direct_checkout_of_claimed_task_is_a_checkout_failure(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    let task = seed_task(&store_ctx.store, &queue, "a", 5);
    store_ctx
        .store
        .checkout_task(&CheckoutTarget::Task(task.id), Some("w1"))
        .expect("first checkout");

    let err = store_ctx
        .store
        .checkout_task(&CheckoutTarget::Task(task.id), Some("w2"))
        .expect_err("second checkout should fail");
    assert!(matches!(
        err,
        StoreError::TaskUnavailable {
            status: TaskStatus::CheckedOut,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Checkout);
}

#[rstest]
fn checkout_after_completion_is_a_checkout_failure(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    let task = seed_task(&store_ctx.store, &queue, "a", 5);
    store_ctx
        .store
        .checkout_task(&CheckoutTarget::Task(task.id), Some("w1"))
        .expect("checkout");
    store_ctx.store.complete_task(task.id).expect("complete");

    let err = store_ctx
        .store
        .checkout_task(&CheckoutTarget::Task(task.id), Some("w2"))
        .expect_err("completed task cannot be checked out");
    assert_eq!(err.kind(), ErrorKind::Checkout);
}

#[rstest]
fn checkout_ignores_tasks_in_other_queues(store_ctx: StoreContext) {
    let busy = create_queue(&store_ctx.store, "busy");
    let idle = create_queue(&store_ctx.store, "idle");
    seed_task(&store_ctx.store, &busy, "a", 9);

    let result = store_ctx
        .store
        .checkout_task(&CheckoutTarget::Queue(idle), Some("w1"))
        .expect("checkout");
    assert!(result.is_none());
}

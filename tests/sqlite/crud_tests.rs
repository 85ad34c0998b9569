//! CRUD round trips for queues and tasks.

use crate::sqlite::helpers::{create_queue, queue_name, seed_task, store_ctx, StoreContext};
use foreman::domain::{NewQueue, NewTask, Priority, TaskStatus};
use foreman::store::{ErrorKind, StoreError};
use rstest::rstest;
use serde_json::json;

#[rstest]
fn created_queue_round_trips_all_fields(store_ctx: StoreContext) {
    let name = queue_name("docs-rewrite");
    let request = NewQueue::new(name.clone())
        .with_description("rewrite the docs")
        .with_instructions("one page per task");

    let created = store_ctx.store.create_queue(&request).expect("create");
    assert_eq!(created.name, name);
    assert_eq!(created.description.as_deref(), Some("rewrite the docs"));
    assert_eq!(created.instructions.as_deref(), Some("one page per task"));

    let fetched = store_ctx
        .store
        .get_queue(&name)
        .expect("lookup")
        .expect("queue exists");
    assert_eq!(fetched, created);
}

#[rstest]
fn duplicate_queue_name_is_a_conflict(store_ctx: StoreContext) {
    let name = create_queue(&store_ctx.store, "q1");

    let err = store_ctx
        .store
        .create_queue(&NewQueue::new(name))
        .expect_err("second create should fail");
    assert!(matches!(err, StoreError::QueueExists(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[rstest]
fn get_queue_returns_none_for_missing(store_ctx: StoreContext) {
    let found = store_ctx
        .store
        .get_queue(&queue_name("missing"))
        .expect("lookup");
    assert!(found.is_none());
}

#[rstest]
fn queues_list_in_ascending_name_order(store_ctx: StoreContext) {
    for name in ["zeta", "alpha", "midway"] {
        create_queue(&store_ctx.store, name);
    }

    let names: Vec<_> = store_ctx
        .store
        .list_queues()
        .expect("list")
        .into_iter()
        .map(|queue| queue.name.as_str().to_owned())
        .collect();
    assert_eq!(names, ["alpha", "midway", "zeta"]);
}

#[rstest]
fn added_task_round_trips_with_defaults(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    let request = NewTask::new(queue.clone(), "resize images").expect("valid task");

    let added = store_ctx.store.add_task(&request).expect("add");
    assert_eq!(added.queue, queue);
    assert_eq!(added.title, "resize images");
    assert_eq!(added.status, TaskStatus::Pending);
    assert_eq!(added.priority, Priority::DEFAULT);
    assert!(added.worker_id.is_none());
    assert!(added.checked_out_at.is_none());
    assert!(added.completed_at.is_none());

    let fetched = store_ctx
        .store
        .get_task(added.id)
        .expect("lookup")
        .expect("task exists");
    assert_eq!(fetched, added);
}

#[rstest]
fn task_parameters_round_trip_nested_documents(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    let parameters = json!({
        "source": {"bucket": "raw", "keys": ["a.png", "b.png"]},
        "sizes": [64, 256, 1024],
        "lossless": true,
    });

    let request = NewTask::new(queue, "resize images")
        .expect("valid task")
        .with_parameters(parameters.clone())
        .expect("object parameters");
    let added = store_ctx.store.add_task(&request).expect("add");

    let fetched = store_ctx
        .store
        .get_task(added.id)
        .expect("lookup")
        .expect("task exists");
    assert_eq!(fetched.parameters, Some(parameters));
}

#[rstest]
fn adding_to_a_missing_queue_is_not_found(store_ctx: StoreContext) {
    let request = NewTask::new(queue_name("missing"), "orphan").expect("valid task");

    let err = store_ctx.store.add_task(&request).expect_err("should fail");
    assert!(matches!(err, StoreError::QueueNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[rstest]
fn task_ids_are_unique_across_queues(store_ctx: StoreContext) {
    let q1 = create_queue(&store_ctx.store, "q1");
    let q2 = create_queue(&store_ctx.store, "q2");

    let first = seed_task(&store_ctx.store, &q1, "a", 5);
    let second = seed_task(&store_ctx.store, &q2, "b", 5);
    assert!(second.id > first.id);
}

#[rstest]
fn deleting_a_queue_cascades_to_its_tasks(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q2");
    let t1 = seed_task(&store_ctx.store, &queue, "one", 5);
    let t2 = seed_task(&store_ctx.store, &queue, "two", 5);

    store_ctx.store.delete_queue(&queue).expect("delete");

    assert!(store_ctx.store.get_queue(&queue).expect("lookup").is_none());
    assert!(store_ctx.store.get_task(t1.id).expect("lookup").is_none());
    assert!(store_ctx.store.get_task(t2.id).expect("lookup").is_none());
}

#[rstest]
fn deleting_a_missing_queue_is_not_found(store_ctx: StoreContext) {
    let err = store_ctx
        .store
        .delete_queue(&queue_name("missing"))
        .expect_err("should fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[rstest]
fn deleting_a_task_removes_it(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    let task = seed_task(&store_ctx.store, &queue, "a", 5);

    store_ctx.store.delete_task(task.id).expect("delete");
    assert!(store_ctx.store.get_task(task.id).expect("lookup").is_none());

    let err = store_ctx
        .store
        .delete_task(task.id)
        .expect_err("second delete should fail");
    assert!(matches!(err, StoreError::TaskNotFound(_)));
}

#[rstest]
fn stats_count_tasks_by_status(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    for title in ["a", "b", "c"] {
        seed_task(&store_ctx.store, &queue, title, 5);
    }
    let claimed = seed_task(&store_ctx.store, &queue, "d", 9);
    store_ctx
        .store
        .checkout_task(
            &foreman::domain::CheckoutTarget::Task(claimed.id),
            Some("w1"),
        )
        .expect("checkout");

    let stats = store_ctx.store.get_queue_stats(&queue).expect("stats");
    assert_eq!(stats.total, 4);
    assert_eq!(stats.pending, 3);
    assert_eq!(stats.checked_out, 1);
    assert_eq!(stats.completed, 0);
    assert_eq!(stats.failed, 0);
}

#[rstest]
fn stats_for_a_missing_queue_is_not_found(store_ctx: StoreContext) {
    let err = store_ctx
        .store
        .get_queue_stats(&queue_name("missing"))
        .expect_err("should fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[rstest]
fn list_tasks_orders_filters_and_limits(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");
    seed_task(&store_ctx.store, &queue, "low", 2);
    seed_task(&store_ctx.store, &queue, "high", 9);
    seed_task(&store_ctx.store, &queue, "mid", 5);

    let titles: Vec<_> = store_ctx
        .store
        .list_tasks(&queue, None, None)
        .expect("list")
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, ["high", "mid", "low"]);

    let pending_only = store_ctx
        .store
        .list_tasks(&queue, Some(TaskStatus::Pending), Some(2))
        .expect("filtered list");
    assert_eq!(pending_only.len(), 2);
    assert_eq!(pending_only[0].title, "high");

    let none_completed = store_ctx
        .store
        .list_tasks(&queue, Some(TaskStatus::Completed), None)
        .expect("filtered list");
    assert!(none_completed.is_empty());
}

#[rstest]
fn list_tasks_rejects_a_zero_limit(store_ctx: StoreContext) {
    let queue = create_queue(&store_ctx.store, "q1");

    let err = store_ctx
        .store
        .list_tasks(&queue, None, Some(0))
        .expect_err("zero limit should fail");
    assert_eq!(err.kind(), ErrorKind::Validation);
}

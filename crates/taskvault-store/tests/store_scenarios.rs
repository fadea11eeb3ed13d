//! End-to-end scenarios against the in-memory backend, with an invariant
//! sweep that cross-checks both secondary indexes against the primary
//! records after every mutation.

use std::collections::HashSet;
use std::sync::Arc;

use taskvault_core::{
    Description, DuePatch, KvBackend, TaskDraft, TaskId, TaskPatch, TaskStatus, UserId,
    WallClockResolver,
};
use taskvault_store::{keys, InMemoryBackend, TaskFilter, TaskStore};

fn setup() -> (TaskStore, InMemoryBackend) {
    let backend = InMemoryBackend::new();
    let store = TaskStore::new(Arc::new(backend.clone()), Arc::new(WallClockResolver));
    (store, backend)
}

fn user(name: &str) -> UserId {
    UserId::new(name).unwrap()
}

fn draft(description: &str) -> TaskDraft {
    TaskDraft::new(Description::new(description).unwrap())
}

/// Check I2/I3/I4 for every id the test has ever seen: an id is in exactly
/// the status bucket matching its stored status iff its record exists, and
/// in the due index iff its record has a due time, at the right score.
fn assert_indexes_consistent(store: &TaskStore, backend: &InMemoryBackend, u: &UserId, ids: &[TaskId]) {
    let pending = backend
        .set_members(&keys::status_key(u, TaskStatus::Pending))
        .unwrap();
    let completed = backend
        .set_members(&keys::status_key(u, TaskStatus::Completed))
        .unwrap();
    let due: HashSet<String> = backend
        .zset_range_by_score(&keys::due_key(u), None, None)
        .unwrap()
        .into_iter()
        .collect();

    for id in ids {
        let member = id.to_string();
        match store.get(id).unwrap() {
            Some(task) => {
                let (expected_in, expected_out) = match task.status {
                    TaskStatus::Pending => (&pending, &completed),
                    TaskStatus::Completed => (&completed, &pending),
                };
                assert!(expected_in.contains(&member), "{member} missing from its status bucket");
                assert!(!expected_out.contains(&member), "{member} in the wrong status bucket");
                assert_eq!(
                    due.contains(&member),
                    task.due_time.is_some(),
                    "{member} due-index membership disagrees with its record"
                );
                if let Some(due_time) = task.due_time {
                    let at_score = backend
                        .zset_range_by_score(&keys::due_key(u), Some(due_time), Some(due_time))
                        .unwrap();
                    assert!(at_score.contains(&member), "{member} not at its due score");
                }
            }
            None => {
                assert!(!pending.contains(&member), "{member} deleted but still in pending bucket");
                assert!(!completed.contains(&member), "{member} deleted but still in completed bucket");
                assert!(!due.contains(&member), "{member} deleted but still in due index");
            }
        }
    }
}

#[test]
fn scenario_create_and_read_back() {
    let (store, _) = setup();
    let u = user("u1");
    let id = store
        .create(&u, draft("buy milk").with_due_time(1000))
        .unwrap();
    let task = store.get(&id).unwrap().unwrap();
    assert_eq!(task.description.as_str(), "buy milk");
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.due_time, Some(1000));
}

#[test]
fn scenario_status_query_returns_only_matching_tasks() {
    let (store, _) = setup();
    let u = user("u1");
    store.create(&u, draft("open item")).unwrap();
    let done = store
        .create(&u, draft("done item").with_status(TaskStatus::Completed))
        .unwrap();

    let results = store
        .query(&u, TaskFilter::by_statuses([TaskStatus::Completed]))
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, done);
}

#[test]
fn scenario_completing_a_task_keeps_its_due_entry() {
    let (store, backend) = setup();
    let u = user("u1");
    let id = store.create(&u, draft("due soon").with_due_time(500)).unwrap();

    let patch = TaskPatch {
        status: Some(TaskStatus::Completed),
        ..Default::default()
    };
    assert!(store.update(&u, &id, patch).unwrap());

    let at_500 = backend
        .zset_range_by_score(&keys::due_key(&u), Some(500), Some(500))
        .unwrap();
    assert_eq!(at_500, vec![id.to_string()]);
    assert_indexes_consistent(&store, &backend, &u, &[id]);
}

#[test]
fn scenario_clearing_due_time_drops_it_from_range_queries() {
    let (store, backend) = setup();
    let u = user("u1");
    let id = store.create(&u, draft("was due").with_due_time(500)).unwrap();

    let patch = TaskPatch {
        due_time: Some(DuePatch::Clear),
        ..Default::default()
    };
    assert!(store.update(&u, &id, patch).unwrap());

    assert!(store
        .query(&u, TaskFilter::due_between(Some(0), Some(1000)))
        .unwrap()
        .is_empty());
    assert_indexes_consistent(&store, &backend, &u, &[id]);
}

#[test]
fn scenario_delete_of_unknown_id_is_a_clean_miss() {
    let (store, _) = setup();
    let u = user("u1");
    let id = TaskId::generate();
    assert_eq!(store.get(&id).unwrap(), None);
    assert!(!store.delete(&u, &id).unwrap());
    assert_eq!(store.get(&id).unwrap(), None);
}

#[test]
fn indexes_stay_consistent_across_a_full_lifecycle() {
    let (store, backend) = setup();
    let u = user("lifecycle");
    let mut seen = Vec::new();

    let a = store.create(&u, draft("a").with_due_time(100)).unwrap();
    seen.push(a);
    assert_indexes_consistent(&store, &backend, &u, &seen);

    let b = store.create(&u, draft("b")).unwrap();
    seen.push(b);
    assert_indexes_consistent(&store, &backend, &u, &seen);

    let bulk = store
        .create_bulk(
            &u,
            vec![
                draft("c").with_due_time(300),
                draft("d").with_status(TaskStatus::Completed),
            ],
        )
        .unwrap();
    seen.extend(bulk);
    assert_indexes_consistent(&store, &backend, &u, &seen);

    // Toggle a's status back and forth.
    for status in [TaskStatus::Completed, TaskStatus::Pending, TaskStatus::Completed] {
        let patch = TaskPatch {
            status: Some(status),
            ..Default::default()
        };
        assert!(store.update(&u, &a, patch).unwrap());
        assert_indexes_consistent(&store, &backend, &u, &seen);
    }

    // Give b a due time, then move it.
    let patch = TaskPatch {
        due_time: Some(DuePatch::At(250)),
        ..Default::default()
    };
    assert!(store.update(&u, &b, patch).unwrap());
    assert_indexes_consistent(&store, &backend, &u, &seen);

    let patch = TaskPatch {
        due_time: Some(DuePatch::At(750)),
        ..Default::default()
    };
    assert!(store.update(&u, &b, patch).unwrap());
    assert_indexes_consistent(&store, &backend, &u, &seen);

    // Delete everything, one at a time.
    for id in &seen.clone() {
        assert!(store.delete(&u, id).unwrap());
        assert_indexes_consistent(&store, &backend, &u, &seen);
    }
    assert!(store
        .query(&u, TaskFilter::by_statuses(TaskStatus::ALL))
        .unwrap()
        .is_empty());
}

#[test]
fn bulk_create_lands_every_record_and_index_entry() {
    let (store, backend) = setup();
    let u = user("bulk");
    let ids = store
        .create_bulk(
            &u,
            vec![
                draft("one").with_due_time(10),
                draft("two").with_due_time(20),
                draft("three"),
            ],
        )
        .unwrap();
    assert_eq!(ids.len(), 3);
    assert_indexes_consistent(&store, &backend, &u, &ids);

    let due_ids = store
        .query(&u, TaskFilter::due_between(Some(10), Some(20)))
        .unwrap();
    assert_eq!(due_ids.len(), 2);
}

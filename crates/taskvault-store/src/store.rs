//! The task store: CRUD orchestration and the filtered-query engine.
//!
//! This is the only component with business rules. It drives the record
//! codec and the index manager against the key-value backend and owns the
//! invariants:
//!
//! - a task id sits in exactly one status bucket (its current status) for
//!   its user whenever the primary record exists
//! - a task id is in the due index iff its due time is present, with score
//!   equal to that due time
//! - index membership never outlives the primary record
//!
//! Concurrent update/delete of the same task id is an accepted race: the
//! last primary-record write wins and index state may reflect an
//! interleaving. There is no cross-operation locking.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument, warn};

use taskvault_core::{
    DuePatch, DueTimeResolver, KvBackend, KvBatch, StoreResult, Task, TaskDraft, TaskId, TaskPatch,
    TaskStatus, UserId, WriteOp,
};

use crate::codec;
use crate::index::IndexManager;
use crate::keys;

/// Compound filter for [`TaskStore::query`].
///
/// The combination policy is deliberate: an empty filter returns an empty
/// result, not everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Statuses to match (union across buckets). `None` or an empty set
    /// means no status constraint.
    pub statuses: Option<BTreeSet<TaskStatus>>,
    /// Inclusive lower due-time bound; `None` is unbounded below.
    pub start: Option<i64>,
    /// Inclusive upper due-time bound; `None` is unbounded above.
    pub end: Option<i64>,
}

impl TaskFilter {
    pub fn by_statuses(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        Self {
            statuses: Some(statuses.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn due_between(start: Option<i64>, end: Option<i64>) -> Self {
        Self {
            statuses: None,
            start,
            end,
        }
    }

    pub fn with_due_between(mut self, start: Option<i64>, end: Option<i64>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    fn has_time_constraint(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// Task store over an injected key-value backend and due-time resolver.
///
/// One instance per process, shared by all request handlers. All methods
/// take `&self`; the backend handles its own synchronization.
pub struct TaskStore {
    backend: Arc<dyn KvBackend>,
    index: IndexManager,
    resolver: Arc<dyn DueTimeResolver>,
}

impl TaskStore {
    pub fn new(backend: Arc<dyn KvBackend>, resolver: Arc<dyn DueTimeResolver>) -> Self {
        let index = IndexManager::new(backend.clone());
        Self {
            backend,
            index,
            resolver,
        }
    }

    /// Create a task: primary record, status index entry, and due index
    /// entry (iff a due time is present), issued as one pipelined batch.
    #[instrument(skip(self, draft), fields(user = %user_id))]
    pub fn create(&self, user_id: &UserId, draft: TaskDraft) -> StoreResult<TaskId> {
        let task = Self::materialize(user_id, draft, Utc::now().timestamp());
        let mut batch = KvBatch::new();
        self.stage_task(&mut batch, &task);
        self.backend.apply(batch)?;
        debug!(task_id = %task.id, status = %task.status, "task created");
        Ok(task.id)
    }

    /// Create several tasks in one backend-atomic batch. The returned ids
    /// correspond positionally to the input drafts.
    #[instrument(skip(self, drafts), fields(user = %user_id, count = drafts.len()))]
    pub fn create_bulk(&self, user_id: &UserId, drafts: Vec<TaskDraft>) -> StoreResult<Vec<TaskId>> {
        let now = Utc::now().timestamp();
        let mut batch = KvBatch::new();
        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let task = Self::materialize(user_id, draft, now);
            self.stage_task(&mut batch, &task);
            ids.push(task.id);
        }
        self.backend.apply(batch)?;
        debug!(created = ids.len(), "bulk create finished");
        Ok(ids)
    }

    /// Fetch a task by id. `Ok(None)` means the task does not exist; that is
    /// a normal result, not an error.
    pub fn get(&self, task_id: &TaskId) -> StoreResult<Option<Task>> {
        let key = keys::task_key(task_id);
        let fields = self.backend.hash_get_all(&key)?;
        Ok(codec::decode(&key, fields)?)
    }

    /// Apply a partial update. Returns `false` if the task does not exist.
    ///
    /// The full updated record is persisted as one write; index migrations
    /// follow. A no-op patch (fields present but unchanged) is safe and
    /// still returns `true`.
    #[instrument(skip(self, patch), fields(user = %user_id, task = %task_id))]
    pub fn update(&self, user_id: &UserId, task_id: &TaskId, patch: TaskPatch) -> StoreResult<bool> {
        let Some(current) = self.get(task_id)? else {
            return Ok(false);
        };

        let old_status = current.status;
        let old_due = current.due_time;

        // Resolve the effective due time before any mutation, so an
        // unresolvable patch rejects the whole update up front.
        let (due_touched, new_due) = match &patch.due_time {
            None => (false, old_due),
            Some(DuePatch::Clear) => (true, None),
            Some(DuePatch::At(ts)) => (true, Some(*ts)),
            Some(DuePatch::Text(text)) => (true, Some(self.resolver.resolve(text)?)),
        };

        let updated = Task {
            description: patch.description.unwrap_or(current.description),
            status: patch.status.unwrap_or(old_status),
            due_time: new_due,
            // id, owning user, and creation time are immutable.
            id: current.id,
            user_id: current.user_id,
            created_at: current.created_at,
        };

        self.backend
            .hash_set(&keys::task_key(task_id), &codec::encode(&updated))?;

        if updated.status != old_status {
            self.index
                .move_status(user_id, old_status, updated.status, task_id)?;
            debug!(from = %old_status, to = %updated.status, "status index migrated");
        }

        if due_touched {
            // Remove the old entry only if one existed, then add the new one
            // only if the resolved due time is present.
            if old_due.is_some() {
                self.index.remove_from_due(user_id, task_id)?;
            }
            if let Some(due) = updated.due_time {
                self.index.add_to_due(user_id, task_id, due)?;
            }
        }

        Ok(true)
    }

    /// Delete a task. Returns `false` if it does not exist.
    ///
    /// Reads the current status and due time first to know which index
    /// entries to clean, then removes both index entries and the primary
    /// record as one batch.
    #[instrument(skip(self), fields(user = %user_id, task = %task_id))]
    pub fn delete(&self, user_id: &UserId, task_id: &TaskId) -> StoreResult<bool> {
        let Some(current) = self.get(task_id)? else {
            return Ok(false);
        };

        let mut batch = KvBatch::new();
        self.index.stage_remove(
            &mut batch,
            user_id,
            current.status,
            task_id,
            current.due_time.is_some(),
        );
        batch.push(WriteOp::Delete {
            key: keys::task_key(task_id),
        });
        self.backend.apply(batch)?;
        debug!("task deleted");
        Ok(true)
    }

    /// Answer a compound filter query as an index-intersection query.
    ///
    /// - neither statuses nor a time bound given: empty result, by policy
    /// - statuses only: union of the status buckets
    /// - time bound(s) only: due range with open missing side
    /// - both: intersection of the two id sets
    ///
    /// Ids from an index with no resolvable primary record are dropped from
    /// the output and logged; they are a data-hygiene signal, not an error.
    #[instrument(skip(self, filter), fields(user = %user_id))]
    pub fn query(&self, user_id: &UserId, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let status_ids = match &filter.statuses {
            Some(statuses) if !statuses.is_empty() => {
                Some(self.index.query_status(user_id, statuses)?)
            }
            _ => None,
        };

        let time_ids = if filter.has_time_constraint() {
            Some(
                self.index
                    .query_due_range(user_id, filter.start, filter.end)?,
            )
        } else {
            None
        };

        let ids: HashSet<String> = match (status_ids, time_ids) {
            (Some(by_status), Some(by_time)) => {
                by_status.intersection(&by_time).cloned().collect()
            }
            (Some(by_status), None) => by_status,
            (None, Some(by_time)) => by_time,
            (None, None) => return Ok(Vec::new()),
        };

        let mut tasks = Vec::with_capacity(ids.len());
        for raw in ids {
            let Ok(task_id) = raw.parse::<TaskId>() else {
                warn!(member = %raw, "index member is not a task id, skipping");
                continue;
            };
            match self.get(&task_id)? {
                Some(task) => tasks.push(task),
                None => {
                    warn!(task = %task_id, "stale index entry with no primary record");
                }
            }
        }
        tasks.sort_by_key(|t| (t.created_at, t.id));
        Ok(tasks)
    }

    fn materialize(user_id: &UserId, draft: TaskDraft, created_at: i64) -> Task {
        Task {
            id: TaskId::generate(),
            user_id: user_id.clone(),
            description: draft.description,
            status: draft.status,
            due_time: draft.due_time,
            created_at,
        }
    }

    /// Stage a task's primary record and index entries onto `batch`.
    fn stage_task(&self, batch: &mut KvBatch, task: &Task) {
        batch.push(WriteOp::HashSet {
            key: keys::task_key(&task.id),
            fields: codec::encode(task),
        });
        self.index
            .stage_insert(batch, &task.user_id, task.status, &task.id, task.due_time);
    }
}

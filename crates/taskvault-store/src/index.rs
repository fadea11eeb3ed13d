//! Secondary index maintenance.
//!
//! Two derived structures track the primary records:
//!
//! - status index: one set of task ids per (user, status) pair
//! - due index: one sorted set per user, score = due time; only tasks that
//!   currently have a due time appear
//!
//! Neither is authoritative. Every mutation here mirrors a primary-record
//! mutation made by the store, which is the only caller.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use taskvault_core::{BackendError, KvBackend, KvBatch, TaskId, TaskStatus, UserId, WriteOp};

use crate::keys;

/// Maintains the status and due-time indexes in lockstep with primary
/// record mutations, and answers the id-set halves of filter queries.
pub struct IndexManager {
    backend: Arc<dyn KvBackend>,
}

impl IndexManager {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    pub fn add_to_status(
        &self,
        user_id: &UserId,
        status: TaskStatus,
        task_id: &TaskId,
    ) -> Result<(), BackendError> {
        self.backend
            .set_add(&keys::status_key(user_id, status), &task_id.to_string())
    }

    pub fn remove_from_status(
        &self,
        user_id: &UserId,
        status: TaskStatus,
        task_id: &TaskId,
    ) -> Result<(), BackendError> {
        self.backend
            .set_remove(&keys::status_key(user_id, status), &task_id.to_string())
    }

    /// Upsert: an existing score for the task is overwritten.
    pub fn add_to_due(
        &self,
        user_id: &UserId,
        task_id: &TaskId,
        due_time: i64,
    ) -> Result<(), BackendError> {
        self.backend
            .zset_add(&keys::due_key(user_id), &task_id.to_string(), due_time)
    }

    pub fn remove_from_due(&self, user_id: &UserId, task_id: &TaskId) -> Result<(), BackendError> {
        self.backend
            .zset_remove(&keys::due_key(user_id), &task_id.to_string())
    }

    /// Move a task id between status buckets as one batch.
    pub fn move_status(
        &self,
        user_id: &UserId,
        from: TaskStatus,
        to: TaskStatus,
        task_id: &TaskId,
    ) -> Result<(), BackendError> {
        let mut batch = KvBatch::new();
        batch.push(WriteOp::SetRemove {
            key: keys::status_key(user_id, from),
            member: task_id.to_string(),
        });
        batch.push(WriteOp::SetAdd {
            key: keys::status_key(user_id, to),
            member: task_id.to_string(),
        });
        self.backend.apply(batch)
    }

    /// Stage the index insertions for a new task onto `batch`, so they land
    /// in the same pipelined unit as the primary record.
    pub fn stage_insert(
        &self,
        batch: &mut KvBatch,
        user_id: &UserId,
        status: TaskStatus,
        task_id: &TaskId,
        due_time: Option<i64>,
    ) {
        batch.push(WriteOp::SetAdd {
            key: keys::status_key(user_id, status),
            member: task_id.to_string(),
        });
        if let Some(due) = due_time {
            batch.push(WriteOp::ZSetAdd {
                key: keys::due_key(user_id),
                member: task_id.to_string(),
                score: due,
            });
        }
    }

    /// Stage the removal of every index entry a task occupies onto `batch`.
    pub fn stage_remove(
        &self,
        batch: &mut KvBatch,
        user_id: &UserId,
        status: TaskStatus,
        task_id: &TaskId,
        had_due_time: bool,
    ) {
        batch.push(WriteOp::SetRemove {
            key: keys::status_key(user_id, status),
            member: task_id.to_string(),
        });
        if had_due_time {
            batch.push(WriteOp::ZSetRemove {
                key: keys::due_key(user_id),
                member: task_id.to_string(),
            });
        }
    }

    /// Union of the status buckets for the given statuses.
    pub fn query_status(
        &self,
        user_id: &UserId,
        statuses: &BTreeSet<TaskStatus>,
    ) -> Result<HashSet<String>, BackendError> {
        let mut ids = HashSet::new();
        for status in statuses {
            ids.extend(
                self.backend
                    .set_members(&keys::status_key(user_id, *status))?,
            );
        }
        Ok(ids)
    }

    /// Task ids with `start <= due_time <= end`, both ends inclusive; `None`
    /// is an open bound. Callers must pass at least one bound; a query with
    /// neither is a filter-policy decision that belongs to the store.
    pub fn query_due_range(
        &self,
        user_id: &UserId,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<HashSet<String>, BackendError> {
        debug_assert!(start.is_some() || end.is_some());
        Ok(self
            .backend
            .zset_range_by_score(&keys::due_key(user_id), start, end)?
            .into_iter()
            .collect())
    }
}

//! Key-value backend seam.
//!
//! The task store talks to its backend exclusively through [`KvBackend`]:
//! a hash-map-per-key store, a set-per-key store, and a score-ordered
//! sorted-set-per-key store, plus batched execution of write operations.
//! Implementations live in `taskvault-store`; this crate only defines the
//! contract so the domain layer stays backend-agnostic.

use std::collections::{HashMap, HashSet};

use crate::error::BackendError;

/// A single write operation destined for a [`KvBatch`].
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Set the given fields on the hash at `key`, creating it if absent.
    HashSet {
        key: String,
        fields: Vec<(String, String)>,
    },
    /// Add `member` to the set at `key`.
    SetAdd { key: String, member: String },
    /// Remove `member` from the set at `key`.
    SetRemove { key: String, member: String },
    /// Upsert `member` with `score` into the sorted set at `key`.
    ZSetAdd {
        key: String,
        member: String,
        score: i64,
    },
    /// Remove `member` from the sorted set at `key`.
    ZSetRemove { key: String, member: String },
    /// Delete the value at `key`, whatever its kind.
    Delete { key: String },
}

/// An ordered list of write operations submitted to the backend together.
///
/// Backends execute a batch pipelined, and atomically where they can
/// (Redis runs it as MULTI/EXEC). A batch reduces round trips and closes
/// the half-published window between a primary record and its index entries.
#[derive(Debug, Clone, Default)]
pub struct KvBatch {
    ops: Vec<WriteOp>,
}

impl KvBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Backend contract for the task store.
///
/// All methods take `&self`; implementations handle their own interior
/// synchronization so one shared instance can serve concurrent callers.
/// Range bounds are inclusive on both ends, with `None` standing for an
/// open bound (`-inf` / `+inf`).
pub trait KvBackend: Send + Sync {
    /// Set fields on the hash at `key`.
    fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<(), BackendError>;

    /// Get all fields of the hash at `key`. An absent key yields an empty
    /// map, not an error.
    fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, BackendError>;

    /// Delete the value at `key`. Deleting an absent key is a no-op.
    fn delete(&self, key: &str) -> Result<(), BackendError>;

    /// Add `member` to the set at `key`.
    fn set_add(&self, key: &str, member: &str) -> Result<(), BackendError>;

    /// Remove `member` from the set at `key`.
    fn set_remove(&self, key: &str, member: &str) -> Result<(), BackendError>;

    /// All members of the set at `key`; empty for an absent key.
    fn set_members(&self, key: &str) -> Result<HashSet<String>, BackendError>;

    /// Upsert `member` with `score` into the sorted set at `key`. An existing
    /// score for the member is overwritten.
    fn zset_add(&self, key: &str, member: &str, score: i64) -> Result<(), BackendError>;

    /// Remove `member` from the sorted set at `key`.
    fn zset_remove(&self, key: &str, member: &str) -> Result<(), BackendError>;

    /// Members of the sorted set at `key` with `min <= score <= max`, in
    /// score order. `None` bounds are open.
    fn zset_range_by_score(
        &self,
        key: &str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Vec<String>, BackendError>;

    /// Execute a batch of write operations together.
    fn apply(&self, batch: KvBatch) -> Result<(), BackendError>;
}

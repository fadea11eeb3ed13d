//! Transient in-process backend.
//!
//! Backs development and tests; all data is lost when the process exits.
//! A single `RwLock` guards the three key spaces, which makes `apply`
//! all-or-nothing: a batch runs entirely under one write lock.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use taskvault_core::{BackendError, KvBackend, KvBatch, WriteOp};

#[derive(Debug, Default)]
struct Shelves {
    hashes: HashMap<String, HashMap<String, String>>,
    sets: HashMap<String, HashSet<String>>,
    zsets: HashMap<String, BTreeMap<String, i64>>,
}

impl Shelves {
    fn apply_op(&mut self, op: WriteOp) {
        match op {
            WriteOp::HashSet { key, fields } => {
                let hash = self.hashes.entry(key).or_default();
                for (field, value) in fields {
                    hash.insert(field, value);
                }
            }
            WriteOp::SetAdd { key, member } => {
                self.sets.entry(key).or_default().insert(member);
            }
            WriteOp::SetRemove { key, member } => {
                if let Some(set) = self.sets.get_mut(&key) {
                    set.remove(&member);
                }
            }
            WriteOp::ZSetAdd { key, member, score } => {
                self.zsets.entry(key).or_default().insert(member, score);
            }
            WriteOp::ZSetRemove { key, member } => {
                if let Some(zset) = self.zsets.get_mut(&key) {
                    zset.remove(&member);
                }
            }
            WriteOp::Delete { key } => {
                self.hashes.remove(&key);
                self.sets.remove(&key);
                self.zsets.remove(&key);
            }
        }
    }
}

/// In-memory key-value backend with concurrent access.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    shelves: Arc<RwLock<Shelves>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
        op: &'static str,
        key: &str,
    ) -> Result<std::sync::RwLockReadGuard<'_, Shelves>, BackendError> {
        self.shelves
            .read()
            .map_err(|e| lock_poisoned(op, key, &e.to_string()))
    }

    fn write(
        &self,
        op: &'static str,
        key: &str,
    ) -> Result<std::sync::RwLockWriteGuard<'_, Shelves>, BackendError> {
        self.shelves
            .write()
            .map_err(|e| lock_poisoned(op, key, &e.to_string()))
    }
}

fn lock_poisoned(op: &'static str, key: &str, reason: &str) -> BackendError {
    BackendError::Operation {
        op,
        key: key.to_string(),
        reason: format!("lock poisoned: {reason}"),
    }
}

impl KvBackend for InMemoryBackend {
    fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<(), BackendError> {
        let mut shelves = self.write("hash_set", key)?;
        shelves.apply_op(WriteOp::HashSet {
            key: key.to_string(),
            fields: fields.to_vec(),
        });
        Ok(())
    }

    fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, BackendError> {
        let shelves = self.read("hash_get_all", key)?;
        Ok(shelves.hashes.get(key).cloned().unwrap_or_default())
    }

    fn delete(&self, key: &str) -> Result<(), BackendError> {
        let mut shelves = self.write("delete", key)?;
        shelves.apply_op(WriteOp::Delete {
            key: key.to_string(),
        });
        Ok(())
    }

    fn set_add(&self, key: &str, member: &str) -> Result<(), BackendError> {
        let mut shelves = self.write("set_add", key)?;
        shelves.apply_op(WriteOp::SetAdd {
            key: key.to_string(),
            member: member.to_string(),
        });
        Ok(())
    }

    fn set_remove(&self, key: &str, member: &str) -> Result<(), BackendError> {
        let mut shelves = self.write("set_remove", key)?;
        shelves.apply_op(WriteOp::SetRemove {
            key: key.to_string(),
            member: member.to_string(),
        });
        Ok(())
    }

    fn set_members(&self, key: &str) -> Result<HashSet<String>, BackendError> {
        let shelves = self.read("set_members", key)?;
        Ok(shelves.sets.get(key).cloned().unwrap_or_default())
    }

    fn zset_add(&self, key: &str, member: &str, score: i64) -> Result<(), BackendError> {
        let mut shelves = self.write("zset_add", key)?;
        shelves.apply_op(WriteOp::ZSetAdd {
            key: key.to_string(),
            member: member.to_string(),
            score,
        });
        Ok(())
    }

    fn zset_remove(&self, key: &str, member: &str) -> Result<(), BackendError> {
        let mut shelves = self.write("zset_remove", key)?;
        shelves.apply_op(WriteOp::ZSetRemove {
            key: key.to_string(),
            member: member.to_string(),
        });
        Ok(())
    }

    fn zset_range_by_score(
        &self,
        key: &str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Vec<String>, BackendError> {
        let shelves = self.read("zset_range_by_score", key)?;
        let Some(zset) = shelves.zsets.get(key) else {
            return Ok(Vec::new());
        };
        let mut matched: Vec<(String, i64)> = zset
            .iter()
            .filter(|(_, score)| {
                min.is_none_or(|m| **score >= m) && max.is_none_or(|m| **score <= m)
            })
            .map(|(member, score)| (member.clone(), *score))
            .collect();
        matched.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        Ok(matched.into_iter().map(|(member, _)| member).collect())
    }

    fn apply(&self, batch: KvBatch) -> Result<(), BackendError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut shelves = self.write("apply", "batch")?;
        for op in batch.into_ops() {
            shelves.apply_op(op);
        }
        Ok(())
    }
}

//! Redis implementation of the key-value backend.
//!
//! One shared client and one mutex-guarded connection serve all callers;
//! the process entry point creates a single instance and injects it
//! everywhere. Batches execute as MULTI/EXEC pipelines, so index writes
//! land with their primary record in one round trip.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use redis::{Client, Commands, Connection, RedisError};
use taskvault_core::{BackendError, KvBackend, KvBatch, WriteOp};

use std::collections::{HashMap, HashSet};

/// Connection settings for [`RedisBackend`].
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://127.0.0.1:6379`.
    pub url: String,
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
    /// Per-command read/write timeout.
    pub command_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(2),
        }
    }
}

impl RedisConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), BackendError> {
        if self.url.is_empty() {
            return Err(BackendError::Connection {
                reason: "redis URL cannot be empty".to_string(),
            });
        }
        if self.connect_timeout.is_zero() || self.command_timeout.is_zero() {
            return Err(BackendError::Connection {
                reason: "timeouts cannot be zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Redis-backed key-value store with connection sharing for concurrent access.
#[derive(Clone)]
pub struct RedisBackend {
    client: Arc<Client>,
    conn: Arc<Mutex<Connection>>,
}

impl RedisBackend {
    /// Connect and verify the server responds to PING.
    pub fn connect(config: &RedisConfig) -> Result<Self, BackendError> {
        config.validate()?;
        let client = Client::open(config.url.as_str()).map_err(connection_err)?;
        let mut conn = client
            .get_connection_with_timeout(config.connect_timeout)
            .map_err(connection_err)?;
        conn.set_read_timeout(Some(config.command_timeout))
            .map_err(connection_err)?;
        conn.set_write_timeout(Some(config.command_timeout))
            .map_err(connection_err)?;
        redis::cmd("PING")
            .query::<String>(&mut conn)
            .map_err(connection_err)?;
        tracing::info!(url = %config.url, "connected to redis");
        Ok(Self {
            client: Arc::new(client),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get a dedicated connection from the client (for batch execution, so a
    /// MULTI/EXEC block never interleaves with single commands).
    fn batch_connection(&self) -> Result<Connection, BackendError> {
        self.client.get_connection().map_err(connection_err)
    }

    fn lock(&self, op: &'static str, key: &str) -> Result<MutexGuard<'_, Connection>, BackendError> {
        self.conn.lock().map_err(|e| BackendError::Operation {
            op,
            key: key.to_string(),
            reason: format!("lock poisoned: {e}"),
        })
    }
}

fn connection_err(err: RedisError) -> BackendError {
    BackendError::Connection {
        reason: err.to_string(),
    }
}

fn command_err(op: &'static str, key: &str, err: RedisError) -> BackendError {
    if err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout() {
        connection_err(err)
    } else {
        BackendError::Operation {
            op,
            key: key.to_string(),
            reason: err.to_string(),
        }
    }
}

fn score_bound(bound: Option<i64>, open: &str) -> String {
    bound.map_or_else(|| open.to_string(), |v| v.to_string())
}

impl KvBackend for RedisBackend {
    fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<(), BackendError> {
        let mut conn = self.lock("HSET", key)?;
        conn.hset_multiple::<_, _, _, ()>(key, fields)
            .map_err(|e| command_err("HSET", key, e))
    }

    fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, BackendError> {
        let mut conn = self.lock("HGETALL", key)?;
        conn.hgetall(key).map_err(|e| command_err("HGETALL", key, e))
    }

    fn delete(&self, key: &str) -> Result<(), BackendError> {
        let mut conn = self.lock("DEL", key)?;
        conn.del::<_, ()>(key).map_err(|e| command_err("DEL", key, e))
    }

    fn set_add(&self, key: &str, member: &str) -> Result<(), BackendError> {
        let mut conn = self.lock("SADD", key)?;
        conn.sadd::<_, _, ()>(key, member)
            .map_err(|e| command_err("SADD", key, e))
    }

    fn set_remove(&self, key: &str, member: &str) -> Result<(), BackendError> {
        let mut conn = self.lock("SREM", key)?;
        conn.srem::<_, _, ()>(key, member)
            .map_err(|e| command_err("SREM", key, e))
    }

    fn set_members(&self, key: &str) -> Result<HashSet<String>, BackendError> {
        let mut conn = self.lock("SMEMBERS", key)?;
        conn.smembers(key)
            .map_err(|e| command_err("SMEMBERS", key, e))
    }

    fn zset_add(&self, key: &str, member: &str, score: i64) -> Result<(), BackendError> {
        let mut conn = self.lock("ZADD", key)?;
        conn.zadd::<_, _, _, ()>(key, member, score)
            .map_err(|e| command_err("ZADD", key, e))
    }

    fn zset_remove(&self, key: &str, member: &str) -> Result<(), BackendError> {
        let mut conn = self.lock("ZREM", key)?;
        conn.zrem::<_, _, ()>(key, member)
            .map_err(|e| command_err("ZREM", key, e))
    }

    fn zset_range_by_score(
        &self,
        key: &str,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Vec<String>, BackendError> {
        let min = score_bound(min, "-inf");
        let max = score_bound(max, "+inf");
        let mut conn = self.lock("ZRANGEBYSCORE", key)?;
        conn.zrangebyscore(key, min, max)
            .map_err(|e| command_err("ZRANGEBYSCORE", key, e))
    }

    fn apply(&self, batch: KvBatch) -> Result<(), BackendError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        pipe.atomic();
        for op in batch.into_ops() {
            match op {
                WriteOp::HashSet { key, fields } => {
                    pipe.hset_multiple(&key, &fields).ignore();
                }
                WriteOp::SetAdd { key, member } => {
                    pipe.sadd(&key, &member).ignore();
                }
                WriteOp::SetRemove { key, member } => {
                    pipe.srem(&key, &member).ignore();
                }
                WriteOp::ZSetAdd { key, member, score } => {
                    pipe.zadd(&key, &member, score).ignore();
                }
                WriteOp::ZSetRemove { key, member } => {
                    pipe.zrem(&key, &member).ignore();
                }
                WriteOp::Delete { key } => {
                    pipe.del(&key).ignore();
                }
            }
        }
        let mut conn = self.batch_connection()?;
        pipe.query::<()>(&mut conn)
            .map_err(|e| command_err("MULTI/EXEC", "batch", e))
    }
}

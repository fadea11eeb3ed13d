//! # Taskvault Store
//!
//! The task store and its collaborators: record codec, secondary index
//! manager, and the key-value backends it runs against.
//!
//! ## Backends
//!
//! - **[`RedisBackend`]**: Redis-backed storage, the production backend
//! - **[`InMemoryBackend`]**: transient storage for development and tests
//!
//! The backend contract itself ([`taskvault_core::KvBackend`]) lives in
//! `taskvault-core` so the domain layer stays backend-agnostic.

pub mod codec;
pub mod keys;

mod in_memory;
pub use in_memory::InMemoryBackend;

mod redis_backend;
pub use redis_backend::{RedisBackend, RedisConfig};

mod index;
pub use index::IndexManager;

mod store;
pub use store::{TaskFilter, TaskStore};

// Re-export the backend contract for implementors and callers.
pub use taskvault_core::{KvBackend, KvBatch, WriteOp};

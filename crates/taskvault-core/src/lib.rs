//! # Taskvault Core
//!
//! Domain types and contracts for the taskvault task-tracking service.
//! This crate defines the task entity with its validated field types, the
//! error taxonomy, the key-value backend seam, and due-time resolution.
//! Backend implementations and the store itself live in `taskvault-store`.

pub mod backend;
pub mod error;
pub mod resolve;
pub mod task;

pub use backend::{KvBackend, KvBatch, WriteOp};
pub use error::{BackendError, CodecError, StoreError, StoreResult, ValidationError};
pub use resolve::{DueTimeResolver, WallClockResolver};
pub use task::{Description, DuePatch, Task, TaskDraft, TaskId, TaskPatch, TaskStatus, UserId};

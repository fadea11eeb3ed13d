//! Key-space naming.
//!
//! The layout is load-bearing: it matches data written by earlier versions
//! of the service, so changing any of these formats orphans stored records.
//!
//! - primary record:  `task:{task_id}`
//! - status index:    `tasks:{user_id}:status:{status}`  (set of task ids)
//! - due index:       `tasks:{user_id}:due`              (sorted set, score = due_time)

use taskvault_core::{TaskId, TaskStatus, UserId};

/// Key of a task's primary record.
pub fn task_key(id: &TaskId) -> String {
    format!("task:{id}")
}

/// Key of the status-index bucket for one (user, status) pair.
pub fn status_key(user_id: &UserId, status: TaskStatus) -> String {
    format!("tasks:{}:status:{}", user_id.as_str(), status)
}

/// Key of the due-time index for one user.
pub fn due_key(user_id: &UserId) -> String {
    format!("tasks:{}:due", user_id.as_str())
}

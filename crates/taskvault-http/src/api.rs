//! Wire types for the HTTP API.
//!
//! Requests carry raw strings and are validated into domain types inside
//! the handlers; responses render the typed task back out, including a
//! human-readable due-time string alongside the epoch value.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use taskvault_core::Task;

/// One task to create, as supplied by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSpec {
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Due-time text; resolved to epoch seconds before the store is called.
    #[serde(default)]
    pub due_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub user_id: String,
    #[serde(flatten)]
    pub task: TaskSpec,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    pub user_id: String,
    pub tasks: Vec<TaskSpec>,
}

#[derive(Debug, Serialize)]
pub struct BulkCreateResponse {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub user_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// `null`/absent keeps the current due time; an empty string clears it;
    /// anything else is resolved as due-time text.
    #[serde(default)]
    pub due_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerParams {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub user_id: String,
    /// Comma-separated status list, e.g. `pending,completed`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub status: String,
    pub due_time: Option<i64>,
    /// `YYYY-MM-DD HH:MM:SS` UTC rendering of `due_time`, when present.
    pub due_display: Option<String>,
    pub created_at: i64,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        let due_display = task.due_time.and_then(format_epoch);
        Self {
            id: task.id.to_string(),
            user_id: task.user_id.to_string(),
            description: task.description.as_str().to_string(),
            status: task.status.to_string(),
            due_time: task.due_time,
            due_display,
            created_at: task.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub total: usize,
    pub tasks: Vec<TaskResponse>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

fn format_epoch(epoch: i64) -> Option<String> {
    DateTime::from_timestamp(epoch, 0).map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskvault_core::{Description, TaskId, TaskStatus, UserId};

    #[test]
    fn task_response_formats_due_time() {
        let task = Task {
            id: TaskId::generate(),
            user_id: UserId::new("u1").unwrap(),
            description: Description::new("x").unwrap(),
            status: TaskStatus::Pending,
            due_time: Some(1735689600),
            created_at: 1700000000,
        };
        let response = TaskResponse::from(task);
        assert_eq!(response.due_time, Some(1735689600));
        assert_eq!(response.due_display.as_deref(), Some("2025-01-01 00:00:00"));
        assert_eq!(response.status, "pending");
    }

    #[test]
    fn absent_due_time_stays_absent_in_the_response() {
        let task = Task {
            id: TaskId::generate(),
            user_id: UserId::new("u1").unwrap(),
            description: Description::new("x").unwrap(),
            status: TaskStatus::Completed,
            due_time: None,
            created_at: 1700000000,
        };
        let response = TaskResponse::from(task);
        assert_eq!(response.due_time, None);
        assert_eq!(response.due_display, None);
    }
}

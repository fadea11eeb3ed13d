//! Task entity and its validated field types.
//!
//! Every externally supplied field is wrapped in a newtype that validates on
//! construction, so the store and codec never have to re-check invariants.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Opaque unique task identifier, generated at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh random task id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(TaskId)
            .map_err(|_| ValidationError::InvalidTaskId {
                input: s.to_string(),
            })
    }
}

/// Validated owning-user identifier.
///
/// Users are plain string identifiers; there is no account model behind them.
/// Validation only rules out values that would corrupt index key names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Maximum allowed length for user ids.
    pub const MAX_LENGTH: usize = 64;

    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        if raw.len() > Self::MAX_LENGTH {
            return Err(ValidationError::UserIdTooLong {
                length: raw.len(),
                max: Self::MAX_LENGTH,
            });
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ValidationError::InvalidUserIdChars {
                input: raw.to_string(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        UserId::new(&raw)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> String {
        id.0
    }
}

/// Validated task description: non-empty, bounded length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    /// Maximum allowed length for descriptions, in characters.
    pub const MAX_LENGTH: usize = 500;

    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let length = raw.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(ValidationError::DescriptionTooLong {
                length,
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Description {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Description {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Description::new(&raw)
    }
}

impl From<Description> for String {
    fn from(d: Description) -> String {
        d.0
    }
}

/// Task lifecycle status. Toggles freely between the two values via update;
/// deletion is terminal and not a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 2] = [TaskStatus::Pending, TaskStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(ValidationError::InvalidStatus {
                input: other.to_string(),
            }),
        }
    }
}

/// The authoritative task entity.
///
/// `due_time` and `created_at` are epoch seconds. `due_time` being `None` is
/// a distinct state from "due at epoch 0"; the storage codec is the only
/// place that knows how that distinction is encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub description: Description,
    pub status: TaskStatus,
    pub due_time: Option<i64>,
    pub created_at: i64,
}

/// Specification for a task to be created. The store assigns the id and
/// creation timestamp.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub description: Description,
    pub status: TaskStatus,
    /// Resolved due time in epoch seconds, if any.
    pub due_time: Option<i64>,
}

impl TaskDraft {
    pub fn new(description: Description) -> Self {
        Self {
            description,
            status: TaskStatus::default(),
            due_time: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_due_time(mut self, due_time: i64) -> Self {
        self.due_time = Some(due_time);
        self
    }
}

/// Requested change to a task's due time within a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuePatch {
    /// Make the due time absent.
    Clear,
    /// Set the due time to an already-resolved epoch second.
    At(i64),
    /// Set the due time from text; the store resolves it before touching
    /// anything.
    Text(String),
}

/// Partial field set for an update. Fields left as `None` keep their current
/// stored value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub description: Option<Description>,
    pub status: Option<TaskStatus>,
    pub due_time: Option<DuePatch>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.status.is_none() && self.due_time.is_none()
    }
}

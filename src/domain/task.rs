use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::error::BoardError;

/// Opaque task identifier assigned by the backing store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an identifier handed out by a task collection
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a task, one per board column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    AwaitingReview,
    Done,
}

impl TaskStatus {
    /// All statuses in board order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::AwaitingReview,
        TaskStatus::Done,
    ];

    /// Position of the status column on the board
    pub fn index(self) -> usize {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::AwaitingReview => 2,
            Self::Done => 3,
        }
    }

    /// Canonical wire name, as written back to the task collection
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::AwaitingReview => "awaiting_review",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Todo => write!(f, "To Do"),
            Self::InProgress => write!(f, "In Progress"),
            Self::AwaitingReview => write!(f, "Awaiting Review"),
            Self::Done => write!(f, "Done"),
        }
    }
}

/// Lowercases and folds spaces and dashes to underscores
pub(crate) fn normalize_key(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

impl FromStr for TaskStatus {
    type Err = BoardError;

    /// Accepts canonical names, display labels and the portal's Portuguese labels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "todo" | "to_do" | "pendente" | "a_fazer" => Ok(Self::Todo),
            "in_progress" | "inprogress" | "em_progresso" | "em_andamento" => {
                Ok(Self::InProgress)
            }
            "awaiting_review" | "awaitingreview" | "review" | "aguardando_revisão"
            | "aguardando_revisao" | "em_revisão" | "em_revisao" => Ok(Self::AwaitingReview),
            "done" | "concluído" | "concluido" | "concluída" | "concluida" => Ok(Self::Done),
            _ => Err(BoardError::UnknownStatus(s.to_string())),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Sort rank; higher ranks come first under priority sorting
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Urgent => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "low" | "baixa" => Ok(Self::Low),
            "medium" | "média" | "media" => Ok(Self::Medium),
            "high" | "alta" => Ok(Self::High),
            "urgent" | "urgente" => Ok(Self::Urgent),
            _ => Err(BoardError::UnknownPriority(s.to_string())),
        }
    }
}

/// Parses a due date given either as `YYYY-MM-DD` or as an RFC 3339 timestamp
pub fn parse_due_date(s: &str) -> Result<NaiveDate, BoardError> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map_err(|_| BoardError::InvalidDueDate(s.to_string()))
}

/// A task as it arrives from a task collection, before validation.
///
/// Status, priority and due date are kept as raw strings so that records
/// with unexpected values can still be read and then resolved (or set
/// aside) by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    #[serde(default, alias = "due_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default)]
    pub points: u32,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(id),
            title: title.into(),
            description: None,
            status: status.into(),
            due_date: None,
            priority: None,
            points: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    /// Builds a validated task once the status has been resolved.
    ///
    /// A missing priority becomes `Medium`; an unrecognized one is kept as
    /// `None` and ranks lowest. An unparseable due date is dropped.
    pub fn into_task(self, status: TaskStatus) -> Task {
        let priority = match self.priority.as_deref() {
            None => Some(Priority::default()),
            Some(raw) => match raw.parse::<Priority>() {
                Ok(p) => Some(p),
                Err(_) => {
                    tracing::debug!(task_id = %self.id, priority = raw, "unrecognized priority");
                    None
                }
            },
        };

        let due_date = match self.due_date.as_deref() {
            None => None,
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => match parse_due_date(raw) {
                Ok(date) => Some(date),
                Err(e) => {
                    tracing::warn!(task_id = %self.id, error = %e, "dropping due date");
                    None
                }
            },
        };

        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            status,
            due_date,
            priority,
            points: self.points,
        }
    }
}

/// A task on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub points: u32,
}

impl Task {
    /// Creates a new `Todo` task with medium priority
    pub fn new(id: TaskId, title: String) -> Self {
        Self {
            id,
            title,
            description: None,
            status: TaskStatus::Todo,
            due_date: None,
            priority: Some(Priority::default()),
            points: 0,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    /// Moves the task to another status; every transition is allowed
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Priority rank used for sorting; unrecognized priorities rank 0
    pub fn priority_rank(&self) -> u8 {
        self.priority.map(Priority::rank).unwrap_or(0)
    }

    /// Canonical record form, as written to a task collection.
    ///
    /// An unrecognized priority has no canonical name and is written as
    /// absent, so reading the record back yields `Medium`.
    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.as_str().to_string(),
            due_date: self.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            priority: self.priority.map(|p| p.as_str().to_string()),
            points: self.points,
        }
    }
}

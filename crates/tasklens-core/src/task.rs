use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::datetime::to_project_date;

/// Task lifecycle: `pending -> in_progress -> completed <-> pending`
/// (re-opening), and any non-archived state `-> archived`. Only the
/// `completed -> pending` transition clears `completed_at`. The engine
/// never performs transitions; it only reads the current state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
    Archived,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
            Status::Archived => "archived",
        }
    }
}

/// Ordered by insertion; ids are unique within the parent task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// A task record as materialized by the hosted data SDK. All optional
/// fields tolerate absence; collections default to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    pub status: Status,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub list_id: Option<String>,

    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    pub created_date: DateTime<Utc>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub actual_time_spent: u64,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: Status::Pending,
            priority: None,
            category: None,
            list_id: None,
            due_date: None,
            created_date: created,
            completed_at: None,
            actual_time_spent: 0,
            tags: vec![],
            subtasks: vec![],
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.status, Status::Completed | Status::Archived)
    }

    /// True when the task is completed and its completion timestamp
    /// falls on the given project-local calendar day.
    pub fn completed_on(&self, day: NaiveDate) -> bool {
        self.status == Status::Completed
            && self
                .completed_at
                .map(|at| to_project_date(at) == day)
                .unwrap_or(false)
    }
}

/// Total order over priority labels: urgent < high < medium < low.
/// A missing or unrecognized label ranks with medium.
pub fn priority_rank(priority: Option<&str>) -> u8 {
    match priority {
        Some("urgent") => 0,
        Some("high") => 1,
        Some("medium") => 2,
        Some("low") => 3,
        _ => 2,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// A named task list. The engine consumes it only as an id/name lookup
/// and as the partition key for per-list counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroSession {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub duration_minutes: u64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub session_type: Option<String>,
}

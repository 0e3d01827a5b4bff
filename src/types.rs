// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::TaskDagError;

/// Canonical task identity type used throughout the crate.
pub type TaskId = String;

/// Scheduling priority of a task.
///
/// Variants are declared lowest-first so the derived `Ord` ranks
/// `Critical` above everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Numeric weight (4 = critical, 1 = low).
    pub fn value(self) -> u8 {
        match self {
            Priority::Critical => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Priority::Critical => "Critical - Must execute immediately",
            Priority::High => "High - Execute soon",
            Priority::Medium => "Medium - Execute when available",
            Priority::Low => "Low - Execute when idle",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = TaskDagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(TaskDagError::InvalidInput(format!(
                "invalid priority: {other} (expected \"critical\", \"high\", \"medium\" or \"low\")"
            ))),
        }
    }
}

/// Lifecycle status of a task.
///
/// Legal moves:
/// - `Pending` -> `Ready` | `InProgress` | `Cancelled`
/// - `Ready` -> `InProgress` | `Cancelled`
/// - `InProgress` -> `Completed` | `Failed`
///
/// `Completed`, `Failed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    Ready,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn description(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Waiting for execution",
            TaskStatus::Ready => "Dependencies met, ready to execute",
            TaskStatus::InProgress => "Currently being executed",
            TaskStatus::Completed => "Successfully executed",
            TaskStatus::Failed => "Execution failed",
            TaskStatus::Cancelled => "Task cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;

        matches!(
            (self, next),
            (Pending, Ready)
                | (Pending, InProgress)
                | (Pending, Cancelled)
                | (Ready, InProgress)
                | (Ready, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Failed)
        )
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Ready => "READY",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "ready" => Ok(TaskStatus::Ready),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("invalid task status: {other}")),
        }
    }
}

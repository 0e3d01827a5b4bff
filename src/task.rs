// src/task.rs

//! The task entity and the caller-facing spec used to create one.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::{Result, TaskDagError};
use crate::types::{Priority, TaskId, TaskStatus};

/// Everything a caller provides to create a task.
///
/// `priority` falls back to [`Priority::Medium`] when `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSpec {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub dependencies: BTreeSet<TaskId>,
    pub assignee: String,
    pub deadline: Option<DateTime<Utc>>,
}

impl TaskSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, assignee: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            assignee: assignee.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn after(mut self, dep: impl Into<String>) -> Self {
        self.dependencies.insert(dep.into());
        self
    }

    pub fn deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// A unit of work.
///
/// Identity, name, assignee and dependencies are fixed once built. The status
/// and timing fields are only written through the crate-private `mark_*`
/// methods, which the scheduler calls after validating the transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    name: String,
    description: String,
    priority: Priority,
    dependencies: BTreeSet<TaskId>,
    assignee: String,
    deadline: Option<DateTime<Utc>>,

    status: TaskStatus,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    execution_time: Duration,
    failure_reason: Option<String>,
}

impl Task {
    pub fn new(spec: TaskSpec) -> Result<Self> {
        validate_input(&spec)?;

        Ok(Self {
            id: spec.id,
            name: spec.name,
            description: spec.description,
            priority: spec.priority.unwrap_or_default(),
            dependencies: spec.dependencies,
            assignee: spec.assignee,
            deadline: spec.deadline,
            status: TaskStatus::Pending,
            started_at: None,
            completed_at: None,
            execution_time: Duration::ZERO,
            failure_reason: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn dependencies(&self) -> &BTreeSet<TaskId> {
        &self.dependencies
    }

    pub fn assignee(&self) -> &str {
        &self.assignee
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Measured time between start and completion (zero if never started).
    pub fn execution_time(&self) -> Duration {
        self.execution_time
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.contains(id)
    }

    pub fn is_ready(&self) -> bool {
        self.status == TaskStatus::Ready
    }

    /// True iff a deadline exists and `now` is past it.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }

    pub(crate) fn mark_ready(&mut self) {
        self.status = TaskStatus::Ready;
    }

    pub(crate) fn mark_started(&mut self, now: DateTime<Utc>) {
        self.status = TaskStatus::InProgress;
        self.started_at = Some(now);
    }

    pub(crate) fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(now);
        if let Some(started) = self.started_at {
            self.execution_time = (now - started).to_std().unwrap_or_default();
        }
    }

    pub(crate) fn mark_failed(&mut self, reason: impl Into<String>, now: DateTime<Utc>) {
        self.status = TaskStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.completed_at = Some(now);
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.status = TaskStatus::Cancelled;
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task{{id='{}', name='{}', priority={}, status={}, assigned={}, deadline=",
            self.id, self.name, self.priority, self.status, self.assignee
        )?;
        match self.deadline {
            Some(deadline) => write!(f, "{}}}", deadline.format("%Y-%m-%d %H:%M")),
            None => f.write_str("none}"),
        }
    }
}

fn validate_input(spec: &TaskSpec) -> Result<()> {
    if spec.id.trim().is_empty() {
        return Err(TaskDagError::InvalidInput(
            "Task ID cannot be empty".to_string(),
        ));
    }
    if spec.name.trim().is_empty() {
        return Err(TaskDagError::InvalidInput(
            "Task name cannot be empty".to_string(),
        ));
    }
    if spec.assignee.trim().is_empty() {
        return Err(TaskDagError::InvalidInput(
            "Task must be assigned to a team member".to_string(),
        ));
    }
    Ok(())
}

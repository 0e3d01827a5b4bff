// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::{TaskId, TaskStatus};

#[derive(Error, Debug)]
pub enum TaskDagError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate task ID: {0}")]
    DuplicateTask(TaskId),

    #[error("Circular dependency detected: {0}")]
    CycleDetected(TaskId),

    #[error("Dependency not found: {}", .0.join(", "))]
    DependencyNotFound(Vec<String>),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Task execution failed [{task}]: {reason}")]
    ExecutionFailed { task: TaskId, reason: String },

    #[error("Invalid transition for task {task}: {from} -> {to}")]
    InvalidTransition {
        task: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Scheduler service is no longer running")]
    ServiceClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskDagError>;

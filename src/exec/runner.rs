// src/exec/runner.rs

//! Pluggable execution step.

use std::fmt::Debug;

use crate::task::Task;

/// Trait abstracting what "executing" a task means.
///
/// Called synchronously, exactly once per task, while the task is
/// `InProgress`. An `Err` carries the failure reason; the scheduler then
/// marks the task `Failed` and withholds its dependents.
pub trait TaskRunner: Send + Debug {
    fn run(&mut self, task: &Task) -> Result<(), String>;
}

/// Runner that completes every task immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRunner;

impl TaskRunner for NoopRunner {
    fn run(&mut self, _task: &Task) -> Result<(), String> {
        Ok(())
    }
}

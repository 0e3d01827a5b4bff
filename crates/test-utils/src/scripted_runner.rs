use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Duration;
use taskdag::clock::mock::ManualClock;
use taskdag::exec::TaskRunner;
use taskdag::task::Task;

/// A runner for tests that:
/// - records which tasks were run, in order
/// - fails the tasks named in `failing`
/// - optionally advances a shared [`ManualClock`] per run, so execution
///   times are non-zero and deterministic
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    failing: HashSet<String>,
    executed: Arc<Mutex<Vec<String>>>,
    clock: Option<(ManualClock, Duration)>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Every run advances `clock` by `per_task` before reporting its outcome.
    pub fn ticking(mut self, clock: ManualClock, per_task: Duration) -> Self {
        self.clock = Some((clock, per_task));
        self
    }

    /// Shared view of the run log; clone it before handing the runner over.
    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.executed)
    }
}

impl TaskRunner for ScriptedRunner {
    fn run(&mut self, task: &Task) -> Result<(), String> {
        self.executed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(task.id().to_string());

        if let Some((clock, per_task)) = &self.clock {
            clock.advance(*per_task);
        }

        if self.failing.contains(task.id()) {
            Err(format!("{} failed on purpose", task.id()))
        } else {
            Ok(())
        }
    }
}

// src/dag/scheduler.rs

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::dag::queue::AdmissionQueue;
use crate::dag::resolver::DependencyResolver;
use crate::dag::TaskMap;
use crate::errors::{Result, TaskDagError};
use crate::exec::{NoopRunner, TaskRunner};
use crate::task::{Task, TaskSpec};
use crate::types::{TaskId, TaskStatus};

/// Point-in-time counters for a scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub total: usize,
    pub completed: usize,
    /// Entries currently in the admission queue.
    pub queued: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Admitted, not started, and waiting on dependencies.
    pub blocked: usize,
}

/// A lifecycle move requested by the scheduler.
#[derive(Debug)]
enum Transition {
    Ready,
    Start(DateTime<Utc>),
    Complete(DateTime<Utc>),
    Fail(String, DateTime<Utc>),
    Cancel,
}

impl Transition {
    fn target(&self) -> TaskStatus {
        match self {
            Transition::Ready => TaskStatus::Ready,
            Transition::Start(_) => TaskStatus::InProgress,
            Transition::Complete(_) => TaskStatus::Completed,
            Transition::Fail(..) => TaskStatus::Failed,
            Transition::Cancel => TaskStatus::Cancelled,
        }
    }
}

/// Dependency-aware task scheduler.
///
/// It owns:
/// - the canonical identity -> task map (single source of truth)
/// - the admission queue of candidates eligible to run
/// - the completed-set used for dependency satisfaction
/// - per-assignee accumulated execution time
///
/// Every insertion is validated against the live graph and rolled back on
/// failure, so the admitted dependency graph is acyclic and closed at all
/// times. Every status change goes through [`TaskStatus::can_transition_to`].
#[derive(Debug)]
pub struct TaskScheduler {
    tasks: TaskMap,
    queue: AdmissionQueue,
    completed: HashSet<TaskId>,
    completion_order: Vec<TaskId>,
    workload: HashMap<String, Duration>,
    clock: Arc<dyn Clock>,
    runner: Box<dyn TaskRunner>,
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskScheduler {
    /// Scheduler on the system clock whose tasks always succeed.
    pub fn new() -> Self {
        Self {
            tasks: TaskMap::new(),
            queue: AdmissionQueue::new(),
            completed: HashSet::new(),
            completion_order: Vec::new(),
            workload: HashMap::new(),
            clock: Arc::new(SystemClock),
            runner: Box::new(NoopRunner),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_runner(mut self, runner: impl TaskRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Graph queries over the current task map.
    pub fn resolver(&self) -> DependencyResolver<'_> {
        DependencyResolver::new(&self.tasks)
    }

    /// Validate and admit a new task.
    ///
    /// Rejections leave the scheduler exactly as it was before the call:
    /// - `InvalidInput` for blank identity/name/assignee
    /// - `DuplicateTask` if the identity is already admitted
    /// - `CycleDetected` if the task would close a dependency loop
    /// - `DependencyNotFound` listing every unresolved reference
    ///
    /// An admitted task is marked `Ready`. It joins the admission queue now if
    /// its dependencies are already completed, otherwise when the last of
    /// them completes.
    pub fn add_task(&mut self, spec: TaskSpec) -> Result<Task> {
        let task = Task::new(spec)?;
        let id = task.id().to_string();

        if self.tasks.contains_key(&id) {
            warn!(task = %id, "rejecting duplicate task id");
            return Err(TaskDagError::DuplicateTask(id));
        }

        // Cycle detection must see the new edges.
        self.tasks.insert(id.clone(), task);

        match self.resolver().has_cycle(&id) {
            Ok(false) => {}
            Ok(true) => {
                self.tasks.remove(&id);
                warn!(task = %id, "rejecting task: circular dependency");
                return Err(TaskDagError::CycleDetected(id));
            }
            Err(e) => {
                self.tasks.remove(&id);
                return Err(e);
            }
        }

        let problems = self.resolver().validate_all_dependencies();
        if !problems.is_empty() {
            self.tasks.remove(&id);
            warn!(task = %id, ?problems, "rejecting task: unresolved dependencies");
            return Err(TaskDagError::DependencyNotFound(problems));
        }

        let satisfied = self
            .resolver()
            .dependencies_satisfied(&id, &self.completed)?;

        self.transition(&id, Transition::Ready)?;
        let task = self
            .tasks
            .get(&id)
            .ok_or_else(|| TaskDagError::TaskNotFound(id.clone()))?;

        if satisfied {
            self.queue.push(task);
        } else {
            debug!(task = %id, "dependencies pending; not queued yet");
        }

        info!(
            task = %id,
            assignee = %task.assignee(),
            priority = %task.priority(),
            queued = satisfied,
            "task added"
        );

        Ok(task.clone())
    }

    /// Run the highest-priority task whose dependencies are all completed.
    ///
    /// Returns `Ok(None)` when nothing is runnable, which is normal when the
    /// remaining tasks are blocked. A runner failure marks the task `Failed`
    /// and returns `ExecutionFailed`; its dependents are never released, but
    /// the scheduler stays usable.
    pub fn execute_next_task(&mut self) -> Result<Option<Task>> {
        let Some(id) = self.next_executable() else {
            debug!("no executable task");
            return Ok(None);
        };

        self.transition(&id, Transition::Start(self.clock.now()))?;
        info!(task = %id, "task started");

        let task = self
            .tasks
            .get(&id)
            .ok_or_else(|| TaskDagError::TaskNotFound(id.clone()))?;
        let outcome = self.runner.run(task);

        match outcome {
            Ok(()) => {
                self.transition(&id, Transition::Complete(self.clock.now()))?;
                self.completed.insert(id.clone());
                self.completion_order.push(id.clone());

                let task = self
                    .tasks
                    .get(&id)
                    .ok_or_else(|| TaskDagError::TaskNotFound(id.clone()))?;
                *self
                    .workload
                    .entry(task.assignee().to_string())
                    .or_default() += task.execution_time();

                info!(
                    task = %id,
                    assignee = %task.assignee(),
                    elapsed = ?task.execution_time(),
                    "task completed"
                );

                let released = self.release_dependents(&id)?;
                if !released.is_empty() {
                    debug!(task = %id, ?released, "released dependents");
                }

                Ok(Some(self.task_ref(&id)?.clone()))
            }
            Err(reason) => {
                self.transition(&id, Transition::Fail(reason.clone(), self.clock.now()))?;
                warn!(
                    task = %id,
                    reason = %reason,
                    "task failed; dependents stay blocked"
                );
                Err(TaskDagError::ExecutionFailed { task: id, reason })
            }
        }
    }

    /// Execute until nothing is runnable, returning the executed tasks in
    /// order. Stops at the first failure and returns that error; tasks
    /// completed before it stay completed.
    pub fn execute_all(&mut self) -> Result<Vec<Task>> {
        let mut executed = Vec::new();
        while let Some(task) = self.execute_next_task()? {
            executed.push(task);
        }
        Ok(executed)
    }

    /// Cancel a task that has not started yet.
    ///
    /// A cancelled task never counts as completed, so its dependents stay
    /// blocked.
    pub fn cancel_task(&mut self, id: &str) -> Result<Task> {
        self.transition(id, Transition::Cancel)?;
        let dequeued = self.queue.remove(id);
        info!(task = %id, dequeued, "task cancelled");
        Ok(self.task_ref(id)?.clone())
    }

    pub fn get_task(&self, id: &str) -> Result<&Task> {
        self.task_ref(id)
    }

    /// Snapshot of every admitted task, ordered by identity.
    pub fn get_all_tasks(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    pub fn total_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    pub fn completed_ids(&self) -> &HashSet<TaskId> {
        &self.completed
    }

    /// Identities in the order they completed.
    pub fn completion_order(&self) -> &[TaskId] {
        &self.completion_order
    }

    /// Accumulated execution time per assignee.
    pub fn team_workload(&self) -> &HashMap<String, Duration> {
        &self.workload
    }

    /// Queue contents in the order they would run right now.
    pub fn queued_ids(&self) -> Vec<TaskId> {
        self.queue.ordered_ids(self.clock.now())
    }

    pub fn topological_order(&self) -> Vec<TaskId> {
        self.resolver().topological_order()
    }

    /// Admitted tasks that have not started and are waiting on dependencies.
    pub fn blocked_tasks(&self) -> Vec<TaskId> {
        self.tasks
            .values()
            .filter(|task| matches!(task.status(), TaskStatus::Pending | TaskStatus::Ready))
            .filter(|task| !self.queue.contains(task.id()))
            .filter(|task| {
                !task
                    .dependencies()
                    .iter()
                    .all(|dep| self.completed.contains(dep))
            })
            .map(|task| task.id().to_string())
            .collect()
    }

    pub fn stats(&self) -> SchedulerStats {
        let count = |status: TaskStatus| {
            self.tasks
                .values()
                .filter(|task| task.status() == status)
                .count()
        };

        SchedulerStats {
            total: self.tasks.len(),
            completed: self.completed.len(),
            queued: self.queue.len(),
            failed: count(TaskStatus::Failed),
            cancelled: count(TaskStatus::Cancelled),
            blocked: self.blocked_tasks().len(),
        }
    }

    fn task_ref(&self, id: &str) -> Result<&Task> {
        self.tasks
            .get(id)
            .ok_or_else(|| TaskDagError::TaskNotFound(id.to_string()))
    }

    /// Pop candidates best-first until one is still `Ready` with every
    /// dependency completed. Stale candidates are dropped, not re-queued; a
    /// later cascade pushes them again once they are eligible.
    fn next_executable(&mut self) -> Option<TaskId> {
        let now = self.clock.now();

        while let Some(entry) = self.queue.pop(now) {
            let Some(task) = self.tasks.get(&entry.id) else {
                warn!(task = %entry.id, "queued task missing from task map");
                continue;
            };

            if !task.is_ready() {
                debug!(task = %entry.id, status = %task.status(), "discarding stale queue entry");
                continue;
            }

            match self
                .resolver()
                .dependencies_satisfied(&entry.id, &self.completed)
            {
                Ok(true) => return Some(entry.id),
                Ok(false) => {
                    debug!(task = %entry.id, "dependencies not satisfied; discarding candidate");
                }
                Err(e) => {
                    warn!(task = %entry.id, error = %e, "discarding candidate");
                }
            }
        }

        None
    }

    /// Queue every dependent of `completed_id` that has not started and whose
    /// dependencies are now all completed.
    fn release_dependents(&mut self, completed_id: &str) -> Result<Vec<TaskId>> {
        let mut released = Vec::new();

        let dependents = self.resolver().dependents_of(completed_id);

        for dep_id in dependents {
            let status = self.task_ref(&dep_id)?.status();
            if !matches!(status, TaskStatus::Pending | TaskStatus::Ready) {
                continue;
            }

            if !self
                .resolver()
                .dependencies_satisfied(&dep_id, &self.completed)?
            {
                continue;
            }

            if status == TaskStatus::Pending {
                self.transition(&dep_id, Transition::Ready)?;
            }

            let task = self
                .tasks
                .get(&dep_id)
                .ok_or_else(|| TaskDagError::TaskNotFound(dep_id.clone()))?;
            self.queue.push(task);
            info!(task = %dep_id, assignee = %task.assignee(), "task ready");
            released.push(dep_id);
        }

        Ok(released)
    }

    fn transition(&mut self, id: &str, transition: Transition) -> Result<()> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| TaskDagError::TaskNotFound(id.to_string()))?;

        let from = task.status();
        let to = transition.target();

        if !from.can_transition_to(to) {
            warn!(task = %id, %from, %to, "illegal status transition");
            return Err(TaskDagError::InvalidTransition {
                task: id.to_string(),
                from,
                to,
            });
        }

        match transition {
            Transition::Ready => task.mark_ready(),
            Transition::Start(now) => task.mark_started(now),
            Transition::Complete(now) => task.mark_completed(now),
            Transition::Fail(reason, now) => task.mark_failed(reason, now),
            Transition::Cancel => task.mark_cancelled(),
        }

        debug!(task = %id, %from, %to, "status transition");
        Ok(())
    }
}

// src/dag/resolver.rs

//! Graph queries over the scheduler's live task map.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::dag::TaskMap;
use crate::errors::{Result, TaskDagError};
use crate::types::TaskId;

/// Read-only view over the canonical task map.
///
/// The resolver never owns or caches tasks: the scheduler lends it the map
/// for the duration of a query, so every answer reflects the latest admitted
/// set. The "dependent of" relation is recomputed by scanning on each call.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    tasks: &'a TaskMap,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(tasks: &'a TaskMap) -> Self {
        Self { tasks }
    }

    /// Whether a dependency cycle is reachable from `start`.
    ///
    /// Depth-first walk along dependency edges, tracking the nodes on the
    /// current path. Revisiting a node on that path means a cycle. References
    /// to tasks that are not in the map are skipped; existence is checked by
    /// [`validate_all_dependencies`](Self::validate_all_dependencies).
    ///
    /// Uses an explicit stack so long dependency chains cannot overflow the
    /// call stack.
    pub fn has_cycle(&self, start: &str) -> Result<bool> {
        let (start_id, start_task) = self
            .tasks
            .get_key_value(start)
            .ok_or_else(|| TaskDagError::TaskNotFound(start.to_string()))?;

        let mut visited: HashSet<&'a str> = HashSet::new();
        let mut on_path: HashSet<&'a str> = HashSet::new();
        let mut stack = vec![(start_id.as_str(), start_task.dependencies().iter())];

        visited.insert(start_id);
        on_path.insert(start_id);

        while let Some((node, deps)) = stack.last_mut() {
            match deps.next() {
                Some(dep) => {
                    let dep = dep.as_str();

                    if on_path.contains(dep) {
                        warn!(task = %start, at = %dep, "cycle detected");
                        return Ok(true);
                    }
                    if visited.contains(dep) {
                        continue;
                    }

                    let Some(dep_task) = self.tasks.get(dep) else {
                        debug!(task = %node, dep = %dep, "missing dependency; skipping");
                        continue;
                    };

                    visited.insert(dep);
                    on_path.insert(dep);
                    stack.push((dep, dep_task.dependencies().iter()));
                }
                None => {
                    on_path.remove(*node);
                    stack.pop();
                }
            }
        }

        Ok(false)
    }

    /// Every dependency reference that does not resolve to an admitted task,
    /// as human-readable problems. Empty means the graph is closed.
    pub fn validate_all_dependencies(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, task) in self.tasks {
            for dep in task.dependencies() {
                if !self.tasks.contains_key(dep) {
                    errors.push(format!(
                        "task '{id}' depends on non-existent task '{dep}'"
                    ));
                }
            }
        }

        errors
    }

    /// Kahn's algorithm over the admitted tasks.
    ///
    /// Only edges whose target exists count towards in-degree. Tasks on or
    /// behind a cycle never reach in-degree zero and are left out.
    pub fn topological_order(&self) -> Vec<TaskId> {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for id in self.tasks.keys() {
            in_degree.insert(id, 0);
            dependents.insert(id, Vec::new());
        }

        for (id, task) in self.tasks {
            for dep in task.dependencies() {
                if let Some(list) = dependents.get_mut(dep.as_str()) {
                    list.push(id);
                    *in_degree.entry(id).or_default() += 1;
                }
            }
        }

        let mut queue: VecDeque<&str> = self
            .tasks
            .keys()
            .map(|id| id.as_str())
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();

        let mut order = Vec::with_capacity(self.tasks.len());

        while let Some(id) = queue.pop_front() {
            order.push(id.to_string());

            for &next in dependents.get(id).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(degree) = in_degree.get_mut(next) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(next);
                    }
                }
            }
        }

        if order.len() < self.tasks.len() {
            warn!(
                ordered = order.len(),
                total = self.tasks.len(),
                "topological order is partial; some tasks sit on a cycle"
            );
        }

        order
    }

    /// Tasks whose dependency set contains `id`.
    pub fn dependents_of(&self, id: &str) -> Vec<TaskId> {
        self.tasks
            .values()
            .filter(|task| task.depends_on(id))
            .map(|task| task.id().to_string())
            .collect()
    }

    /// Tasks with no dependencies at all.
    pub fn independent_tasks(&self) -> Vec<TaskId> {
        self.tasks
            .values()
            .filter(|task| !task.has_dependencies())
            .map(|task| task.id().to_string())
            .collect()
    }

    /// Whether every dependency of `id` is in `completed`.
    pub fn dependencies_satisfied(&self, id: &str, completed: &HashSet<TaskId>) -> Result<bool> {
        let task = self
            .tasks
            .get(id)
            .ok_or_else(|| TaskDagError::TaskNotFound(id.to_string()))?;

        Ok(task.dependencies().iter().all(|dep| completed.contains(dep)))
    }
}

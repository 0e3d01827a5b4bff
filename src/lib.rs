// src/lib.rs

pub mod cli;
pub mod clock;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod task;
pub mod types;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::PlanFile;
use crate::config::loader::load_and_validate;
use crate::dag::TaskScheduler;
use crate::engine::{SchedulerHandle, SchedulerService};
use crate::errors::TaskDagError;
use crate::task::Task;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - plan loading and validation
/// - the scheduler service
/// - the execute loop (bounded by `--steps`)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let plan_path = PathBuf::from(&args.plan);
    let plan = load_and_validate(&plan_path)
        .with_context(|| format!("loading plan {:?}", plan_path))?;

    if args.dry_run {
        print_dry_run(&plan)?;
        return Ok(());
    }

    let (handle, service) = SchedulerService::spawn(TaskScheduler::new());

    for spec in plan.task_specs() {
        handle
            .add_task(spec.clone())
            .await
            .with_context(|| format!("admitting task '{}'", spec.id))?;
    }
    info!(tasks = plan.task_specs().len(), "plan admitted");

    let (stop_tx, stop_rx) = watch::channel(false);
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    let executed = execute_loop(&handle, args.steps, &stop_rx).await;
    ctrl_c.abort();
    print_summary(&handle, executed?).await?;

    handle.shutdown().await?;
    service.await.context("scheduler service panicked")?;
    Ok(())
}

/// Repeatedly execute the next task until nothing is runnable, the step
/// limit is reached, or `stop` flips to true. Returns how many tasks
/// completed.
///
/// `stop` is only checked between requests, so a task the service has
/// started is always reported.
async fn execute_loop(
    handle: &SchedulerHandle,
    steps: Option<usize>,
    stop: &watch::Receiver<bool>,
) -> Result<usize> {
    let limit = steps.unwrap_or(usize::MAX);
    let total = handle.stats().await?.total;
    let mut done = 0;

    while done < limit {
        if *stop.borrow() {
            warn!("interrupted; stopping before the next task");
            break;
        }

        match handle.execute_next_task().await {
            Ok(Some(task)) => {
                done += 1;
                println!("[{done}/{total}] {}", render_task(&task, Utc::now()));
            }
            Ok(None) => break,
            Err(TaskDagError::ExecutionFailed { task, reason }) => {
                println!("  failed: {task} ({reason}); its dependents stay blocked");
            }
            Err(e) => return Err(e.into()),
        }
    }

    debug!(done, limit, "execute loop finished");
    Ok(done)
}

async fn print_summary(handle: &SchedulerHandle, executed: usize) -> Result<()> {
    let stats = handle.stats().await?;

    println!();
    println!("executed {executed}/{} task(s)", stats.total);
    println!(
        "  completed = {}, queued = {}, blocked = {}, failed = {}, cancelled = {}",
        stats.completed, stats.queued, stats.blocked, stats.failed, stats.cancelled
    );

    Ok(())
}

/// One-line rendering: `[ID] name | PRIORITY (overdue) | STATUS | assignee`.
pub fn render_task(task: &Task, now: DateTime<Utc>) -> String {
    let overdue = if task.is_overdue(now) { " (overdue)" } else { "" };
    format!(
        "[{}] {} | {}{} | {} | {}",
        task.id(),
        task.name(),
        task.priority(),
        overdue,
        task.status(),
        task.assignee()
    )
}

/// Priority weight and the human-readable meaning of priority and status.
fn render_details(task: &Task) -> String {
    let priority = task.priority();
    format!(
        "priority {} ({}); {}",
        priority.value(),
        priority.description(),
        task.status().description()
    )
}

/// Dry-run output: every task with its dependencies, then the order they
/// would be admitted and the queue at start.
fn print_dry_run(plan: &PlanFile) -> Result<()> {
    let mut scheduler = TaskScheduler::new();
    for spec in plan.task_specs() {
        scheduler.add_task(spec.clone())?;
    }

    let now = Utc::now();

    println!("taskdag dry-run");
    println!();
    println!("tasks ({}):", scheduler.total_tasks());
    for task in scheduler.get_all_tasks() {
        println!("  {}", render_task(&task, now));
        println!("      {}", render_details(&task));
        if task.has_dependencies() {
            let deps: Vec<&str> = task.dependencies().iter().map(String::as_str).collect();
            println!("      after: {}", deps.join(", "));
        }
        if let Some(deadline) = task.deadline() {
            println!("      deadline: {}", deadline.to_rfc3339());
        }
    }

    println!();
    println!("topological order: {}", scheduler.topological_order().join(" -> "));
    println!("ready now: {}", scheduler.queued_ids().join(", "));

    let blocked = scheduler.blocked_tasks();
    if !blocked.is_empty() {
        println!("waiting on dependencies: {}", blocked.join(", "));
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}

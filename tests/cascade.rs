// tests/cascade.rs

mod common;

use std::time::Duration as StdDuration;

use chrono::Duration;
use taskdag::dag::TaskScheduler;
use taskdag::errors::TaskDagError;
use taskdag::types::{Priority, TaskStatus};
use taskdag_test_utils::builders::spec;
use taskdag_test_utils::scripted_runner::ScriptedRunner;
use taskdag_test_utils::{epoch, init_tracing};

use common::{ids, scheduler_at_epoch};

fn pipeline(s: &mut TaskScheduler) {
    s.add_task(spec("DESIGN", Priority::High, &[])).unwrap();
    s.add_task(spec("BACKEND", Priority::High, &["DESIGN"])).unwrap();
    s.add_task(spec("FRONTEND", Priority::High, &["DESIGN"])).unwrap();
    s.add_task(spec("TESTING", Priority::Medium, &["BACKEND", "FRONTEND"]))
        .unwrap();
    s.add_task(spec("DEPLOY", Priority::Critical, &["TESTING"]))
        .unwrap();
}

#[test]
fn every_admitted_task_eventually_runs() {
    init_tracing();
    let (mut s, _clock) = scheduler_at_epoch();
    pipeline(&mut s);

    let run = s.execute_all().unwrap();
    assert_eq!(
        ids(&run),
        vec!["DESIGN", "BACKEND", "FRONTEND", "TESTING", "DEPLOY"]
    );
    assert_eq!(s.completed_count(), 5);
    assert_eq!(s.stats().queued, 0);
    assert!(s.blocked_tasks().is_empty());
}

#[test]
fn join_waits_for_every_branch() {
    init_tracing();
    let (mut s, _clock) = scheduler_at_epoch();
    pipeline(&mut s);

    s.execute_next_task().unwrap(); // DESIGN
    s.execute_next_task().unwrap(); // BACKEND
    assert_eq!(s.queued_ids(), vec!["FRONTEND"]);
    assert!(s.blocked_tasks().contains(&"TESTING".to_string()));

    s.execute_next_task().unwrap(); // FRONTEND
    assert_eq!(s.queued_ids(), vec!["TESTING"]);
}

#[test]
fn failure_withholds_the_whole_downstream() {
    init_tracing();
    let runner = ScriptedRunner::new().failing("BACKEND");
    let log = runner.log();
    let (s, _clock) = scheduler_at_epoch();
    let mut s = s.with_runner(runner);
    pipeline(&mut s);
    s.add_task(spec("DOCS", Priority::Low, &[])).unwrap();

    assert_eq!(s.execute_next_task().unwrap().unwrap().id(), "DESIGN");

    let err = s.execute_next_task().unwrap_err();
    assert!(matches!(err, TaskDagError::ExecutionFailed { ref task, .. } if task == "BACKEND"));

    // Scheduler stays usable and runs what does not depend on BACKEND.
    let rest = s.execute_all().unwrap();
    assert_eq!(ids(&rest), vec!["FRONTEND", "DOCS"]);

    assert_eq!(s.get_task("BACKEND").unwrap().status(), TaskStatus::Failed);
    for id in ["TESTING", "DEPLOY"] {
        let task = s.get_task(id).unwrap();
        assert_eq!(task.status(), TaskStatus::Ready, "{id}");
        assert!(task.started_at().is_none());
    }
    assert_eq!(s.blocked_tasks(), vec!["DEPLOY", "TESTING"]);

    let ran = log.lock().unwrap().clone();
    assert_eq!(ran, vec!["DESIGN", "BACKEND", "FRONTEND", "DOCS"]);
}

#[test]
fn execute_all_stops_at_first_failure() {
    init_tracing();
    let (s, _clock) = scheduler_at_epoch();
    let mut s = s.with_runner(ScriptedRunner::new().failing("FRONTEND"));
    pipeline(&mut s);

    let err = s.execute_all().unwrap_err();
    assert!(matches!(err, TaskDagError::ExecutionFailed { ref task, .. } if task == "FRONTEND"));
    assert_eq!(s.completion_order(), &["DESIGN", "BACKEND"]);
}

#[test]
fn cancelled_dependency_never_releases() {
    init_tracing();
    let (mut s, _clock) = scheduler_at_epoch();
    pipeline(&mut s);

    s.execute_next_task().unwrap(); // DESIGN
    s.cancel_task("FRONTEND").unwrap();

    let rest = s.execute_all().unwrap();
    assert_eq!(ids(&rest), vec!["BACKEND"]);
    assert_eq!(s.get_task("FRONTEND").unwrap().status(), TaskStatus::Cancelled);
    assert_eq!(s.blocked_tasks(), vec!["DEPLOY", "TESTING"]);
}

#[test]
fn execution_time_feeds_team_workload() {
    init_tracing();
    let (s, clock) = scheduler_at_epoch();
    let runner = ScriptedRunner::new().ticking(clock.clone(), Duration::minutes(15));
    let mut s = s.with_runner(runner);

    s.add_task(spec("A", Priority::High, &[])).unwrap();
    s.add_task(spec("B", Priority::High, &["A"])).unwrap();

    let run = s.execute_all().unwrap();
    let a = &run[0];
    assert_eq!(a.started_at(), Some(epoch()));
    assert_eq!(a.completed_at(), Some(epoch() + Duration::minutes(15)));
    assert_eq!(a.execution_time(), StdDuration::from_secs(15 * 60));

    assert_eq!(
        s.team_workload().get("dev"),
        Some(&StdDuration::from_secs(30 * 60))
    );
}

#[test]
fn long_running_task_keeps_its_full_duration() {
    init_tracing();
    let (s, clock) = scheduler_at_epoch();
    let runner = ScriptedRunner::new().ticking(clock.clone(), Duration::days(400));
    let mut s = s.with_runner(runner);

    s.add_task(spec("migration", Priority::Low, &[])).unwrap();
    let done = s.execute_next_task().unwrap().unwrap();

    let expected = StdDuration::from_secs(400 * 24 * 60 * 60);
    assert_eq!(done.execution_time(), expected);
    assert_eq!(s.team_workload().get("dev"), Some(&expected));
}

// tests/service.rs

use taskdag::dag::TaskScheduler;
use taskdag::engine::SchedulerService;
use taskdag::errors::TaskDagError;
use taskdag::types::{Priority, TaskStatus};
use taskdag_test_utils::builders::spec;
use taskdag_test_utils::scripted_runner::ScriptedRunner;
use taskdag_test_utils::{init_tracing, with_timeout};

#[tokio::test]
async fn handle_drives_the_scheduler() {
    init_tracing();
    let (handle, join) = SchedulerService::spawn(TaskScheduler::new());

    with_timeout(async {
        handle.add_task(spec("A", Priority::High, &[])).await.unwrap();
        handle.add_task(spec("B", Priority::High, &["A"])).await.unwrap();
        handle.add_task(spec("C", Priority::Critical, &[])).await.unwrap();

        let err = handle
            .add_task(spec("B", Priority::Low, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskDagError::DuplicateTask(_)));

        let run = handle.execute_all().await.unwrap();
        let ids: Vec<&str> = run.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);

        let stats = handle.stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 3);
        assert_eq!(
            handle.get_task("B").await.unwrap().status(),
            TaskStatus::Completed
        );

        handle.shutdown().await.unwrap();
    })
    .await;

    let scheduler = join.await.unwrap();
    assert_eq!(scheduler.completion_order(), &["C", "A", "B"]);
}

#[tokio::test]
async fn concurrent_admissions_are_serialised() {
    init_tracing();
    let (handle, join) = SchedulerService::spawn(TaskScheduler::new());
    handle.add_task(spec("root", Priority::Low, &[])).await.unwrap();

    let mut workers = Vec::new();
    for i in 0..16 {
        let h = handle.clone();
        workers.push(tokio::spawn(async move {
            h.add_task(spec(&format!("leaf-{i}"), Priority::Medium, &["root"]))
                .await
        }));
    }
    for w in workers {
        w.await.unwrap().unwrap();
    }

    let order = handle.topological_order().await.unwrap();
    assert_eq!(order.len(), 17);
    assert_eq!(order[0], "root");

    let run = with_timeout(handle.execute_all()).await.unwrap();
    assert_eq!(run.len(), 17);

    drop(handle);
    let scheduler = join.await.unwrap();
    assert_eq!(scheduler.completed_count(), 17);
}

#[tokio::test]
async fn failure_and_cancel_through_the_handle() {
    init_tracing();
    let scheduler = TaskScheduler::new().with_runner(ScriptedRunner::new().failing("A"));
    let (handle, _join) = SchedulerService::spawn(scheduler);

    handle.add_task(spec("A", Priority::High, &[])).await.unwrap();
    handle.add_task(spec("B", Priority::Low, &["A"])).await.unwrap();
    handle.add_task(spec("C", Priority::Low, &[])).await.unwrap();

    let err = handle.execute_next_task().await.unwrap_err();
    assert!(matches!(err, TaskDagError::ExecutionFailed { ref task, .. } if task == "A"));

    let c = handle.cancel_task("C").await.unwrap();
    assert_eq!(c.status(), TaskStatus::Cancelled);
    assert_eq!(handle.execute_next_task().await.unwrap(), None);

    let stats = handle.stats().await.unwrap();
    assert_eq!((stats.failed, stats.cancelled, stats.blocked), (1, 1, 1));
}

#[tokio::test]
async fn requests_after_shutdown_fail_cleanly() {
    init_tracing();
    let (handle, join) = SchedulerService::spawn(TaskScheduler::new());
    handle.shutdown().await.unwrap();
    join.await.unwrap();

    assert!(matches!(
        handle.stats().await,
        Err(TaskDagError::ServiceClosed)
    ));
}

// src/engine/service.rs

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dag::{SchedulerStats, TaskScheduler};
use crate::errors::{Result, TaskDagError};
use crate::task::{Task, TaskSpec};
use crate::types::TaskId;

const REQUEST_CHANNEL_CAPACITY: usize = 64;

/// Requests flowing into the service, each with its reply channel.
#[derive(Debug)]
pub enum SchedulerRequest {
    AddTask {
        spec: TaskSpec,
        reply: oneshot::Sender<Result<Task>>,
    },
    ExecuteNext {
        reply: oneshot::Sender<Result<Option<Task>>>,
    },
    CancelTask {
        id: TaskId,
        reply: oneshot::Sender<Result<Task>>,
    },
    GetTask {
        id: TaskId,
        reply: oneshot::Sender<Result<Task>>,
    },
    AllTasks {
        reply: oneshot::Sender<Vec<Task>>,
    },
    Stats {
        reply: oneshot::Sender<SchedulerStats>,
    },
    TopologicalOrder {
        reply: oneshot::Sender<Vec<TaskId>>,
    },
    /// Stop after the requests already received.
    Shutdown,
}

/// Owns a [`TaskScheduler`] and applies requests strictly one after another.
#[derive(Debug)]
pub struct SchedulerService {
    scheduler: TaskScheduler,
    rx: mpsc::Receiver<SchedulerRequest>,
}

impl SchedulerService {
    pub fn new(scheduler: TaskScheduler) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::channel(REQUEST_CHANNEL_CAPACITY);
        (Self { scheduler, rx }, SchedulerHandle { tx })
    }

    /// Spawn the service on the current Tokio runtime.
    ///
    /// The join handle resolves to the scheduler once every handle is dropped
    /// or [`SchedulerHandle::shutdown`] is called.
    pub fn spawn(scheduler: TaskScheduler) -> (SchedulerHandle, JoinHandle<TaskScheduler>) {
        let (service, handle) = Self::new(scheduler);
        (handle, tokio::spawn(service.run()))
    }

    /// Main request loop.
    pub async fn run(mut self) -> TaskScheduler {
        info!("scheduler service started");

        while let Some(request) = self.rx.recv().await {
            if !self.handle(request) {
                info!("shutdown requested");
                break;
            }
        }

        info!("scheduler service stopped");
        self.scheduler
    }

    /// Apply one request. Returns `false` when the loop should stop.
    fn handle(&mut self, request: SchedulerRequest) -> bool {
        match request {
            SchedulerRequest::AddTask { spec, reply } => {
                reply_or_log(reply, self.scheduler.add_task(spec));
            }
            SchedulerRequest::ExecuteNext { reply } => {
                reply_or_log(reply, self.scheduler.execute_next_task());
            }
            SchedulerRequest::CancelTask { id, reply } => {
                reply_or_log(reply, self.scheduler.cancel_task(&id));
            }
            SchedulerRequest::GetTask { id, reply } => {
                reply_or_log(reply, self.scheduler.get_task(&id).cloned());
            }
            SchedulerRequest::AllTasks { reply } => {
                reply_or_log(reply, self.scheduler.get_all_tasks());
            }
            SchedulerRequest::Stats { reply } => {
                reply_or_log(reply, self.scheduler.stats());
            }
            SchedulerRequest::TopologicalOrder { reply } => {
                reply_or_log(reply, self.scheduler.topological_order());
            }
            SchedulerRequest::Shutdown => return false,
        }
        true
    }
}

fn reply_or_log<T>(reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        debug!("requester went away before the reply was sent");
    }
}

/// Cloneable async front door to a running [`SchedulerService`].
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<SchedulerRequest>,
}

impl SchedulerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SchedulerRequest,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| TaskDagError::ServiceClosed)?;
        reply_rx.await.map_err(|_| TaskDagError::ServiceClosed)
    }

    pub async fn add_task(&self, spec: TaskSpec) -> Result<Task> {
        self.request(|reply| SchedulerRequest::AddTask { spec, reply })
            .await?
    }

    pub async fn execute_next_task(&self) -> Result<Option<Task>> {
        self.request(|reply| SchedulerRequest::ExecuteNext { reply })
            .await?
    }

    /// Execute until nothing is runnable. Requests from other handles may be
    /// interleaved between steps.
    pub async fn execute_all(&self) -> Result<Vec<Task>> {
        let mut executed = Vec::new();
        while let Some(task) = self.execute_next_task().await? {
            executed.push(task);
        }
        Ok(executed)
    }

    pub async fn cancel_task(&self, id: impl Into<TaskId>) -> Result<Task> {
        let id = id.into();
        self.request(|reply| SchedulerRequest::CancelTask { id, reply })
            .await?
    }

    pub async fn get_task(&self, id: impl Into<TaskId>) -> Result<Task> {
        let id = id.into();
        self.request(|reply| SchedulerRequest::GetTask { id, reply })
            .await?
    }

    pub async fn get_all_tasks(&self) -> Result<Vec<Task>> {
        self.request(|reply| SchedulerRequest::AllTasks { reply }).await
    }

    pub async fn stats(&self) -> Result<SchedulerStats> {
        self.request(|reply| SchedulerRequest::Stats { reply }).await
    }

    pub async fn topological_order(&self) -> Result<Vec<TaskId>> {
        self.request(|reply| SchedulerRequest::TopologicalOrder { reply })
            .await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.tx
            .send(SchedulerRequest::Shutdown)
            .await
            .map_err(|_| TaskDagError::ServiceClosed)
    }
}

use crate::{Coordinator, Poll, Task};
use anyhow::Context;
use std::{sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::{debug, error, info};

pub struct Worker {
    id: usize,
    coordinator: Arc<Coordinator>,
    poll_interval: Duration,
}

impl Worker {
    pub fn new(id: usize, coordinator: Arc<Coordinator>, poll_interval: Duration) -> Self {
        Self {
            id,
            coordinator,
            poll_interval,
        }
    }

    /// Polls for tasks until the job is finished. Returns how many tasks this
    /// worker completed. A failed task aborts the whole job.
    pub async fn run(self) -> anyhow::Result<usize> {
        let mut completed = 0;
        loop {
            match self.coordinator.poll_task() {
                Poll::Task(task) => {
                    debug!(worker = self.id, id = %task.id, "got task");
                    match self.execute(task).await {
                        Ok(task) => {
                            self.coordinator.complete_task(&task);
                            completed += 1;
                        }
                        Err(e) => {
                            error!(worker = self.id, "task failed: {:#}", e);
                            self.coordinator.abort();
                            return Err(e);
                        }
                    }
                }
                Poll::Wait => sleep(self.poll_interval).await,
                Poll::Shutdown => {
                    info!(worker = self.id, completed, "worker exit");
                    return Ok(completed);
                }
            }
        }
    }

    async fn execute(&self, task: Task) -> anyhow::Result<Task> {
        let coordinator = Arc::clone(&self.coordinator);
        let id = task.id.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<Task> {
            coordinator.execute(&task)?;
            Ok(task)
        })
        .await
        .with_context(|| format!("task {} panicked", id))?
    }
}

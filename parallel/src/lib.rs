//! In-process parallel runner.
//!
//! A [`Coordinator`] hands out map tasks (one per input partition) to a pool
//! of workers. Map output is bucketed by key hash; once the last map task has
//! completed, one reduce task per non-empty bucket is queued. No reduce task
//! exists before every map task is done.

use anyhow::{ensure, Context};
use common::{App, Input, KeyValue};
use futures::future::try_join_all;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing::info;

pub mod coordinator;
pub mod worker;

pub use coordinator::{Coordinator, Poll};
pub use worker::Worker;

pub type TaskId = String;

#[derive(Debug, Clone)]
pub struct Config {
    pub workers: usize,
    pub n_reduce: u64,
    /// Lines per map task; `0` maps each input whole.
    pub lines_per_task: usize,
    /// How long an idle worker waits before polling again.
    pub poll_interval: Duration,
    /// Where `mr-out-<bucket>` files go; nothing is written without it.
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 4,
            n_reduce: 10,
            lines_per_task: 0,
            poll_interval: Duration::from_millis(10),
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub inner: TaskInner,
}

#[derive(Debug, Clone)]
pub enum TaskInner {
    Map(MapTask),
    Reduce(ReduceTask),
}

#[derive(Debug, Clone)]
pub struct MapTask {
    pub index: u64,
    pub input: Arc<Input>,
}

#[derive(Debug, Clone)]
pub struct ReduceTask {
    pub index: u64,
}

pub fn output_file(dir: &Path, bucket: u64) -> PathBuf {
    dir.join(format!("mr-out-{}", bucket))
}

/// Runs `app` over `inputs` on `config.workers` workers. The result is
/// sorted by key and matches [`sequential::run`] on the same inputs.
pub async fn run(
    app: App,
    inputs: Vec<Input>,
    config: Config,
) -> anyhow::Result<Vec<KeyValue>> {
    ensure!(config.workers > 0, "need at least one worker");
    ensure!(config.n_reduce > 0, "need at least one reduce bucket");
    if let Some(dir) = &config.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let inputs: Vec<Input> = inputs
        .into_iter()
        .flat_map(|input| input.split(config.lines_per_task))
        .collect();
    info!(
        app = %app.app_name,
        map_tasks = inputs.len(),
        workers = config.workers,
        n_reduce = config.n_reduce,
        "starting"
    );

    let coordinator = Arc::new(Coordinator::new(app, inputs, config.clone())?);
    let handles = (0..config.workers).map(|id| {
        let worker = Worker::new(id, Arc::clone(&coordinator), config.poll_interval);
        tokio::spawn(worker.run())
    });
    let completed = try_join_all(handles)
        .await?
        .into_iter()
        .collect::<anyhow::Result<Vec<usize>>>()?;
    info!(tasks = completed.iter().sum::<usize>(), "all done");

    Ok(coordinator.take_output())
}

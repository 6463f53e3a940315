use crate::{output_file, Config, MapTask, ReduceTask, Task, TaskId, TaskInner};
use anyhow::{ensure, Context};
use common::{group, ihash, write_records, App, Input, KeyValue};
use crossbeam_queue::ArrayQueue;
use dashmap::DashMap;
use itertools::Itertools;
use std::{
    collections::HashMap,
    fs::File,
    io::BufWriter,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What a worker gets back when it asks for work.
#[derive(Debug)]
pub enum Poll {
    Task(Task),
    /// Nothing queued right now, but the job is not finished.
    Wait,
    Shutdown,
}

#[derive(Debug)]
pub struct Coordinator {
    app: App,
    config: Config,
    pending_tasks: ArrayQueue<Task>,
    running_tasks: DashMap<TaskId, Task>,
    reduce_stage: AtomicBool,
    /// Tasks of the current stage not yet completed.
    remaining: AtomicUsize,
    done: AtomicBool,
    buckets: DashMap<u64, Vec<KeyValue>>,
    output: DashMap<u64, Vec<KeyValue>>,
}

impl Coordinator {
    pub fn new(app: App, inputs: Vec<Input>, config: Config) -> anyhow::Result<Self> {
        ensure!(config.n_reduce > 0, "need at least one reduce bucket");
        let capacity = inputs.len().max(config.n_reduce as usize).max(1);
        let this = Self {
            app,
            config,
            pending_tasks: ArrayQueue::new(capacity),
            running_tasks: DashMap::new(),
            reduce_stage: AtomicBool::new(false),
            remaining: AtomicUsize::new(inputs.len()),
            done: AtomicBool::new(false),
            buckets: DashMap::new(),
            output: DashMap::new(),
        };
        this.init_map(inputs);
        Ok(this)
    }

    fn init_map(&self, inputs: Vec<Input>) {
        if inputs.is_empty() {
            self.init_reduce();
            return;
        }
        for (i, input) in inputs.into_iter().enumerate() {
            self.push(TaskInner::Map(MapTask {
                index: i as u64,
                input: Arc::new(input),
            }));
        }
    }

    fn init_reduce(&self) {
        assert!(self.pending_tasks.is_empty() && self.running_tasks.is_empty());
        self.reduce_stage.store(true, Ordering::Release);

        let indices = self.buckets.iter().map(|pair| *pair.key()).sorted().collect_vec();
        info!(reduce_tasks = indices.len(), "map done, init reduce");
        // set before any reduce task can complete
        self.remaining.store(indices.len(), Ordering::Release);
        if indices.is_empty() {
            self.done.store(true, Ordering::Release);
            return;
        }
        for index in indices {
            self.push(TaskInner::Reduce(ReduceTask { index }));
        }
    }

    fn push(&self, inner: TaskInner) {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            inner,
        };
        if let Err(task) = self.pending_tasks.push(task) {
            // capacity covers every task of either stage
            unreachable!("task queue full: {:?}", task);
        }
    }

    fn reduce_stage(&self) -> bool {
        self.reduce_stage.load(Ordering::Acquire)
    }
}

impl Coordinator {
    pub fn poll_task(&self) -> Poll {
        if self.done.load(Ordering::Acquire) {
            return Poll::Shutdown;
        }
        match self.pending_tasks.pop() {
            Some(task) => {
                debug_assert!(self.reduce_stage() ^ matches!(task.inner, TaskInner::Map(_)));
                self.running_tasks.insert(task.id.clone(), task.clone());
                Poll::Task(task)
            }
            None => Poll::Wait,
        }
    }

    /// Runs the task body. Blocking: call it off the async executor.
    pub fn execute(&self, task: &Task) -> anyhow::Result<()> {
        match &task.inner {
            TaskInner::Map(map) => self.do_map(map),
            TaskInner::Reduce(reduce) => self.do_reduce(reduce),
        }
    }

    fn do_map(&self, task: &MapTask) -> anyhow::Result<()> {
        let kvs = self.app.map(&task.input.name, &task.input.contents);
        let emitted = kvs.len();
        let kvs = self.app.combine(kvs);
        debug!(
            index = task.index,
            input = %task.input.name,
            emitted,
            combined = kvs.len(),
            "map task"
        );

        let mut scattered: HashMap<u64, Vec<KeyValue>> = HashMap::new();
        for kv in kvs {
            let bucket = ihash(&kv.key) % self.config.n_reduce;
            scattered.entry(bucket).or_default().push(kv);
        }
        for (bucket, kvs) in scattered {
            self.buckets.entry(bucket).or_default().extend(kvs);
        }
        Ok(())
    }

    fn do_reduce(&self, task: &ReduceTask) -> anyhow::Result<()> {
        let kvs = self
            .buckets
            .remove(&task.index)
            .map(|(_, kvs)| kvs)
            .unwrap_or_default();
        let records = group(kvs)
            .into_iter()
            .map(|(key, values)| {
                let value = self.app.reduce(&key, values);
                KeyValue { key, value }
            })
            .collect_vec();
        debug!(index = task.index, keys = records.len(), "reduce task");

        if let Some(dir) = &self.config.output_dir {
            let path = output_file(dir, task.index);
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_records(BufWriter::new(file), &records)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        self.output.insert(task.index, records);
        Ok(())
    }

    pub fn complete_task(&self, task: &Task) {
        if self.running_tasks.remove(&task.id).is_none() {
            warn!("completed task was not running: {:?}", task.id);
            return;
        }
        debug!(id = %task.id, "task done");

        // the last completion of a stage moves the job on, exactly once
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            if self.reduce_stage() {
                info!("reduce done");
                self.done.store(true, Ordering::Release);
            } else {
                self.init_reduce();
            }
        }
    }

    /// Stops handing out work; workers shut down at their next poll.
    pub fn abort(&self) {
        if !self.done.swap(true, Ordering::AcqRel) {
            warn!("job aborted");
        }
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Reduce output of every bucket, sorted by key.
    pub fn take_output(&self) -> Vec<KeyValue> {
        let indices = self.output.iter().map(|pair| *pair.key()).collect_vec();
        indices
            .into_iter()
            .filter_map(|index| self.output.remove(&index))
            .flat_map(|(_, records)| records)
            .sorted()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequential::apps;

    fn coordinator(inputs: Vec<Input>, n_reduce: u64) -> Coordinator {
        let config = Config {
            n_reduce,
            ..Config::default()
        };
        Coordinator::new(apps::load("unique_words").unwrap(), inputs, config).unwrap()
    }

    fn next(coordinator: &Coordinator) -> Task {
        match coordinator.poll_task() {
            Poll::Task(task) => task,
            other => panic!("expected a task, got {:?}", other),
        }
    }

    #[test]
    fn test_reduce_waits_for_every_map() {
        let c = coordinator(
            vec![Input::new("a", "Alice: one\n"), Input::new("b", "Bob: two\n")],
            2,
        );
        let first = next(&c);
        let second = next(&c);
        assert!(matches!(first.inner, TaskInner::Map(_)));
        assert!(matches!(second.inner, TaskInner::Map(_)));
        assert!(matches!(c.poll_task(), Poll::Wait));

        c.execute(&first).unwrap();
        c.complete_task(&first);
        // one map still running: no reduce work yet
        assert!(matches!(c.poll_task(), Poll::Wait));

        c.execute(&second).unwrap();
        c.complete_task(&second);
        let mut reduces = 0;
        while let Poll::Task(task) = c.poll_task() {
            assert!(matches!(task.inner, TaskInner::Reduce(_)));
            c.execute(&task).unwrap();
            c.complete_task(&task);
            reduces += 1;
        }
        assert!((1..=2).contains(&reduces));
        assert!(c.is_done());
        assert!(matches!(c.poll_task(), Poll::Shutdown));
        assert_eq!(
            c.take_output(),
            vec![KeyValue::new("Alice", "[one]"), KeyValue::new("Bob", "[two]")]
        );
    }

    #[test]
    fn test_duplicate_completion_is_ignored() {
        let c = coordinator(vec![Input::new("a", "Alice: one\n")], 1);
        let task = next(&c);
        c.execute(&task).unwrap();
        c.complete_task(&task);
        c.complete_task(&task);
        let reduce = next(&c);
        assert!(matches!(reduce.inner, TaskInner::Reduce(ReduceTask { index: 0 })));
        assert!(!c.is_done());
    }

    #[test]
    fn test_empty_job_is_done_immediately() {
        let c = coordinator(vec![], 4);
        assert!(c.is_done());
        assert!(matches!(c.poll_task(), Poll::Shutdown));
        assert!(c.take_output().is_empty());
    }

    #[test]
    fn test_zero_buckets_rejected() {
        let config = Config {
            n_reduce: 0,
            ..Config::default()
        };
        let app = apps::load("unique_words").unwrap();
        let inputs = vec![Input::new("a", "Alice: one\n")];
        let err = Coordinator::new(app, inputs, config).unwrap_err();
        assert!(err.to_string().contains("reduce bucket"));
    }

    #[test]
    fn test_abort_stops_polling() {
        let c = coordinator(vec![Input::new("a", "Alice: one\n")], 1);
        c.abort();
        assert!(matches!(c.poll_task(), Poll::Shutdown));
    }
}

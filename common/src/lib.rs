use itertools::Itertools;
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    io::Write,
    ops::Deref,
    sync::Arc,
};

mod input;
mod logger;

pub use input::{Input, STDIN};
pub use logger::init_logger;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A map/reduce application.
///
/// `map` runs once per input partition and `reduce` once per distinct key,
/// after every partition has been mapped.
pub trait Application: Send + Sync {
    fn name(&self) -> &str;

    fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue>;

    /// Partition-local pass over one map task's output before it is
    /// scattered to reducers. Must not change what `reduce` produces.
    fn combine(&self, kvs: Vec<KeyValue>) -> Vec<KeyValue> {
        kvs
    }

    fn reduce(&self, key: &str, values: Vec<String>) -> String;
}

#[derive(Clone)]
pub struct App {
    pub app_name: String,
    inner: Arc<dyn Application>,
}

impl App {
    pub fn new(app: impl Application + 'static) -> Self {
        Self {
            app_name: app.name().to_string(),
            inner: Arc::new(app),
        }
    }
}

impl Deref for App {
    type Target = dyn Application;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").field("app_name", &self.app_name).finish()
    }
}

/// Sorts `kvs` and collects the values of each key, keys ascending.
pub fn group(mut kvs: Vec<KeyValue>) -> Vec<(String, Vec<String>)> {
    kvs.sort();
    let groups = kvs.into_iter().group_by(|kv| kv.key.clone());
    let grouped = groups
        .into_iter()
        .map(|(key, kvs)| (key, kvs.map(|kv| kv.value).collect_vec()))
        .collect_vec();
    grouped
}

/// Reducer bucket hash. Only stable within one build, which is all the
/// in-process bucketing needs; never persist it.
pub fn ihash(key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Writes one `key<TAB>value` line per record.
pub fn write_records<W: Write>(mut writer: W, records: &[KeyValue]) -> anyhow::Result<()> {
    for KeyValue { key, value } in records {
        writeln!(writer, "{}\t{}", key, value)?;
    }
    writer.flush()?;
    Ok(())
}

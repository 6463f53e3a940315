//! Single-threaded reference runner: map everything, group, reduce.

use common::{group, App, Input, KeyValue};
use itertools::Itertools;
use tracing::{debug, info};

pub mod apps;

/// Maps every input, then reduces every key once all map output is in.
/// Output is sorted by key.
pub fn run(app: &App, inputs: &[Input]) -> Vec<KeyValue> {
    let intermediate = inputs
        .iter()
        .flat_map(|input| {
            let kvs = app.map(&input.name, &input.contents);
            debug!(input = %input.name, pairs = kvs.len(), "mapped");
            kvs
        })
        .collect_vec();
    info!(app = %app.app_name, pairs = intermediate.len(), "map done");

    let output = group(intermediate)
        .into_iter()
        .map(|(key, values)| {
            let value = app.reduce(&key, values);
            KeyValue { key, value }
        })
        .collect_vec();
    info!(app = %app.app_name, keys = output.len(), "reduce done");
    output
}

use std::path::Path;
use time::{macros::format_description, UtcOffset};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::OffsetTime},
    prelude::*,
    EnvFilter,
};

/// Logs to stderr, filtered by `RUST_LOG` (default `info`). With `log_dir`,
/// also logs to a daily file `<log_dir>/<prefix>.<date>`; keep the returned
/// guard alive until exit so buffered lines get flushed.
pub fn init_logger(log_dir: Option<&Path>, prefix: &str) -> Option<WorkerGuard> {
    // the local offset is unavailable once other threads are running
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"),
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, prefix));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_timer(timer.clone())
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = fmt::layer()
        .with_timer(timer)
        .with_writer(std::io::stderr);

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    guard
}

use anyhow::Context;
use clap::Parser;
use common::{init_logger, write_records, Input};
use parallel::Config;
use sequential::apps;
use std::{io, path::PathBuf, time::Duration};

#[derive(Parser, Debug)]
pub struct Cli {
    #[arg(short, long, default_value = apps::DEFAULT_APP)]
    app_name: String,
    /// Worker count [default: available parallelism]
    #[arg(short, long)]
    workers: Option<usize>,
    #[arg(short, long, default_value_t = 10)]
    n_reduce: u64,
    /// Split inputs into map tasks of this many lines, 0 keeps files whole
    #[arg(short, long, default_value_t = 0)]
    lines_per_task: usize,
    #[arg(long, default_value_t = 10)]
    poll_interval_ms: u64,
    /// Directory for mr-out-<n> files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
    /// Print the merged, sorted output to stdout as well
    #[arg(long)]
    print: bool,
    /// Also log to a daily file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Script files, `-` for stdin
    #[arg(required = true)]
    input_files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logger(cli.log_dir.as_deref(), "parallel");

    let app = apps::load(&cli.app_name)?;
    let inputs = cli
        .input_files
        .iter()
        .map(|path| Input::read(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let workers = match cli.workers {
        Some(workers) => workers,
        None => std::thread::available_parallelism()
            .context("cannot determine worker count, pass --workers")?
            .get(),
    };
    let config = Config {
        workers,
        n_reduce: cli.n_reduce,
        lines_per_task: cli.lines_per_task,
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        output_dir: Some(cli.output_dir),
    };

    let output = parallel::run(app, inputs, config).await?;
    if cli.print {
        write_records(io::stdout().lock(), &output)?;
    }
    Ok(())
}

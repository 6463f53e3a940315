use anyhow::Context;
use clap::Parser;
use common::{init_logger, write_records, Input};
use sequential::apps;
use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};
use tracing::info;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(short, long, default_value = apps::DEFAULT_APP)]
    app_name: String,
    /// Output file, `-` for stdout [default: mr-<app>-seq]
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Script files, `-` or none for stdin
    input_files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logger(None, "sequential");
    let app = apps::load(&cli.app_name)?;

    let inputs = if cli.input_files.is_empty() {
        vec![Input::read(Path::new(common::STDIN))?]
    } else {
        cli.input_files
            .iter()
            .map(|path| Input::read(path))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let output = sequential::run(&app, &inputs);

    let path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(format!("mr-{}-seq", app.app_name)));
    if path.as_os_str() == common::STDIN {
        write_records(io::stdout().lock(), &output)?;
    } else {
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_records(BufWriter::new(file), &output)?;
        info!(output = %path.display(), records = output.len(), "written");
    }
    Ok(())
}

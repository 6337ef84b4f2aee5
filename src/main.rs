mod cli;
mod discovery;
mod error;
mod metadata;
mod naming;
mod output;
mod runner;

use std::io;

use crate::cli::Cli;
use crate::error::RenameError;
use crate::metadata::exiftool::ExifTool;
use crate::output::OutputFormat;
use crate::runner::run;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    if let Err(err) = real_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn real_main() -> Result<(), RenameError> {
    let cli = Cli::parse();
    let config = cli.config()?;
    let mut exiftool = ExifTool::new(config.exiftool.clone())?;

    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();
    let result = match config.output {
        OutputFormat::Text => run(&config, &mut exiftool, &mut input, &mut out)?,
        // stdout carries only the JSON document
        OutputFormat::Json => run(&config, &mut exiftool, &mut input, &mut io::stderr().lock())?,
    };
    output::print_summary(config.output, &result, config.verbosity, &mut out)?;
    Ok(())
}

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use globset::GlobBuilder;

use crate::error::{RenameError, Result};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "rename-videos",
    version,
    about = "Rename video files after their embedded title metadata"
)]
pub struct Cli {
    /// Directory with videos or '.' by default.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Print some extra information. (-v -vv -vvv) is supported.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Glob to search videos, relative to the directory.
    #[arg(long, default_value = "**/*.mp4")]
    pub glob: String,

    /// Confirm each rename operation.
    #[arg(short, long)]
    pub interactive: bool,

    /// Print the information but do not rename anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Command used to run exiftool, e.g. "perl /opt/exiftool/exiftool".
    #[arg(long, default_value = "exiftool")]
    pub exiftool: String,

    #[arg(long, default_value = "text")]
    pub output: String,
}

/// Settings for one run, threaded through every stage.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub glob: String,
    pub verbosity: u8,
    pub interactive: bool,
    pub dry_run: bool,
    pub exiftool: Vec<String>,
    pub output: OutputFormat,
}

impl Cli {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.glob.trim().is_empty() {
            return Err("glob must not be empty".to_string());
        }

        if let Err(err) = GlobBuilder::new(&self.glob).build() {
            return Err(format!("glob '{}' is invalid: {err}", self.glob));
        }

        let argv = shell_words::split(&self.exiftool)
            .map_err(|err| format!("exiftool command is malformed: {err}"))?;
        if argv.is_empty() {
            return Err("exiftool command is required".to_string());
        }

        self.output.parse::<OutputFormat>()?;

        Ok(())
    }

    pub fn config(&self) -> Result<Config> {
        self.validate().map_err(RenameError::InvalidArg)?;

        let exiftool = shell_words::split(&self.exiftool)
            .map_err(|err| RenameError::InvalidArg(err.to_string()))?;
        let output = self
            .output
            .parse::<OutputFormat>()
            .map_err(RenameError::InvalidArg)?;

        Ok(Config {
            root: self.path.clone(),
            glob: self.glob.clone(),
            verbosity: self.verbose,
            interactive: self.interactive,
            dry_run: self.dry_run,
            exiftool,
            output,
        })
    }
}

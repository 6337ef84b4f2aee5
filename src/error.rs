use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenameError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid glob: {0}")]
    Glob(#[from] globset::Error),

    #[error("Invalid argument: {0}")]
    InvalidArg(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Unexpected - can't rename '{}' to nothing - stop here rather than eat your data", .0.display())]
    InvalidState(PathBuf),

    #[error("Refusing to rename '{}': '{}' already exists", .from.display(), .to.display())]
    TargetExists { from: PathBuf, to: PathBuf },

    #[error("Input closed while waiting for an answer")]
    PromptClosed,

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RenameError>;

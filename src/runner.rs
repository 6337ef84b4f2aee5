use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::cli::Config;
use crate::discovery::find_videos;
use crate::error::{RenameError, Result};
use crate::metadata::{MetadataSource, display_value, fetch_metadata};
use crate::naming::{Candidate, derive_candidates};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    SkippedNoTitle,
    AlreadyRenamed,
    Renamed,
    /// Would have been renamed, but dry-run is on.
    Planned,
    Declined,
}

#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    pub action: Action,
}

#[derive(Debug)]
pub struct RunResult {
    pub dry_run: bool,
    pub outcomes: Vec<Outcome>,
}

impl RunResult {
    pub fn count(&self, action: Action) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }
}

pub fn run(
    config: &Config,
    source: &mut dyn MetadataSource,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<RunResult> {
    if config.verbosity > 0 {
        writeln!(out, "Using dir {}", config.root.display())?;
    }

    let videos = find_videos(&config.root, &config.glob)?;
    if config.verbosity > 2 {
        writeln!(out, "Found videos: {}", quoted_list(&videos))?;
    }

    let records = fetch_metadata(source, &videos)?;
    let candidates = derive_candidates(records, config.verbosity, out)?;

    let mut outcomes = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        let action = process_candidate(config, candidate, input, out)?;
        outcomes.push(Outcome {
            source: candidate.source.clone(),
            target: candidate.target.clone(),
            action,
        });
    }

    Ok(RunResult {
        dry_run: config.dry_run,
        outcomes,
    })
}

pub fn process_candidate(
    config: &Config,
    candidate: &Candidate,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<Action> {
    let source = &candidate.source;
    match (&candidate.title, &candidate.target) {
        (None, _) => {
            if config.verbosity > 1 {
                writeln!(out, "Skipping '{}' (no title)", source.display())?;
                if config.verbosity > 2 {
                    for (key, value) in candidate.metadata.fields() {
                        writeln!(out, "{key:>60} : {}", display_value(value))?;
                    }
                }
            }
            Ok(Action::SkippedNoTitle)
        }
        (Some(_), Some(target)) if target == source => {
            if config.verbosity > 1 {
                writeln!(out, "Skipping '{}' (already renamed)", source.display())?;
            }
            Ok(Action::AlreadyRenamed)
        }
        (Some(_), Some(target)) => {
            let confirmed = if config.interactive {
                confirm(source, target, input, out)?
            } else {
                writeln!(out, "{:>60} -> {}", source.display(), target.display())?;
                true
            };

            if !confirmed {
                return Ok(Action::Declined);
            }
            if config.dry_run {
                return Ok(Action::Planned);
            }
            rename(source, target)?;
            Ok(Action::Renamed)
        }
        (Some(_), None) => Err(RenameError::InvalidState(source.clone())),
    }
}

/// Asks until the answer is `y` or `n`.
fn confirm(
    source: &Path,
    target: &Path,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<bool> {
    let mut line = String::new();
    loop {
        write!(
            out,
            "Rename '{}' to '{}'? [Yn]:",
            source.display(),
            target.display()
        )?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(RenameError::PromptClosed);
        }
        match line.trim_end_matches(['\r', '\n']).to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => continue,
        }
    }
}

fn quoted_list(paths: &[PathBuf]) -> String {
    let items: Vec<String> = paths.iter().map(|p| format!("'{}'", p.display())).collect();
    format!("[{}]", items.join(", "))
}

/// True when both paths resolve to the same file, e.g. a case-only rename on
/// a case-insensitive filesystem.
fn same_file(a: &Path, b: &Path) -> std::io::Result<bool> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let (a, b) = (fs::metadata(a)?, fs::metadata(b)?);
        Ok(a.dev() == b.dev() && a.ino() == b.ino())
    }
    #[cfg(not(unix))]
    {
        Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
    }
}

fn rename(source: &Path, target: &Path) -> Result<()> {
    // fs::rename silently replaces an existing target on unix.
    if target.exists() && !same_file(source, target)? {
        return Err(RenameError::TargetExists {
            from: source.to_path_buf(),
            to: target.to_path_buf(),
        });
    }
    fs::rename(source, target)?;
    info!(from = %source.display(), to = %target.display(), "renamed");
    Ok(())
}

use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Result;
use crate::runner::{Action, Outcome, RunResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown output format: {other}")),
        }
    }
}

pub fn print_summary(
    format: OutputFormat,
    result: &RunResult,
    verbosity: u8,
    out: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result, verbosity, out),
        OutputFormat::Json => print_json(result, out),
    }
}

fn print_text(result: &RunResult, verbosity: u8, out: &mut dyn Write) -> Result<()> {
    if verbosity == 0 {
        return Ok(());
    }
    writeln!(
        out,
        "Renamed: {}, planned: {}, declined: {}, already renamed: {}, no title: {}",
        result.count(Action::Renamed),
        result.count(Action::Planned),
        result.count(Action::Declined),
        result.count(Action::AlreadyRenamed),
        result.count(Action::SkippedNoTitle),
    )?;
    Ok(())
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    dry_run: bool,
    renamed: usize,
    planned: usize,
    declined: usize,
    already_renamed: usize,
    no_title: usize,
    files: &'a [Outcome],
}

fn print_json(result: &RunResult, out: &mut dyn Write) -> Result<()> {
    let summary = JsonSummary {
        dry_run: result.dry_run,
        renamed: result.count(Action::Renamed),
        planned: result.count(Action::Planned),
        declined: result.count(Action::Declined),
        already_renamed: result.count(Action::AlreadyRenamed),
        no_title: result.count(Action::SkippedNoTitle),
        files: &result.outcomes,
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    Ok(())
}

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::metadata::MetadataRecord;

/// Maps one title character to its filename replacement, or `None` to drop it.
fn replacement(ch: char) -> Option<char> {
    match ch {
        '?' | ':' | '&' | '!' => Some('_'),
        '"' | '\u{201C}' | '\u{201D}' => None,
        other => Some(other),
    }
}

pub fn sanitize_title(title: &str) -> String {
    title.chars().filter_map(replacement).collect()
}

/// A discovered file, its metadata and the name it should get.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub source: PathBuf,
    pub metadata: MetadataRecord,
    pub title: Option<String>,
    pub target: Option<PathBuf>,
}

impl Candidate {
    pub fn from_record(record: MetadataRecord) -> Result<Self> {
        let source = record.source_file()?;
        let title = record.title();
        let target = title
            .as_deref()
            .map(|title| target_path(&source, &sanitize_title(title)));
        Ok(Self {
            source,
            metadata: record,
            title,
            target,
        })
    }
}

/// Same directory and extension as `source`, with `stem` as the file stem.
pub fn target_path(source: &Path, stem: &str) -> PathBuf {
    let file_name = match source.extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem.to_string(),
    };
    match source.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Builds one candidate per record, in record order.
pub fn derive_candidates(
    records: Vec<MetadataRecord>,
    verbosity: u8,
    out: &mut dyn Write,
) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::with_capacity(records.len());
    for record in records {
        let candidate = Candidate::from_record(record)?;
        if verbosity > 2 {
            if let Some(title) = &candidate.title {
                writeln!(out, "escTitle({title}) = '{}'", sanitize_title(title))?;
            }
        }
        candidates.push(candidate);
    }
    Ok(candidates)
}

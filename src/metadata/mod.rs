use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{RenameError, Result};

pub mod exiftool;
#[cfg(test)]
pub mod mock;

pub const SOURCE_FILE_KEY: &str = "SourceFile";
pub const TITLE_KEYS: [&str; 2] = ["QuickTime:Title", "Title"];

/// Batch metadata lookup: one record per input path, correlated by `SourceFile`.
pub trait MetadataSource {
    fn fetch(&mut self, paths: &[PathBuf]) -> Result<Vec<MetadataRecord>>;
}

/// Fetches metadata for `paths`, never invoking the source for an empty batch.
pub fn fetch_metadata(
    source: &mut dyn MetadataSource,
    paths: &[PathBuf],
) -> Result<Vec<MetadataRecord>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    source.fetch(paths)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    fields: Map<String, Value>,
}

impl MetadataRecord {
    pub fn source_file(&self) -> Result<PathBuf> {
        match self.fields.get(SOURCE_FILE_KEY) {
            Some(Value::String(path)) => Ok(PathBuf::from(path)),
            Some(other) => Err(RenameError::Metadata(format!(
                "{SOURCE_FILE_KEY} is not a string: {other}"
            ))),
            None => Err(RenameError::Metadata(format!(
                "record without {SOURCE_FILE_KEY}: {}",
                Value::Object(self.fields.clone())
            ))),
        }
    }

    pub fn set_source_file(&mut self, path: &std::path::Path) {
        self.fields.insert(
            SOURCE_FILE_KEY.to_string(),
            Value::String(path.to_string_lossy().into_owned()),
        );
    }

    pub fn title(&self) -> Option<String> {
        TITLE_KEYS
            .iter()
            .find_map(|key| self.fields.get(*key))
            .filter(|value| !value.is_null())
            .map(display_value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl fmt::Display for MetadataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source_file() {
            Ok(path) => write!(f, "{}", path.display()),
            Err(_) => write!(f, "<unknown source>"),
        }
    }
}

/// Strings print bare; everything else prints as JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn record_for(path: &std::path::Path, extra: &[(&str, Value)]) -> MetadataRecord {
    let mut fields = Map::new();
    fields.insert(
        SOURCE_FILE_KEY.to_string(),
        Value::String(path.to_string_lossy().into_owned()),
    );
    for (key, value) in extra {
        fields.insert((*key).to_string(), value.clone());
    }
    MetadataRecord { fields }
}

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::Result;
use crate::metadata::{MetadataRecord, MetadataSource, record_for};

/// Serves canned titles keyed by path and counts batch calls.
#[derive(Default)]
pub struct StaticMetadata {
    pub titles: HashMap<PathBuf, String>,
    pub calls: usize,
}

impl StaticMetadata {
    pub fn with_titles<I, P, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Self {
            titles: titles
                .into_iter()
                .map(|(path, title)| (path.into(), title.into()))
                .collect(),
            calls: 0,
        }
    }
}

impl MetadataSource for StaticMetadata {
    fn fetch(&mut self, paths: &[PathBuf]) -> Result<Vec<MetadataRecord>> {
        self.calls += 1;
        Ok(paths
            .iter()
            .map(|path| {
                let mut extra = vec![("File:FileType", Value::String("MP4".to_string()))];
                if let Some(title) = self.titles.get(path) {
                    extra.push(("QuickTime:Title", Value::String(title.clone())));
                }
                record_for(path, &extra)
            })
            .collect())
    }
}

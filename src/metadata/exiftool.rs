use std::collections::HashMap;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::error::{RenameError, Result};
use crate::metadata::{MetadataRecord, MetadataSource};

/// Runs exiftool once per batch; the file list goes through an argfile on
/// stdin (`-@ -`) so large directories do not hit the argument length limit.
pub struct ExifTool {
    argv: Vec<String>,
}

impl ExifTool {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        if argv.is_empty() {
            return Err(RenameError::InvalidArg(
                "exiftool command is required".to_string(),
            ));
        }
        Ok(Self { argv })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.argv[0]);
        cmd.args(&self.argv[1..]);
        cmd.args(["-json", "-G", "-@", "-"]);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

impl MetadataSource for ExifTool {
    fn fetch(&mut self, paths: &[PathBuf]) -> Result<Vec<MetadataRecord>> {
        debug!(
            command = %shell_words::join(&self.argv),
            files = paths.len(),
            "running exiftool"
        );

        let (argfile, requested) = build_argfile(paths)?;
        let mut child = self.command().spawn().map_err(|err| {
            RenameError::Metadata(format!(
                "failed to start '{}': {err}",
                shell_words::join(&self.argv)
            ))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(argfile.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            if output.stdout.iter().all(u8::is_ascii_whitespace) {
                return Err(RenameError::Metadata(format!(
                    "exiftool failed ({}): {}",
                    output.status,
                    stderr.trim()
                )));
            }
            // exiftool exits 1 when some files could not be read; the rest is still usable.
            warn!(status = %output.status, stderr = %stderr.trim(), "exiftool reported errors");
        }

        let records = restore_sources(parse_records(&output.stdout)?, requested)?;
        debug!(records = records.len(), "exiftool finished");
        for record in &records {
            debug!(source = %record, title = ?record.title(), "metadata record");
        }
        Ok(records)
    }
}

/// Argfile line for `path`. Bare relative names get a `./` prefix so a
/// leading `#` or `-` is not read as a comment or an option.
fn argfile_entry(path: &Path) -> Result<String> {
    let text = path.to_string_lossy();
    if text.contains(['\n', '\r']) {
        return Err(RenameError::Metadata(format!(
            "file name with a line break cannot be passed to exiftool: {text:?}"
        )));
    }
    match path.components().next() {
        Some(Component::Normal(_)) => Ok(format!("./{text}")),
        _ => Ok(text.into_owned()),
    }
}

/// Argfile text plus the map from each written line back to its path.
fn build_argfile(paths: &[PathBuf]) -> Result<(String, HashMap<String, PathBuf>)> {
    let mut argfile = String::from("--\n");
    let mut requested = HashMap::with_capacity(paths.len());
    for path in paths {
        let entry = argfile_entry(path)?;
        argfile.push_str(&entry);
        argfile.push('\n');
        requested.insert(entry, path.clone());
    }
    Ok((argfile, requested))
}

/// Points every record's `SourceFile` back at the discovered path.
fn restore_sources(
    records: Vec<MetadataRecord>,
    mut requested: HashMap<String, PathBuf>,
) -> Result<Vec<MetadataRecord>> {
    let mut restored = Vec::with_capacity(records.len());
    for mut record in records {
        let reported = record.source_file()?;
        let key = reported.to_string_lossy().into_owned();
        let Some(path) = requested.remove(&key) else {
            return Err(RenameError::Metadata(format!(
                "exiftool returned a file that was not requested: {key}"
            )));
        };
        record.set_source_file(&path);
        restored.push(record);
    }
    for path in requested.values() {
        warn!(file = %path.display(), "no metadata returned");
    }
    Ok(restored)
}

fn parse_records(stdout: &[u8]) -> Result<Vec<MetadataRecord>> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let records: Vec<MetadataRecord> = serde_json::from_slice(stdout)?;
    for record in &records {
        record.source_file()?;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{ExifTool, build_argfile, parse_records, restore_sources};

    #[test]
    fn parses_grouped_json() {
        let stdout = br#"[{
  "SourceFile": "clips/clip1.mp4",
  "ExifTool:ExifToolVersion": 12.76,
  "File:FileName": "clip1.mp4",
  "QuickTime:Title": "Birthday: Party!"
},
{
  "SourceFile": "clips/clip2.mp4",
  "File:FileName": "clip2.mp4"
}]"#;
        let records = parse_records(stdout).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_file().unwrap(), PathBuf::from("clips/clip1.mp4"));
        assert_eq!(records[0].title().as_deref(), Some("Birthday: Party!"));
        assert_eq!(records[1].title(), None);
    }

    #[test]
    fn rejects_records_without_source_file() {
        assert!(parse_records(br#"[{"QuickTime:Title": "x"}]"#).is_err());
        assert!(parse_records(b"not json").is_err());
        assert!(parse_records(b"\n").unwrap().is_empty());
    }

    #[test]
    fn argfile_ends_options_and_shields_odd_names() {
        let paths = vec![
            PathBuf::from("#1 Intro.mp4"),
            PathBuf::from("-Title=x.mp4"),
            PathBuf::from("sub/clip.mp4"),
            PathBuf::from("./already.mp4"),
            PathBuf::from("../up.mp4"),
            PathBuf::from("/abs/clip.mp4"),
        ];
        let (argfile, requested) = build_argfile(&paths).unwrap();
        assert_eq!(
            argfile,
            "--\n./#1 Intro.mp4\n./-Title=x.mp4\n./sub/clip.mp4\n./already.mp4\n../up.mp4\n/abs/clip.mp4\n"
        );
        assert_eq!(requested["./#1 Intro.mp4"], PathBuf::from("#1 Intro.mp4"));

        assert!(build_argfile(&[PathBuf::from("two\nlines.mp4")]).is_err());
    }

    #[test]
    fn records_are_mapped_back_to_discovered_paths() {
        let paths = vec![PathBuf::from("#1 Intro.mp4"), PathBuf::from("b.mp4")];
        let (_, requested) = build_argfile(&paths).unwrap();
        let records = parse_records(
            br#"[{"SourceFile": "./#1 Intro.mp4", "QuickTime:Title": "Intro"},
                 {"SourceFile": "./b.mp4"}]"#,
        )
        .unwrap();

        let restored = restore_sources(records, requested.clone()).unwrap();
        assert_eq!(restored[0].source_file().unwrap(), PathBuf::from("#1 Intro.mp4"));
        assert_eq!(restored[0].title().as_deref(), Some("Intro"));
        assert_eq!(restored[1].source_file().unwrap(), PathBuf::from("b.mp4"));

        let stray = parse_records(br#"[{"SourceFile": "./other.mp4"}]"#).unwrap();
        assert!(restore_sources(stray, requested).is_err());
    }

    #[test]
    fn requires_a_command() {
        assert!(ExifTool::new(Vec::new()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn missing_binary_is_a_metadata_error() {
        let mut tool = ExifTool::new(vec!["/nonexistent/exiftool-binary".to_string()]).unwrap();
        let err = crate::metadata::fetch_metadata(&mut tool, &[PathBuf::from("a.mp4")])
            .unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }
}

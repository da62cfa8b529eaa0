use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, FixedOffset};

use crate::foundation::error::{SnaptureError, SnaptureResult};

/// Destination for encoded strips.
pub trait ExportSink {
    /// Store `png` under `file_name` and report where it went.
    fn save(&mut self, file_name: &str, png: &[u8]) -> SnaptureResult<PathBuf>;
}

/// Writes strips into a directory, creating it on first use.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> SnaptureResult<PathBuf> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(SnaptureError::export(format!(
                "invalid export file name '{file_name}'"
            )));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, png).with_context(|| format!("write '{}'", path.display()))?;
        tracing::info!(path = %path.display(), bytes = png.len(), "strip written");
        Ok(path)
    }
}

/// Keeps every export in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
}

impl ExportSink for MemorySink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> SnaptureResult<PathBuf> {
        self.files.push((file_name.to_string(), png.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}

/// `<Brand>-strip-<epoch millis>.png`, with the brand reduced to file-safe characters.
pub fn suggested_file_name(brand: &str, now: &DateTime<FixedOffset>) -> String {
    let mut stem: String = brand
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if stem.trim_matches('-').is_empty() {
        stem = crate::config::DEFAULT_BRAND.to_string();
    }
    format!("{stem}-strip-{}.png", now.timestamp_millis())
}

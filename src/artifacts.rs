use crate::analysis::AnalysisRecord;
use crate::error::Result;
use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Timestamp layout used in artifact file names. Second resolution, sortable.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Content of a single artifact.
pub enum ArtifactContent<'a> {
    /// Written verbatim.
    Text(&'a str),
    /// Pretty-printed JSON with non-ASCII characters preserved literally.
    Record(&'a AnalysisRecord),
}

/// Writes timestamped artifact files into a target directory.
///
/// File names are `{prefix}_{timestamp}.{ext}`. Two writes with the same
/// prefix inside the same wall-clock second collide; writes a second or more
/// apart never do. There is no overwrite check and no directory creation.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl Default for ArtifactWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactWriter {
    /// Writer targeting the current working directory.
    pub fn new() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }

    /// Writer targeting a specific directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Write one artifact and return the file name written.
    pub fn write(&self, prefix: &str, ext: &str, content: ArtifactContent<'_>) -> Result<String> {
        let file_name = file_name_for(prefix, ext, &Local::now());
        let path = self.dir.join(&file_name);

        match content {
            ArtifactContent::Text(text) => fs::write(&path, text)?,
            ArtifactContent::Record(record) => {
                let json = serde_json::to_string_pretty(record)?;
                fs::write(&path, json)?;
            }
        }

        debug!("Wrote artifact {}", path.display());
        Ok(file_name)
    }
}

/// File name for an artifact stamped at the given instant.
fn file_name_for(prefix: &str, ext: &str, stamp: &DateTime<Local>) -> String {
    format!("{}_{}.{}", prefix, stamp.format(TIMESTAMP_FORMAT), ext)
}

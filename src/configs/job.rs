use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// A single model to convert: its identifier and the container to read.
///
/// The identifier names the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelJob {
    pub id: String,
    pub source: PathBuf,
}

impl ModelJob {
    pub fn new(id: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
        }
    }

    /// The directory this job writes into.
    pub fn output_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.id)
    }
}

impl fmt::Display for ModelJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.source.display())
    }
}

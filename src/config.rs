use std::env;
use std::path::{Path, PathBuf};

use crate::code::UNKNOWN_PLACEHOLDER;

/// Environment variable that points the loader at another dataset directory.
pub const DATA_DIR_ENV: &str = "CHINA_DIVISION_DATA_DIR";

/// The datasets shipped with the crate.
const BUNDLED_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

/// Where the three division datasets live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub current_file: String,
    pub history_file: String,
    pub diff_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::with_dir(BUNDLED_DATA_DIR)
    }
}

impl DataConfig {
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            current_file: "data.json".to_string(),
            history_file: "history.json".to_string(),
            diff_file: "diff.json".to_string(),
        }
    }

    /// Bundled datasets unless `CHINA_DIVISION_DATA_DIR` is set.
    pub fn from_env() -> Self {
        match env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Self::with_dir(dir.trim()),
            _ => Self::default(),
        }
    }

    pub fn current_path(&self) -> PathBuf {
        self.data_dir.join(&self.current_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }

    pub fn diff_path(&self) -> PathBuf {
        self.data_dir.join(&self.diff_file)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Knobs for turning a code into an [`AddressResult`](division_types::AddressResult).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Fill a missing city tier with "市辖区" instead of an empty string.
    pub include_direct_units: bool,
    /// Text used for components that cannot be resolved.
    pub unknown: String,
    /// Skip the 18-character pattern check before extracting the code.
    pub skip_validation: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            include_direct_units: true,
            unknown: UNKNOWN_PLACEHOLDER.to_string(),
            skip_validation: false,
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "wirebench.ron";

/// Width and length of a single pin box, in pixels
const DEFAULT_CELL_PX: f32 = 8.0;

/// Editor settings, read from `wirebench.ron` next to the binary or from a
/// path given on the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Path of the topology document loaded at session start
    pub topology_path: PathBuf,
    /// Endpoint the serialized document is submitted to
    pub upload_url: String,
    /// Uniform cell size in pixels
    pub cell_px: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            topology_path: PathBuf::from("assets/sample_testbed.json"),
            upload_url: "http://localhost:8000/wire/configure/".to_owned(),
            cell_px: DEFAULT_CELL_PX,
        }
    }
}

impl EditorConfig {
    /// Load the configuration. A missing file yields the defaults; a file
    /// that exists but does not parse is an error, not a silent fallback.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(path.to_path_buf(), e)),
        };
        ron::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))
    }
}

/// Error when loading the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read config {0:?}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// The file is not valid ron
    #[error("cannot parse config {0:?}: {1}")]
    Parse(PathBuf, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_ron() {
        let config = EditorConfig {
            topology_path: PathBuf::from("bench.json"),
            upload_url: "http://grader.local/wire/".to_owned(),
            cell_px: 10.0,
        };
        let text = ron::to_string(&config).unwrap();
        let loaded: EditorConfig = ron::from_str(&text).unwrap();
        assert_eq!(loaded.topology_path, config.topology_path);
        assert_eq!(loaded.upload_url, config.upload_url);
        assert_eq!(loaded.cell_px, config.cell_px);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = EditorConfig::load(Path::new("/nonexistent/wirebench.ron")).unwrap();
        assert_eq!(config.cell_px, DEFAULT_CELL_PX);
    }
}

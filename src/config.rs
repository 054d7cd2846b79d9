//! Configuration for the sensor analyzer.
//!
//! The analyzer is built from an explicit configuration instead of
//! process-wide state, so the host decides where the calibration lives
//! and how much history it keeps.
//!
//! ```no_run
//! use tti_scan::AnalyzerConfig;
//! use std::path::Path;
//!
//! let config = AnalyzerConfig::from_json_file(Path::new("analyzer.json"))?;
//! # Ok::<(), tti_scan::AnalysisError>(())
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Metric;
use crate::constants::defaults;
use crate::{AnalysisError, Result};

/// Analyzer configuration.
///
/// Every field has a default, so a partial JSON file is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Path of the active calibration file
    #[serde(default = "default_calibration_path")]
    pub calibration_path: PathBuf,

    /// Maximum number of entries kept in the analysis history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Metric used to pick the status
    #[serde(default)]
    pub metric: Metric,
}

fn default_calibration_path() -> PathBuf {
    PathBuf::from(defaults::CALIBRATION_PATH)
}

fn default_history_limit() -> usize {
    defaults::HISTORY_LIMIT
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            calibration_path: default_calibration_path(),
            history_limit: default_history_limit(),
            metric: Metric::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Default configuration with a specific calibration file
    pub fn with_calibration_path(path: impl Into<PathBuf>) -> Self {
        Self {
            calibration_path: path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::config(format!("Failed to read {}", path.display()), e)
        })?;
        serde_json::from_str(&content).map_err(|e| {
            AnalysisError::config(format!("Failed to parse {}", path.display()), e)
        })
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            AnalysisError::config(format!("Failed to write {}", path.display()), e)
        })
    }
}

//! Calibration documents and the persisted active calibration
//!
//! A calibration is a JSON document with a required `colors` map and
//! optional metadata. Unknown top-level keys are carried through a
//! load/save cycle unchanged. Saving replaces the whole file; there is
//! no versioning or merging.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use super::reference::{default_reference_colors, ReferenceTable};
use crate::constants::defaults::WEB_CALIBRATION_SOURCE;
use crate::{AnalysisError, Result};

const DEFAULT_NAME: &str = "Default MilkFresh Calibration";
const DEFAULT_SENSOR_TYPE: &str = "Dr. Talbots MilkFresh / Evigence FreshSense";
const DEFAULT_NOTES: &str = "Default calibration based on Green-Light Green-Brown-Red color scheme";

/// A named set of reference colors plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Creation time, RFC 3339 when written by this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Where the calibration came from, e.g. "web_calibration"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub colors: ReferenceTable,

    /// Any other top-level keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Calibration {
    /// Calibration with only a color table
    pub fn new(colors: ReferenceTable) -> Self {
        Self {
            name: None,
            created: None,
            sensor_type: None,
            notes: None,
            source: None,
            colors,
            extra: Map::new(),
        }
    }

    /// Reject calibrations that cannot drive classification
    pub fn validate(&self) -> Result<()> {
        if self.colors.is_empty() {
            return Err(AnalysisError::invalid_calibration("colors must not be empty"));
        }
        Ok(())
    }

    /// Parse an uploaded calibration document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let calibration: Self = serde_json::from_str(content)
            .map_err(|e| AnalysisError::invalid_calibration(e.to_string()))?;
        calibration.validate()?;
        Ok(calibration)
    }

    /// Build a calibration from a form submission
    ///
    /// The payload must carry a `colors` object. `created` is set to now and
    /// `source` to "web_calibration", overriding any submitted values.
    pub fn from_submission(payload: Value) -> Result<Self> {
        let has_colors = payload
            .as_object()
            .is_some_and(|object| object.contains_key("colors"));
        if !has_colors {
            return Err(AnalysisError::invalid_calibration("missing colors"));
        }

        let mut calibration: Self = serde_json::from_value(payload)
            .map_err(|e| AnalysisError::invalid_calibration(e.to_string()))?;
        calibration.created = Some(Local::now().to_rfc3339());
        calibration.source = Some(WEB_CALIBRATION_SOURCE.to_string());
        calibration.validate()?;
        Ok(calibration)
    }
}

/// Default calibration wrapping the built-in color table
pub fn build_default_calibration() -> Calibration {
    Calibration {
        name: Some(DEFAULT_NAME.to_string()),
        created: Some(Local::now().to_rfc3339()),
        sensor_type: Some(DEFAULT_SENSOR_TYPE.to_string()),
        notes: Some(DEFAULT_NOTES.to_string()),
        ..Calibration::new(default_reference_colors())
    }
}

/// Read and validate a calibration file
pub fn read_calibration_file(path: &Path) -> Result<Calibration> {
    let content = fs::read_to_string(path).map_err(|source| AnalysisError::CalibrationIo {
        path: path.to_path_buf(),
        source,
    })?;
    let calibration: Calibration =
        serde_json::from_str(&content).map_err(|source| AnalysisError::CalibrationParse {
            path: path.to_path_buf(),
            source,
        })?;
    calibration.validate()?;
    Ok(calibration)
}

/// Write a calibration so readers see either the old or the new file
///
/// Each call writes its own uniquely named temp file in the target
/// directory and renames it over `path`.
pub fn write_calibration_file(path: &Path, calibration: &Calibration) -> Result<()> {
    let io_error = |source| AnalysisError::CalibrationIo {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(calibration).map_err(|source| {
        AnalysisError::CalibrationParse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(io_error)?;
            parent
        }
        None => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(io_error)?;
    tmp.write_all(json.as_bytes()).map_err(io_error)?;
    tmp.as_file().sync_all().map_err(io_error)?;
    tmp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

/// Holds the single active calibration and its backing file
pub struct CalibrationStore {
    path: PathBuf,
    active: RwLock<Option<Calibration>>,
}

impl CalibrationStore {
    /// Create a store for `path` and load it if the file exists
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = Self {
            path: path.into(),
            active: RwLock::new(None),
        };
        store.load();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload the calibration file
    ///
    /// Returns `None` if the file is missing or malformed; the previously
    /// active calibration is kept in that case.
    pub fn load(&self) -> Option<Calibration> {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);

        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No calibration file");
            return None;
        }

        match read_calibration_file(&self.path) {
            Ok(calibration) => {
                tracing::info!(
                    path = %self.path.display(),
                    colors = calibration.colors.len(),
                    "Loaded calibration"
                );
                *active = Some(calibration.clone());
                Some(calibration)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to load calibration");
                None
            }
        }
    }

    /// Persist `calibration` and make it active
    ///
    /// The write lock is held across the file write and the swap, so the
    /// file on disk always matches the active calibration. On failure
    /// nothing changes in memory.
    pub fn save(&self, calibration: Calibration) -> Result<()> {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);

        let result = calibration
            .validate()
            .and_then(|()| write_calibration_file(&self.path, &calibration));

        match result {
            Ok(()) => {
                tracing::info!(
                    path = %self.path.display(),
                    colors = calibration.colors.len(),
                    "Saved calibration"
                );
                *active = Some(calibration);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to save calibration");
                Err(e)
            }
        }
    }

    pub fn has_calibration(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Copy of the active calibration, if any
    pub fn active(&self) -> Option<Calibration> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Colors of the active calibration, or the built-in defaults
    pub fn active_reference_colors(&self) -> ReferenceTable {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|calibration| calibration.colors.clone())
            .unwrap_or_else(default_reference_colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{ReferenceColor, StatusLevel};
    use crate::color::RgbColor;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CalibrationStore {
        CalibrationStore::open(dir.path().join("calibration.json"))
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.has_calibration());
        assert!(store.load().is_none());
        assert_eq!(store.active_reference_colors(), default_reference_colors());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let calibration = build_default_calibration();

        store.save(calibration.clone()).unwrap();
        assert!(store.has_calibration());

        let reopened = store_in(&dir);
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded.colors, calibration.colors);
        assert_eq!(loaded.name.as_deref(), Some(DEFAULT_NAME));
        assert!(!dir.path().join("calibration.json.tmp").exists());
    }

    #[test]
    fn test_malformed_file_is_absent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("calibration.json"), "{ not json").unwrap();

        let store = store_in(&dir);
        assert!(store.load().is_none());
        assert!(!store.has_calibration());
        assert_eq!(store.active_reference_colors().len(), 4);
    }

    #[test]
    fn test_failed_reload_keeps_active() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(build_default_calibration()).unwrap();

        fs::write(store.path(), "[]").unwrap();
        assert!(store.load().is_none());
        assert!(store.has_calibration());
    }

    #[test]
    fn test_save_rejects_empty_colors() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let result = store.save(Calibration::new(ReferenceTable::new()));
        assert!(matches!(result, Err(AnalysisError::InvalidCalibration { .. })));
        assert!(!store.has_calibration());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calibration.json");
        let document = json!({
            "name": "Batch 7",
            "lighting": "LED panel",
            "colors": {
                "fresh": {"rgb": [30, 130, 40], "name": "Green", "days": "30-40"},
                "expired": {"rgb": [170, 30, 30], "name": "Red", "days": "0"}
            }
        });
        fs::write(&path, document.to_string()).unwrap();

        let store = CalibrationStore::open(&path);
        let active = store.active().unwrap();
        assert_eq!(active.extra.get("lighting"), Some(&json!("LED panel")));
        assert_eq!(active.colors.len(), 2);

        store.save(active).unwrap();
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["lighting"], json!("LED panel"));
        assert_eq!(written["colors"]["fresh"]["rgb"], json!([30, 130, 40]));
    }

    #[test]
    fn test_non_canonical_key_rejected() {
        let document = r#"{"colors": {"stale": {"rgb": [1, 2, 3], "name": "x", "days": "1"}}}"#;
        assert!(matches!(
            Calibration::from_json_str(document),
            Err(AnalysisError::InvalidCalibration { .. })
        ));
    }

    #[test]
    fn test_from_submission_stamps_metadata() {
        let payload = json!({
            "name": "Fridge shelf",
            "source": "upload",
            "colors": {"good": {"rgb": [140, 230, 140], "name": "Light Green", "days": "15-30"}}
        });
        let calibration = Calibration::from_submission(payload).unwrap();
        assert_eq!(calibration.source.as_deref(), Some("web_calibration"));
        assert!(calibration.created.is_some());
        assert_eq!(
            calibration.colors.get(StatusLevel::Good),
            Some(&ReferenceColor::new(RgbColor::new(140, 230, 140), "Light Green", "15-30"))
        );
    }

    #[test]
    fn test_from_submission_missing_colors() {
        let err = Calibration::from_submission(json!({"name": "x"})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid calibration: missing colors");
    }

    #[test]
    fn test_default_calibration_metadata() {
        let calibration = build_default_calibration();
        assert_eq!(calibration.sensor_type.as_deref(), Some(DEFAULT_SENSOR_TYPE));
        assert!(calibration.notes.is_some());
        assert!(calibration.source.is_none());
        assert_eq!(calibration.colors, default_reference_colors());
    }

    #[test]
    fn test_concurrent_saves_keep_disk_and_memory_in_sync() {
        use std::sync::Arc;
        use std::thread;

        fn single_color(shade: u8) -> Calibration {
            let mut colors = ReferenceTable::new();
            colors.insert(
                StatusLevel::Fresh,
                ReferenceColor::new(RgbColor::new(shade, 139, 34), "Green", "30-40"),
            );
            Calibration::new(colors)
        }

        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));

        for round in 0..50u8 {
            let handles: Vec<_> = (0..4u8)
                .map(|worker| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || store.save(single_color(round.wrapping_mul(4) + worker)))
                })
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }

            let on_disk = read_calibration_file(store.path()).unwrap();
            assert_eq!(store.active().unwrap().colors, on_disk.colors, "round {}", round);
        }

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name != "calibration.json")
            .collect();
        assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
    }
}

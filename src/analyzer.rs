//! Freshness classification
//!
//! `TtiAnalyzer` is the service object a host constructs once: it owns the
//! calibration store and turns an image plus an optional region into an
//! `AnalysisResult`.
//!
//! Decision rule: the status whose reference color has the smallest
//! distance to the sampled color wins, with ties going to the entry that
//! comes first in the reference table. Confidence is
//! `(1 - min / max) * 100` over the same metric, or 100 when every
//! distance is zero.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::calibration::{
    Calibration, CalibrationStore, ReferenceTable, StatusLevel, StatusMap,
};
use crate::color::{sample_region, ColorDistances, Metric, Region, RgbColor};
use crate::config::AnalyzerConfig;
use crate::constants::{precision, round_to};
use crate::image_loader::load_image;
use crate::{AnalysisError, Result};

/// Distances from one sample to every reference color
pub type DistanceTable = StatusMap<ColorDistances>;

/// Sampled color with its hex representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleColor {
    pub rgb: RgbColor,
    pub hex: String,
}

impl From<RgbColor> for SampleColor {
    fn from(rgb: RgbColor) -> Self {
        Self {
            hex: rgb.to_hex(),
            rgb,
        }
    }
}

/// Color picked from an image region, used when building a calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledColor {
    pub color: SampleColor,
    pub region: Region,
}

/// Winning status and its display metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDecision {
    pub status: StatusLevel,
    pub label: String,
    /// Percentage, one decimal
    pub confidence: f64,
    pub days_remaining: String,
    pub status_color: String,
    /// Distance to the winning reference, two decimals
    pub distance: f64,
}

/// Complete result of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub timestamp: DateTime<Local>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,

    pub sample_color: SampleColor,

    /// Region as requested, or the centered default
    pub region: Region,

    pub analysis: StatusDecision,

    /// Rounded distances per status, in reference table order
    pub distances: DistanceTable,

    /// Whether a stored calibration (rather than the defaults) was used
    pub calibration_used: bool,
}

impl AnalysisResult {
    pub fn chosen_status(&self) -> StatusLevel {
        self.analysis.status
    }

    pub fn confidence(&self) -> f64 {
        self.analysis.confidence
    }
}

/// Failure reported in place of a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub error: String,
    pub timestamp: DateTime<Local>,
    pub image_path: Option<PathBuf>,
}

/// Either a result or a failure record, serialized without a tag
///
/// Callers check `is_error()` (or the `error` key in JSON) before reading
/// the result fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Success(Box<AnalysisResult>),
    Failure(AnalysisFailure),
}

impl AnalysisReport {
    pub fn from_result(result: Result<AnalysisResult>, image_path: Option<&Path>) -> Self {
        match result {
            Ok(result) => AnalysisReport::Success(Box::new(result)),
            Err(e) => AnalysisReport::Failure(AnalysisFailure {
                error: e.to_string(),
                timestamp: Local::now(),
                image_path: image_path.map(Path::to_path_buf),
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisReport::Failure(_))
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisReport::Success(result) => Some(&**result),
            AnalysisReport::Failure(_) => None,
        }
    }
}

/// Distances from `sample` to every color in `references`
pub fn compute_distances(sample: RgbColor, references: &ReferenceTable) -> DistanceTable {
    references
        .iter()
        .map(|(status, reference)| (status, ColorDistances::between(sample, reference.rgb)))
        .collect()
}

/// Pick the status with the smallest distance under `metric`
///
/// # Errors
///
/// Returns `EmptyReferenceTable` if `distances` has no entries
pub fn determine_status(distances: &DistanceTable, metric: Metric) -> Result<StatusDecision> {
    let mut entries = distances.iter().map(|(status, d)| (status, d.get(metric)));
    let (mut best_status, mut min_distance) =
        entries.next().ok_or(AnalysisError::EmptyReferenceTable)?;
    let mut max_distance = min_distance;

    for (status, distance) in entries {
        if distance < min_distance {
            min_distance = distance;
            best_status = status;
        }
        if distance > max_distance {
            max_distance = distance;
        }
    }

    let confidence = if max_distance > 0.0 {
        (1.0 - min_distance / max_distance) * 100.0
    } else {
        100.0
    };

    Ok(StatusDecision {
        status: best_status,
        label: best_status.label().to_string(),
        confidence: round_to(confidence, precision::CONFIDENCE_DECIMALS),
        days_remaining: best_status.days_remaining(),
        status_color: best_status.color().to_string(),
        distance: round_to(min_distance, precision::DISTANCE_DECIMALS),
    })
}

/// Sensor analyzer bound to one calibration file
pub struct TtiAnalyzer {
    store: CalibrationStore,
    metric: Metric,
}

impl TtiAnalyzer {
    /// Create an analyzer and load the configured calibration
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            store: CalibrationStore::open(&config.calibration_path),
            metric: config.metric,
        }
    }

    /// Analyzer with default settings for a calibration file
    pub fn open(calibration_path: impl Into<PathBuf>) -> Self {
        Self::new(&AnalyzerConfig::with_calibration_path(calibration_path))
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn calibration_store(&self) -> &CalibrationStore {
        &self.store
    }

    pub fn has_calibration(&self) -> bool {
        self.store.has_calibration()
    }

    pub fn load_calibration(&self) -> Option<Calibration> {
        self.store.load()
    }

    pub fn save_calibration(&self, calibration: Calibration) -> Result<()> {
        self.store.save(calibration)
    }

    /// Distances from `sample` to the active reference colors
    pub fn analyze_color(&self, sample: RgbColor) -> DistanceTable {
        compute_distances(sample, &self.store.active_reference_colors())
    }

    /// Classify a single color against the active reference colors
    pub fn classify_color(&self, sample: RgbColor) -> Result<StatusDecision> {
        determine_status(&self.analyze_color(sample), self.metric)
    }

    /// Mean color of a region, defaulting to the centered half-area region
    pub fn extract_color(&self, image: &RgbImage, region: Option<Region>) -> SampledColor {
        let region = region.unwrap_or_else(|| Region::centered(image.width(), image.height()));
        SampledColor {
            color: sample_region(image, region).into(),
            region,
        }
    }

    /// Analyze a decoded image
    ///
    /// A region with no pixels is not an error: the fallback gray is
    /// classified like any other sample.
    pub fn analyze(&self, image: &RgbImage, region: Option<Region>) -> Result<AnalysisResult> {
        let SampledColor { color, region } = self.extract_color(image, region);
        let distances = self.analyze_color(color.rgb);
        let decision = determine_status(&distances, self.metric)?;

        tracing::debug!(
            sample = %color.rgb,
            %region,
            status = %decision.status,
            confidence = decision.confidence,
            "Analyzed sensor region"
        );

        Ok(AnalysisResult {
            timestamp: Local::now(),
            image_path: None,
            sample_color: color,
            region,
            analysis: decision,
            distances: distances
                .iter()
                .map(|(status, d)| (status, d.rounded()))
                .collect(),
            calibration_used: self.store.has_calibration(),
        })
    }

    /// Load and analyze an image file
    pub fn analyze_image(&self, path: &Path, region: Option<Region>) -> Result<AnalysisResult> {
        let image = load_image(path)?;
        let mut result = self.analyze(&image, region)?;
        result.image_path = Some(path.to_path_buf());
        Ok(result)
    }

    /// Like `analyze_image`, but failures become a structured report
    pub fn analyze_image_report(&self, path: &Path, region: Option<Region>) -> AnalysisReport {
        let result = self.analyze_image(path, region);
        if let Err(e) = &result {
            tracing::warn!(path = %path.display(), error = %e, "Analysis failed");
        }
        AnalysisReport::from_result(result, Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{build_default_calibration, ReferenceColor};
    use image::Rgb;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn analyzer(dir: &TempDir) -> TtiAnalyzer {
        TtiAnalyzer::open(dir.path().join("calibration.json"))
    }

    fn uniform(color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(40, 40, Rgb(color))
    }

    #[test]
    fn test_exact_fresh_reference() {
        let dir = TempDir::new().unwrap();
        let result = analyzer(&dir).analyze(&uniform([34, 139, 34]), None).unwrap();

        assert_eq!(result.chosen_status(), StatusLevel::Fresh);
        assert_eq!(result.analysis.label, "FRESH");
        assert_eq!(result.analysis.days_remaining, "30-40");
        assert_eq!(result.analysis.status_color, "#22c55e");
        assert_eq!(result.confidence(), 100.0);
        assert_eq!(result.analysis.distance, 0.0);
        assert_eq!(result.sample_color.hex, "#228b22");
        assert_eq!(result.region, Region::new(10, 10, 20, 20));
        assert!(!result.calibration_used);
    }

    #[test]
    fn test_distance_table_rounded_and_ordered() {
        let dir = TempDir::new().unwrap();
        let result = analyzer(&dir).analyze(&uniform([34, 139, 34]), None).unwrap();

        let keys: Vec<_> = result.distances.keys().collect();
        assert_eq!(keys, StatusLevel::ALL.to_vec());

        let warning = result.distances.get(StatusLevel::Warning).unwrap();
        assert_eq!(warning.delta_e, 66.36);
        assert_eq!(warning.manhattan, 163.0);
        assert_eq!(warning.euclidean, 116.22);
    }

    #[test]
    fn test_zero_region_still_complete() {
        let dir = TempDir::new().unwrap();
        let result = analyzer(&dir)
            .analyze(&uniform([178, 34, 34]), Some(Region::new(0, 0, 0, 0)))
            .unwrap();

        assert_eq!(result.sample_color.rgb, RgbColor::new(128, 128, 128));
        assert_eq!(result.chosen_status(), StatusLevel::Warning);
        assert_eq!(result.confidence(), 42.7);
        assert_eq!(result.distances.len(), 4);
    }

    #[test]
    fn test_tie_goes_to_first_entry() {
        let mut distances = DistanceTable::new();
        let same = ColorDistances {
            euclidean: 5.0,
            manhattan: 5.0,
            delta_e: 5.0,
        };
        distances.insert(StatusLevel::Warning, same);
        distances.insert(StatusLevel::Good, same);

        let decision = determine_status(&distances, Metric::DeltaE).unwrap();
        assert_eq!(decision.status, StatusLevel::Warning);
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn test_all_zero_distances_full_confidence() {
        let zero = ColorDistances {
            euclidean: 0.0,
            manhattan: 0.0,
            delta_e: 0.0,
        };
        let distances: DistanceTable =
            [(StatusLevel::Good, zero), (StatusLevel::Fresh, zero)].into_iter().collect();

        let decision = determine_status(&distances, Metric::DeltaE).unwrap();
        assert_eq!(decision.status, StatusLevel::Good);
        assert_eq!(decision.confidence, 100.0);
    }

    #[test]
    fn test_empty_table_is_error() {
        let result = determine_status(&DistanceTable::new(), Metric::DeltaE);
        assert!(matches!(result, Err(AnalysisError::EmptyReferenceTable)));
    }

    #[test]
    fn test_metric_selection() {
        let table: DistanceTable = [
            (
                StatusLevel::Fresh,
                ColorDistances {
                    euclidean: 10.0,
                    manhattan: 30.0,
                    delta_e: 8.0,
                },
            ),
            (
                StatusLevel::Expired,
                ColorDistances {
                    euclidean: 20.0,
                    manhattan: 20.0,
                    delta_e: 4.0,
                },
            ),
        ]
        .into_iter()
        .collect();

        assert_eq!(determine_status(&table, Metric::Euclidean).unwrap().status, StatusLevel::Fresh);
        assert_eq!(determine_status(&table, Metric::Manhattan).unwrap().status, StatusLevel::Expired);
        let decision = determine_status(&table, Metric::DeltaE).unwrap();
        assert_eq!(decision.status, StatusLevel::Expired);
        assert_eq!(decision.confidence, 50.0);
        assert_eq!(decision.distance, 4.0);
    }

    #[test]
    fn test_custom_calibration_keys_drive_classification() {
        let dir = TempDir::new().unwrap();
        let analyzer = analyzer(&dir);
        let colors: ReferenceTable = [
            (
                StatusLevel::Good,
                ReferenceColor::new(RgbColor::new(120, 200, 120), "Pale", "15-30"),
            ),
            (
                StatusLevel::Expired,
                ReferenceColor::new(RgbColor::new(90, 20, 20), "Dark Red", "0"),
            ),
        ]
        .into_iter()
        .collect();
        analyzer.save_calibration(Calibration::new(colors)).unwrap();

        let result = analyzer.analyze(&uniform([34, 139, 34]), None).unwrap();
        assert_eq!(result.distances.len(), 2);
        assert_eq!(result.chosen_status(), StatusLevel::Good);
        assert!(result.calibration_used);
    }

    #[test]
    fn test_classify_color() {
        let dir = TempDir::new().unwrap();
        let analyzer = analyzer(&dir);
        analyzer.save_calibration(build_default_calibration()).unwrap();

        let decision = analyzer.classify_color(RgbColor::new(178, 34, 34)).unwrap();
        assert_eq!(decision.status, StatusLevel::Expired);
        assert_eq!(decision.days_remaining, "0-0");
    }

    #[test]
    fn test_extract_color_default_region() {
        let dir = TempDir::new().unwrap();
        let mut image = uniform([0, 0, 0]);
        for y in 10..30 {
            for x in 10..30 {
                image.put_pixel(x, y, Rgb([139, 90, 43]));
            }
        }
        let sampled = analyzer(&dir).extract_color(&image, None);
        assert_eq!(sampled.color.rgb, RgbColor::new(139, 90, 43));
        assert_eq!(sampled.color.hex, "#8b5a2b");
        assert_eq!(sampled.region, Region::new(10, 10, 20, 20));
    }

    #[test]
    fn test_report_for_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.png");
        let report = analyzer(&dir).analyze_image_report(&path, None);

        assert!(report.is_error());
        assert!(report.result().is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["error"].as_str().unwrap().contains("Failed to open image file"));
        assert_eq!(json["image_path"], serde_json::json!(path));
    }
}

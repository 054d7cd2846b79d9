//! # TTI Scan
//!
//! Freshness classification of time-temperature indicator (TTI) sensor
//! labels from photographs.
//!
//! The analyzer:
//! - Averages the color of a region of the photo (the image center by default)
//! - Measures Euclidean, Manhattan and CIE76 Delta E distances to the
//!   calibrated reference color of each freshness status
//! - Picks the closest status and reports a confidence score
//!
//! ## Example
//!
//! ```rust,no_run
//! use tti_scan::{AnalyzerConfig, Region, TtiAnalyzer};
//! use std::path::Path;
//!
//! let analyzer = TtiAnalyzer::new(&AnalyzerConfig::default());
//! let result = analyzer.analyze_image(Path::new("sensor.jpg"), Some(Region::new(120, 80, 40, 40)))?;
//! println!("{} ({}%)", result.analysis.label, result.analysis.confidence);
//! # Ok::<(), tti_scan::AnalysisError>(())
//! ```

pub mod analyzer;
pub mod calibration;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod image_loader;

pub use analyzer::{
    determine_status, AnalysisFailure, AnalysisReport, AnalysisResult, DistanceTable,
    SampleColor, SampledColor, StatusDecision, TtiAnalyzer,
};
pub use calibration::{
    build_default_calibration, Calibration, CalibrationStore, ReferenceColor, ReferenceTable,
    StatusLevel,
};
pub use color::{Metric, Region, RgbColor};
pub use config::AnalyzerConfig;
pub use error::{AnalysisError, Result};
pub use history::{AnalysisHistory, HistoryEntry};

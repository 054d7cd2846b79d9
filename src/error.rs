//! Error types for the tti_scan library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tti_scan operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error types for sensor analysis and calibration handling
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Image file could not be opened or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// File extension is not one of the accepted image formats
    #[error("Unsupported image format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Calibration file could not be read or written
    #[error("Calibration I/O error on {}: {source}", path.display())]
    CalibrationIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Calibration file is not valid JSON for the calibration schema
    #[error("Malformed calibration in {}: {source}", path.display())]
    CalibrationParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Calibration content was rejected
    #[error("Invalid calibration: {reason}")]
    InvalidCalibration { reason: String },

    /// Reference table has no entries to classify against
    #[error("Reference color table is empty")]
    EmptyReferenceTable,

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Analyzer configuration could not be loaded or saved
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AnalysisError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_calibration(reason: impl Into<String>) -> Self {
        Self::InvalidCalibration {
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Check if the caller can simply retry with different input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalysisError::ImageLoadError { .. }
                | AnalysisError::UnsupportedFormat { .. }
                | AnalysisError::InvalidCalibration { .. }
                | AnalysisError::InvalidParameter { .. }
        )
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::ImageLoadError { .. } => {
                "Could not load the image. Please check the file and try again.".to_string()
            }
            AnalysisError::UnsupportedFormat { .. } => {
                "Unsupported image format. Please upload PNG, JPEG, BMP, GIF or WebP.".to_string()
            }
            AnalysisError::InvalidCalibration { reason } => {
                format!("Calibration rejected: {}", reason)
            }
            AnalysisError::CalibrationIo { .. } | AnalysisError::CalibrationParse { .. } => {
                "Could not read or write the calibration file.".to_string()
            }
            _ => "Sensor analysis failed. Please try again.".to_string(),
        }
    }
}

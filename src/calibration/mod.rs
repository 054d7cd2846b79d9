//! Calibration module
//!
//! Holds the fixed freshness status table, the reference colors each
//! status is matched against, and the persisted active calibration.

pub mod reference;
pub mod status;
pub mod store;

pub use reference::{default_reference_colors, ReferenceColor, ReferenceTable};
pub use status::{StatusLevel, StatusMap};
pub use store::{build_default_calibration, Calibration, CalibrationStore};

//! Reference colors for each freshness status

use serde::{Deserialize, Serialize};

use super::status::{StatusLevel, StatusMap};
use crate::color::RgbColor;

/// Calibrated color of a sensor at one freshness status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceColor {
    pub rgb: RgbColor,

    /// Display name of the color, e.g. "Forest Green"
    #[serde(default)]
    pub name: String,

    /// Expected days range as free text, e.g. "30-40"
    #[serde(default)]
    pub days: String,
}

impl ReferenceColor {
    pub fn new(rgb: RgbColor, name: impl Into<String>, days: impl Into<String>) -> Self {
        Self {
            rgb,
            name: name.into(),
            days: days.into(),
        }
    }

    /// Name for display, falling back to the status key
    pub fn display_name(&self, status: StatusLevel) -> &str {
        if self.name.is_empty() {
            status.key()
        } else {
            &self.name
        }
    }
}

/// Reference colors keyed by status, in classification order
pub type ReferenceTable = StatusMap<ReferenceColor>;

/// Built-in Green / Light Green / Brown / Red scheme
pub fn default_reference_colors() -> ReferenceTable {
    [
        (
            StatusLevel::Fresh,
            ReferenceColor::new(RgbColor::new(34, 139, 34), "Forest Green", "30-40"),
        ),
        (
            StatusLevel::Good,
            ReferenceColor::new(RgbColor::new(144, 238, 144), "Light Green", "15-30"),
        ),
        (
            StatusLevel::Warning,
            ReferenceColor::new(RgbColor::new(139, 90, 43), "Brown", "5-15"),
        ),
        (
            StatusLevel::Expired,
            ReferenceColor::new(RgbColor::new(178, 34, 34), "Firebrick Red", "0"),
        ),
    ]
    .into_iter()
    .collect()
}

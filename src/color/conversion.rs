//! Color value type and color space conversion
//!
//! Provides:
//! - `RgbColor`, the 8-bit sRGB triple used throughout the crate
//! - sRGB to CIE Lab (D65) conversion
//! - Hex color representation

use std::fmt;
use std::str::FromStr;

use palette::white_point::D65;
use palette::Lab;
use serde::{Deserialize, Serialize};

use crate::constants::{d65, lab, srgb};
use crate::{AnalysisError, Result};

/// CIE Lab color under the D65 white point
pub type LabColor = Lab<D65, f64>;

/// 8-bit sRGB color, serialized as `[r, g, b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor(pub [u8; 3]);

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn channels(&self) -> [u8; 3] {
        self.0
    }

    /// Lowercase `#rrggbb` representation
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.0;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Parse a hexadecimal color string
    ///
    /// Accepts `#rrggbb` or `rrggbb`, in either case.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the string is not six hex digits
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(AnalysisError::invalid_parameter("hex color", hex));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| AnalysisError::invalid_parameter("hex color", hex))
        };

        Ok(Self([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
    }
}

impl From<RgbColor> for palette::Srgb<u8> {
    fn from(color: RgbColor) -> Self {
        let [r, g, b] = color.0;
        palette::Srgb::new(r, g, b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for RgbColor {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

/// Decode one sRGB channel to linear light
fn srgb_to_linear(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c > srgb::GAMMA_THRESHOLD {
        ((c + srgb::GAMMA_OFFSET) / srgb::GAMMA_SCALE).powf(srgb::GAMMA_EXPONENT)
    } else {
        c / srgb::LINEAR_DIVISOR
    }
}

fn lab_f(t: f64) -> f64 {
    if t > lab::EPSILON {
        t.cbrt()
    } else {
        lab::KAPPA_SLOPE * t + lab::OFFSET
    }
}

/// Convert an sRGB color to CIE Lab relative to D65
///
/// Uses the sRGB/D65 matrix and the 0.008856 / 7.787 companding constants,
/// not the exact CIE rationals palette uses internally.
pub fn rgb_to_lab(rgb: RgbColor) -> LabColor {
    let linear = rgb.0.map(srgb_to_linear);

    let [x, y, z] = d65::SRGB_TO_XYZ.map(|row| {
        row[0] * linear[0] + row[1] * linear[1] + row[2] * linear[2]
    });

    let fx = lab_f(x / d65::WHITE_POINT_XYZ[0]);
    let fy = lab_f(y / d65::WHITE_POINT_XYZ[1]);
    let fz = lab_f(z / d65::WHITE_POINT_XYZ[2]);

    Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

//! Colorimetric constants and fixed analysis parameters
//!
//! The Lab conversion constants are fixed: existing calibration files were
//! tuned against exactly these values.

/// D65 Standard Illuminant Reference
pub mod d65 {
    /// D65 white point in CIE XYZ color space
    pub const WHITE_POINT_XYZ: [f64; 3] = [0.95047, 1.00000, 1.08883];

    /// Linear sRGB to XYZ matrix (row-major)
    pub const SRGB_TO_XYZ: [[f64; 3]; 3] = [
        [0.4124564, 0.3575761, 0.1804375],
        [0.2126729, 0.7151522, 0.0721750],
        [0.0193339, 0.1191920, 0.9503041],
    ];
}

/// sRGB transfer function parameters
pub mod srgb {
    /// Below this encoded value the curve is linear
    pub const GAMMA_THRESHOLD: f64 = 0.04045;
    pub const LINEAR_DIVISOR: f64 = 12.92;
    pub const GAMMA_OFFSET: f64 = 0.055;
    pub const GAMMA_SCALE: f64 = 1.055;
    pub const GAMMA_EXPONENT: f64 = 2.4;
}

/// CIE Lab companding parameters
pub mod lab {
    pub const EPSILON: f64 = 0.008856;
    pub const KAPPA_SLOPE: f64 = 7.787;
    pub const OFFSET: f64 = 16.0 / 116.0;
}

/// Sampling parameters
pub mod sampling {
    /// Returned when a region contains no pixels
    pub const FALLBACK_GRAY: [u8; 3] = [128, 128, 128];
}

/// Output precision of the analysis result
pub mod precision {
    /// Decimal places for per-status distances
    pub const DISTANCE_DECIMALS: i32 = 2;

    /// Decimal places for the confidence percentage
    pub const CONFIDENCE_DECIMALS: i32 = 1;
}

/// Host-facing defaults
pub mod defaults {
    pub const CALIBRATION_PATH: &str = "calibrations/calibration.json";

    pub const HISTORY_LIMIT: usize = 100;

    /// Source tag stamped on calibrations submitted from a form
    pub const WEB_CALIBRATION_SOURCE: &str = "web_calibration";
}

/// Round to a fixed number of decimal places, halves to even
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

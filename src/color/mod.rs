//! Color math and region sampling
//!
//! This module handles color space conversion, color difference metrics,
//! and extraction of a representative color from an image region.

pub mod conversion;
pub mod distance;
pub mod sampling;

pub use conversion::{rgb_to_lab, LabColor, RgbColor};
pub use distance::{
    delta_e_cie76, euclidean_distance, manhattan_distance, ColorDistances, Metric,
};
pub use sampling::{sample_region, Region};

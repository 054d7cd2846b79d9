//! Region sampling
//!
//! Averages the pixels of a rectangular region of a decoded RGB image.
//! Regions may extend past the image edges; they are truncated to the
//! image, and an empty intersection yields a neutral gray fallback.

use std::fmt;
use std::str::FromStr;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::conversion::RgbColor;
use crate::constants::sampling::FALLBACK_GRAY;
use crate::{AnalysisError, Result};

/// Rectangular pixel region in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Region {
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self { x, y, width, height }
    }

    /// Centered region covering half of each dimension
    pub fn centered(image_width: u32, image_height: u32) -> Self {
        let w = image_width as i64;
        let h = image_height as i64;
        Self {
            x: w / 4,
            y: h / 4,
            width: w / 2,
            height: h / 2,
        }
    }

    /// Pixel bounds `(x1, y1, x2, y2)` after clamping to an image
    ///
    /// The start corner is clamped to the last valid pixel, the end corner
    /// (computed from the unclamped start) to the image size. The result
    /// may be empty (`x1 >= x2` or `y1 >= y2`).
    pub fn clamp_to(&self, image_width: u32, image_height: u32) -> (u32, u32, u32, u32) {
        let w = image_width as i64;
        let h = image_height as i64;

        let x1 = self.x.min(w - 1).max(0);
        let y1 = self.y.min(h - 1).max(0);
        let x2 = self.x.saturating_add(self.width).min(w).max(0);
        let y2 = self.y.saturating_add(self.height).min(h).max(0);

        (x1 as u32, y1 as u32, x2 as u32, y2 as u32)
    }

    /// Whether the unclamped region shares at least one pixel with the image
    pub fn overlaps(&self, image_width: u32, image_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x < image_width as i64
            && self.y < image_height as i64
            && self.x.saturating_add(self.width) > 0
            && self.y.saturating_add(self.height) > 0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl FromStr for Region {
    type Err = AnalysisError;

    /// Parse `"x,y,width,height"`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<i64> = s
            .split(',')
            .map(|part| part.trim().parse::<i64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| AnalysisError::invalid_parameter("region", s))?;

        match parts.as_slice() {
            &[x, y, width, height] if width >= 0 && height >= 0 => {
                Ok(Self::new(x, y, width, height))
            }
            _ => Err(AnalysisError::invalid_parameter("region", s)),
        }
    }
}

/// Mean color of the pixels inside `region`
///
/// Each channel mean is truncated toward zero. Returns (128, 128, 128)
/// if the region lies entirely outside the image or the clamped region
/// holds no pixels.
pub fn sample_region(image: &RgbImage, region: Region) -> RgbColor {
    let (width, height) = image.dimensions();
    let (x1, y1, x2, y2) = region.clamp_to(width, height);

    if !region.overlaps(width, height) || x1 >= x2 || y1 >= y2 {
        tracing::debug!(%region, width, height, "Region has no pixels, using fallback gray");
        return RgbColor(FALLBACK_GRAY);
    }

    let mut sums = [0u64; 3];
    for y in y1..y2 {
        for x in x1..x2 {
            let pixel = image.get_pixel(x, y);
            for (sum, &channel) in sums.iter_mut().zip(pixel.0.iter()) {
                *sum += channel as u64;
            }
        }
    }

    let count = (x2 - x1) as u64 * (y2 - y1) as u64;
    RgbColor(sums.map(|sum| (sum / count) as u8))
}

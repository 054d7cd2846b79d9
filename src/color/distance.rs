//! Color difference metrics
//!
//! Two RGB-space metrics (Euclidean, Manhattan) and the perceptual CIE76
//! Delta E, computed as Euclidean distance in Lab.

use serde::{Deserialize, Serialize};

use super::conversion::{rgb_to_lab, RgbColor};
use crate::constants::{precision, round_to};

/// Euclidean distance between two colors in RGB space
pub fn euclidean_distance(a: RgbColor, b: RgbColor) -> f64 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Manhattan (L1) distance between two colors in RGB space
pub fn manhattan_distance(a: RgbColor, b: RgbColor) -> f64 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| (x as f64 - y as f64).abs())
        .sum()
}

/// Delta E (CIE76) between two RGB colors
pub fn delta_e_cie76(a: RgbColor, b: RgbColor) -> f64 {
    let lab1 = rgb_to_lab(a);
    let lab2 = rgb_to_lab(b);
    let dl = lab1.l - lab2.l;
    let da = lab1.a - lab2.a;
    let db = lab1.b - lab2.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Distance metric used by the status decision rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Euclidean,
    Manhattan,
    /// Perceptual difference, the default
    #[default]
    DeltaE,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Manhattan => "manhattan",
            Metric::DeltaE => "delta_e",
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = crate::AnalysisError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" => Ok(Metric::Euclidean),
            "manhattan" => Ok(Metric::Manhattan),
            "delta_e" | "deltae" | "cie76" => Ok(Metric::DeltaE),
            _ => Err(crate::AnalysisError::invalid_parameter("metric", s)),
        }
    }
}

/// All three distances between a sample and one reference color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorDistances {
    pub euclidean: f64,
    pub manhattan: f64,
    pub delta_e: f64,
}

impl ColorDistances {
    pub fn between(sample: RgbColor, reference: RgbColor) -> Self {
        Self {
            euclidean: euclidean_distance(sample, reference),
            manhattan: manhattan_distance(sample, reference),
            delta_e: delta_e_cie76(sample, reference),
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Euclidean => self.euclidean,
            Metric::Manhattan => self.manhattan,
            Metric::DeltaE => self.delta_e,
        }
    }

    /// Copy rounded to display precision
    pub fn rounded(&self) -> Self {
        Self {
            euclidean: round_to(self.euclidean, precision::DISTANCE_DECIMALS),
            manhattan: round_to(self.manhattan, precision::DISTANCE_DECIMALS),
            delta_e: round_to(self.delta_e, precision::DISTANCE_DECIMALS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOREST: RgbColor = RgbColor::new(34, 139, 34);
    const BROWN: RgbColor = RgbColor::new(139, 90, 43);

    #[test]
    fn test_euclidean_symmetric() {
        let pairs = [
            (FOREST, BROWN),
            (RgbColor::new(0, 0, 0), RgbColor::new(255, 255, 255)),
            (RgbColor::new(12, 200, 7), RgbColor::new(13, 199, 9)),
        ];
        for (a, b) in pairs {
            assert_eq!(euclidean_distance(a, b), euclidean_distance(b, a));
            assert!(euclidean_distance(a, b) > 0.0);
        }
        assert_eq!(euclidean_distance(FOREST, FOREST), 0.0);
    }

    #[test]
    fn test_euclidean_value() {
        let d = euclidean_distance(RgbColor::new(0, 0, 0), RgbColor::new(3, 4, 0));
        assert_eq!(d, 5.0);
    }

    #[test]
    fn test_manhattan_value() {
        assert_eq!(manhattan_distance(FOREST, BROWN), 105.0 + 49.0 + 9.0);
        assert_eq!(manhattan_distance(BROWN, BROWN), 0.0);
    }

    #[test]
    fn test_delta_e_same_color() {
        assert!(delta_e_cie76(FOREST, FOREST) < 1e-12);
    }

    #[test]
    fn test_delta_e_known_pair() {
        // Forest green vs. brown reference
        let d = delta_e_cie76(FOREST, BROWN);
        assert!((d - 66.36).abs() < 0.01, "delta_e = {}", d);
    }

    #[test]
    fn test_delta_e_black_white() {
        let d = delta_e_cie76(RgbColor::new(0, 0, 0), RgbColor::new(255, 255, 255));
        assert!((d - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_distances_get_and_round() {
        let distances = ColorDistances {
            euclidean: 1.23456,
            manhattan: 7.0,
            delta_e: 2.005_1,
        };
        assert_eq!(distances.get(Metric::Manhattan), 7.0);
        let rounded = distances.rounded();
        assert_eq!(rounded.euclidean, 1.23);
        assert_eq!(rounded.delta_e, 2.01);
    }

    #[test]
    fn test_metric_parse_and_serde() {
        assert_eq!("delta_e".parse::<Metric>().unwrap(), Metric::DeltaE);
        assert_eq!("Euclidean".parse::<Metric>().unwrap(), Metric::Euclidean);
        assert!("cie2000".parse::<Metric>().is_err());
        assert_eq!(serde_json::to_string(&Metric::DeltaE).unwrap(), "\"delta_e\"");
        assert_eq!(Metric::default(), Metric::DeltaE);
    }
}

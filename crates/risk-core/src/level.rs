//! Risk level classification.
//!
//! Maps a risk index onto three ordinal bands:
//! Low `[0, 40)`, Medium `[40, 70)`, High `[70, ∞)`.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const MEDIUM_FLOOR: Decimal = Decimal::from_parts(40, 0, 0, false, 0);
const HIGH_FLOOR: Decimal = Decimal::from_parts(70, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classify a risk index. Indices above 100 still classify as High.
    pub fn from_index(index: Decimal) -> Self {
        if index < MEDIUM_FLOOR {
            RiskLevel::Low
        } else if index < HIGH_FLOOR {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// Classify a floating point index by converting it to a decimal first,
    /// so values like 69.99999 are not rounded across a band edge.
    pub fn from_f64(index: f64) -> Self {
        match Decimal::from_f64(index) {
            Some(d) => Self::from_index(d),
            None if index == f64::INFINITY => RiskLevel::High,
            // Outside Decimal range: compare as float, NaN falls to Low
            None if index >= 70.0 => RiskLevel::High,
            None => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#00cc88",
            RiskLevel::Medium => "#ffaa00",
            RiskLevel::High => "#ff3333",
        }
    }

    pub fn all() -> [RiskLevel; 3] {
        [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High]
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(RiskLevel::Low),
            "Medium" => Ok(RiskLevel::Medium),
            "High" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_band_edges() {
        assert_eq!(RiskLevel::from_index(dec!(39.999)), RiskLevel::Low);
        assert_eq!(RiskLevel::from_index(dec!(40)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_index(dec!(40.0)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_index(dec!(69.999)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_index(dec!(69.9999)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_index(dec!(70)), RiskLevel::High);
        assert_eq!(RiskLevel::from_index(dec!(70.0)), RiskLevel::High);
    }

    #[test]
    fn test_above_hundred_is_high() {
        assert_eq!(RiskLevel::from_index(dec!(150)), RiskLevel::High);
        assert_eq!(RiskLevel::from_f64(150.0), RiskLevel::High);
    }

    #[test]
    fn test_negative_is_low() {
        assert_eq!(RiskLevel::from_index(dec!(-5)), RiskLevel::Low);
        assert_eq!(RiskLevel::from_index(Decimal::ZERO), RiskLevel::Low);
    }

    #[test]
    fn test_from_f64_edges() {
        assert_eq!(RiskLevel::from_f64(39.999), RiskLevel::Low);
        assert_eq!(RiskLevel::from_f64(40.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_f64(69.9999), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_f64(70.0), RiskLevel::High);
    }

    #[test]
    fn test_from_f64_is_total() {
        assert_eq!(RiskLevel::from_f64(f64::INFINITY), RiskLevel::High);
        assert_eq!(RiskLevel::from_f64(f64::NEG_INFINITY), RiskLevel::Low);
        assert_eq!(RiskLevel::from_f64(f64::NAN), RiskLevel::Low);
        assert_eq!(RiskLevel::from_f64(1e40), RiskLevel::High);
    }

    #[test]
    fn test_label_round_trip() {
        for level in RiskLevel::all() {
            assert_eq!(level.as_str().parse::<RiskLevel>().unwrap(), level);
        }
        assert!("medium".parse::<RiskLevel>().is_err());
    }
}

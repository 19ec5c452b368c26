use serde::{Deserialize, Serialize};
use std::fmt;

/// Scaled values this close to a half are treated as exact ties, so that
/// 1.005 rounds like the decimal it was typed as.
const TIE_TOLERANCE: f64 = 1e-9;

pub const CURRENCY_PLACES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum RoundingMode {
    #[default]
    HalfAwayFromZero,
    /// Banker's rounding.
    HalfEven,
}

impl RoundingMode {
    pub fn round(self, value: f64, places: u32) -> f64 {
        if !value.is_finite() {
            return value;
        }

        let factor = 10f64.powi(places as i32);
        let scaled = value.abs() * factor;
        let floor = scaled.floor();

        let rounded = if (scaled - floor - 0.5).abs() < TIE_TOLERANCE {
            match self {
                RoundingMode::HalfAwayFromZero => floor + 1.0,
                RoundingMode::HalfEven if floor % 2.0 == 0.0 => floor,
                RoundingMode::HalfEven => floor + 1.0,
            }
        } else {
            scaled.round()
        };

        if rounded == 0.0 {
            return 0.0;
        }
        (rounded / factor).copysign(value)
    }

    pub fn round_currency(self, value: f64) -> f64 {
        self.round(value, CURRENCY_PLACES)
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::HalfAwayFromZero => f.write_str("half-away-from-zero"),
            RoundingMode::HalfEven => f.write_str("half-even"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_away_from_zero_ties() {
        let mode = RoundingMode::HalfAwayFromZero;
        assert_eq!(mode.round_currency(1.005), 1.01);
        assert_eq!(mode.round_currency(0.125), 0.13);
        assert_eq!(mode.round_currency(2.675), 2.68);
        assert_eq!(mode.round_currency(-0.125), -0.13);
    }

    #[test]
    fn test_half_even_ties() {
        let mode = RoundingMode::HalfEven;
        assert_eq!(mode.round_currency(1.005), 1.0);
        assert_eq!(mode.round_currency(0.125), 0.12);
        assert_eq!(mode.round_currency(0.135), 0.14);
        assert_eq!(mode.round_currency(2.675), 2.68);
    }

    #[test]
    fn test_non_ties_round_to_nearest() {
        for mode in [RoundingMode::HalfAwayFromZero, RoundingMode::HalfEven] {
            assert_eq!(mode.round_currency(33.333333), 33.33);
            assert_eq!(mode.round_currency(66.666666), 66.67);
            assert_eq!(mode.round_currency(10.0), 10.0);
            assert_eq!(mode.round_currency(0.004), 0.0);
        }
    }

    #[test]
    fn test_tiny_negative_rounds_to_plain_zero() {
        let rounded = RoundingMode::HalfAwayFromZero.round_currency(-0.001);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_positive());
    }

    #[test]
    fn test_non_finite_passes_through() {
        assert!(RoundingMode::HalfEven.round_currency(f64::NAN).is_nan());
    }
}

//! Core domain types for the BMI tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Validated measurement input
//! - BMI categories and their ranges
//! - Transient results and persisted calculation records

use crate::decimal;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

// ============================================================================
// Measurement Input
// ============================================================================

/// Accepted height range in centimetres
pub const HEIGHT_CM_RANGE: RangeInclusive<f64> = 50.0..=300.0;

/// Accepted weight range in kilograms
pub const WEIGHT_KG_RANGE: RangeInclusive<f64> = 10.0..=500.0;

/// A height/weight pair that has passed boundary validation.
///
/// The only way to build one is [`Measurement::new`], so anything holding a
/// `Measurement` can skip re-checking the bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Measurement {
    height_cm: f64,
    weight_kg: f64,
}

impl Measurement {
    pub fn new(height_cm: f64, weight_kg: f64) -> Result<Self> {
        check_bound("height_cm", height_cm, &HEIGHT_CM_RANGE)?;
        check_bound("weight_kg", weight_kg, &WEIGHT_KG_RANGE)?;
        Ok(Self {
            height_cm,
            weight_kg,
        })
    }

    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }
}

fn check_bound(field: &str, value: f64, range: &RangeInclusive<f64>) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || !range.contains(&value) {
        return Err(Error::Validation(format!(
            "{} must be between {} and {}, got {}",
            field,
            range.start(),
            range.end(),
            value
        )));
    }
    Ok(())
}

// ============================================================================
// BMI Category
// ============================================================================

/// Standard adult BMI category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Classify a rounded BMI value.
    ///
    /// Normal is `18.50..=25.00`; Overweight starts above 25.00 and runs up to,
    /// but not including, 30.00.
    pub fn classify(bmi_value: Decimal) -> Self {
        if bmi_value < dec!(18.50) {
            BmiCategory::Underweight
        } else if bmi_value <= dec!(25.00) {
            BmiCategory::Normal
        } else if bmi_value < dec!(30.00) {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BmiCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "underweight" => Ok(BmiCategory::Underweight),
            "normal" => Ok(BmiCategory::Normal),
            "overweight" => Ok(BmiCategory::Overweight),
            "obese" => Ok(BmiCategory::Obese),
            other => Err(Error::Validation(format!("unknown BMI category: {}", other))),
        }
    }
}

// ============================================================================
// Results and Records
// ============================================================================

/// Output of a single BMI calculation, before it is stored
///
/// Height and weight echo the input as written. All three numbers serialize
/// as decimal strings, the same as a stored record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BmiResult {
    #[serde(with = "rust_decimal::serde::str")]
    pub height_cm: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub weight_kg: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub bmi_value: Decimal,
    pub category: BmiCategory,
    pub calculated_at: DateTime<Utc>,
}

/// A calculation on its way into a store
#[derive(Clone, Debug, PartialEq)]
pub struct NewCalculation {
    pub height_cm: Decimal,
    pub weight_kg: Decimal,
    pub bmi_value: Decimal,
    pub category: BmiCategory,
    /// Stamped with the insertion time when `None`
    pub calculated_at: Option<DateTime<Utc>>,
}

impl NewCalculation {
    /// Prepare a result for storage, rounding the echoed inputs to hundredths.
    pub fn from_result(result: &BmiResult) -> Self {
        Self {
            height_cm: decimal::to_hundredths(result.height_cm),
            weight_kg: decimal::to_hundredths(result.weight_kg),
            bmi_value: result.bmi_value,
            category: result.category,
            calculated_at: Some(result.calculated_at),
        }
    }
}

/// A stored, immutable calculation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub height_cm: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub weight_kg: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub bmi_value: Decimal,
    pub category: BmiCategory,
    pub calculated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_accepts_bounds() {
        assert!(Measurement::new(50.0, 10.0).is_ok());
        assert!(Measurement::new(300.0, 500.0).is_ok());
        assert!(Measurement::new(175.5, 70.25).is_ok());
    }

    #[test]
    fn test_measurement_rejects_out_of_range() {
        let cases = [
            (49.99, 70.0),
            (300.01, 70.0),
            (175.0, 9.99),
            (175.0, 500.5),
            (0.0, 70.0),
            (-175.0, 70.0),
            (f64::NAN, 70.0),
            (175.0, f64::INFINITY),
        ];

        for (height, weight) in cases {
            let err = Measurement::new(height, weight).unwrap_err();
            assert!(err.is_validation(), "({}, {}) gave {}", height, weight, err);
        }
    }

    #[test]
    fn test_classify_boundaries() {
        let cases = [
            (dec!(18.49), BmiCategory::Underweight),
            (dec!(18.50), BmiCategory::Normal),
            (dec!(24.99), BmiCategory::Normal),
            (dec!(25.00), BmiCategory::Normal),
            (dec!(25.01), BmiCategory::Overweight),
            (dec!(29.99), BmiCategory::Overweight),
            (dec!(30.00), BmiCategory::Obese),
            (dec!(30), BmiCategory::Obese),
        ];
        for (value, category) in cases {
            assert_eq!(BmiCategory::classify(value), category, "{}", value);
        }
    }

    #[test]
    fn test_category_text_roundtrip() {
        for category in [
            BmiCategory::Underweight,
            BmiCategory::Normal,
            BmiCategory::Overweight,
            BmiCategory::Obese,
        ] {
            assert_eq!(category.as_str().parse::<BmiCategory>().unwrap(), category);
        }
        assert_eq!("OBESE".parse::<BmiCategory>().unwrap(), BmiCategory::Obese);
        assert!("healthy".parse::<BmiCategory>().is_err());
    }

    #[test]
    fn test_record_json_uses_text_decimals() {
        let record = CalculationRecord {
            id: 7,
            height_cm: dec!(175.50),
            weight_kg: dec!(70.25),
            bmi_value: dec!(22.81),
            category: BmiCategory::Normal,
            calculated_at: "2024-01-15T10:30:00Z".parse().unwrap(),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""height_cm":"175.50""#));
        assert!(json.contains(r#""bmi_value":"22.81""#));
        assert!(json.contains(r#""category":"Normal""#));

        let back: CalculationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_result_json_uses_one_number_encoding() {
        let result = BmiResult {
            height_cm: dec!(160),
            weight_kg: dec!(64.1),
            bmi_value: dec!(25.04),
            category: BmiCategory::Overweight,
            calculated_at: "2024-01-15T10:30:00Z".parse().unwrap(),
        };

        let json: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(json["height_cm"], "160");
        assert_eq!(json["weight_kg"], "64.1");
        assert_eq!(json["bmi_value"], "25.04");
    }

    #[test]
    fn test_new_calculation_stores_two_places() {
        let result = BmiResult {
            height_cm: dec!(175),
            weight_kg: dec!(70.255),
            bmi_value: dec!(22.94),
            category: BmiCategory::Normal,
            calculated_at: Utc::now(),
        };

        let calculation = NewCalculation::from_result(&result);
        assert_eq!(calculation.height_cm.to_string(), "175.00");
        assert_eq!(calculation.weight_kg.to_string(), "70.26");
        assert_eq!(calculation.calculated_at, Some(result.calculated_at));
    }
}

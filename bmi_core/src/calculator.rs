//! BMI calculation and classification.
//!
//! `bmi = weight_kg / height_m²`, rounded to hundredths. The rounded value is
//! what gets classified and stored, so the category always agrees with the
//! number a reader sees.

use crate::decimal;
use crate::{BmiCategory, BmiResult, Error, Measurement, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Calculate and classify BMI, stamped with the current time.
pub fn calculate(measurement: &Measurement) -> Result<BmiResult> {
    calculate_at(measurement, Utc::now())
}

/// Calculate and classify BMI with an explicit timestamp.
pub fn calculate_at(measurement: &Measurement, at: DateTime<Utc>) -> Result<BmiResult> {
    let bmi_value = bmi_value(measurement.height_cm(), measurement.weight_kg())?;
    let category = BmiCategory::classify(bmi_value);

    tracing::debug!(
        "BMI for {}cm / {}kg = {} ({})",
        measurement.height_cm(),
        measurement.weight_kg(),
        bmi_value,
        category
    );

    Ok(BmiResult {
        height_cm: echo("height_cm", measurement.height_cm())?,
        weight_kg: echo("weight_kg", measurement.weight_kg())?,
        bmi_value,
        category,
        calculated_at: at,
    })
}

/// Rounded BMI for a height in centimetres and weight in kilograms
pub fn bmi_value(height_cm: f64, weight_kg: f64) -> Result<Decimal> {
    let height_m = height_cm / 100.0;
    let raw = weight_kg / (height_m * height_m);
    decimal::round_hundredths(raw).ok_or_else(|| {
        Error::Validation(format!(
            "BMI is undefined for height {} and weight {}",
            height_cm, weight_kg
        ))
    })
}

fn echo(field: &str, value: f64) -> Result<Decimal> {
    decimal::from_input(value)
        .ok_or_else(|| Error::Validation(format!("{} is not a finite number", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn calc(height: f64, weight: f64) -> BmiResult {
        let measurement = Measurement::new(height, weight).unwrap();
        calculate(&measurement).unwrap()
    }

    #[test]
    fn test_normal_weight() {
        let result = calc(175.0, 70.0);
        assert_eq!(result.bmi_value.to_string(), "22.86");
        assert_eq!(result.category, BmiCategory::Normal);
        assert_eq!(result.height_cm, dec!(175));
        assert_eq!(result.weight_kg, dec!(70));
    }

    #[test]
    fn test_underweight() {
        let result = calc(180.0, 55.0);
        assert_eq!(result.bmi_value.to_string(), "16.98");
        assert_eq!(result.category, BmiCategory::Underweight);
    }

    #[test]
    fn test_overweight() {
        let result = calc(170.0, 80.0);
        assert_eq!(result.bmi_value.to_string(), "27.68");
        assert_eq!(result.category, BmiCategory::Overweight);
    }

    #[test]
    fn test_obese() {
        let result = calc(165.0, 90.0);
        assert_eq!(result.bmi_value.to_string(), "33.06");
        assert_eq!(result.category, BmiCategory::Obese);
    }

    #[test]
    fn test_exact_normal_upper_boundary() {
        let result = calc(160.0, 64.0);
        assert_eq!(result.bmi_value.to_string(), "25.00");
        assert_eq!(result.category, BmiCategory::Normal);
    }

    #[test]
    fn test_just_past_overweight_boundary() {
        let result = calc(160.0, 64.1);
        assert_eq!(result.bmi_value.to_string(), "25.04");
        assert_eq!(result.category, BmiCategory::Overweight);
        assert_eq!(result.weight_kg.to_string(), "64.1");
    }

    #[test]
    fn test_deterministic() {
        let measurement = Measurement::new(182.75, 75.12).unwrap();
        let at = Utc::now();
        let first = calculate_at(&measurement, at).unwrap();
        let second = calculate_at(&measurement, at).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extreme_inputs_stay_finite() {
        let result = calc(50.0, 500.0);
        assert_eq!(result.bmi_value.to_string(), "2000.00");
        assert_eq!(result.category, BmiCategory::Obese);

        let result = calc(300.0, 10.0);
        assert_eq!(result.bmi_value.to_string(), "1.11");
        assert_eq!(result.category, BmiCategory::Underweight);
    }
}

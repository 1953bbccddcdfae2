//! Externally exposed operations.
//!
//! Each operation validates its input, runs the calculator and talks to an
//! injected [`CalculationStore`]. A failed save means no result is returned.

use crate::calculator;
use crate::{BmiResult, CalculationRecord, CalculationStore, Measurement, NewCalculation, Result};

/// Raw height/weight as supplied by a caller, before validation
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub struct CalculateBmiInput {
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl CalculateBmiInput {
    pub fn validate(&self) -> Result<Measurement> {
        Measurement::new(self.height_cm, self.weight_kg)
    }
}

/// Calculate, persist, and return the stored record.
pub fn calculate_and_save<S>(store: &mut S, input: &CalculateBmiInput) -> Result<CalculationRecord>
where
    S: CalculationStore + ?Sized,
{
    let (_, record) = calculate_and_store(store, input)?;
    Ok(record)
}

/// Calculate and persist, returning the calculation result.
pub fn calculate_bmi<S>(store: &mut S, input: &CalculateBmiInput) -> Result<BmiResult>
where
    S: CalculationStore + ?Sized,
{
    let (result, _) = calculate_and_store(store, input)?;
    Ok(result)
}

fn calculate_and_store<S>(
    store: &mut S,
    input: &CalculateBmiInput,
) -> Result<(BmiResult, CalculationRecord)>
where
    S: CalculationStore + ?Sized,
{
    let measurement = input.validate()?;
    let result = calculator::calculate(&measurement)?;
    let record = store.save(NewCalculation::from_result(&result))?;

    tracing::info!(
        "Saved calculation {}: BMI {} ({})",
        record.id,
        record.bmi_value,
        record.category
    );
    Ok((result, record))
}

/// Calculate without touching any store.
pub fn preview_bmi(input: &CalculateBmiInput) -> Result<BmiResult> {
    let measurement = input.validate()?;
    calculator::calculate(&measurement)
}

/// Every stored calculation, newest first.
pub fn get_bmi_history<S>(store: &S) -> Result<Vec<CalculationRecord>>
where
    S: CalculationStore + ?Sized,
{
    let history = store.list_history()?;
    tracing::info!("Loaded {} calculations", history.len());
    Ok(history)
}

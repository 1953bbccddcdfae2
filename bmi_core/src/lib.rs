#![forbid(unsafe_code)]

//! Core domain model and business logic for the BMI tracker.
//!
//! This crate provides:
//! - Validated measurements and BMI categories
//! - The BMI calculator
//! - Persistence (append-only calculation log, CSV export)
//! - The externally exposed calculate/history operations

pub mod decimal;
pub mod types;
pub mod error;
pub mod calculator;
pub mod config;
pub mod logging;
pub mod store;
pub mod csv_export;
pub mod service;

// Re-export commonly used types
pub use error::{Error, Result};
pub use rust_decimal::Decimal;
pub use types::*;
pub use config::Config;
pub use store::{CalculationStore, JsonlStore, MemoryStore};
pub use calculator::calculate;
pub use service::{calculate_and_save, calculate_bmi, get_bmi_history, preview_bmi, CalculateBmiInput};

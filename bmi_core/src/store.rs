//! Calculation store: an append-only log of BMI calculations.
//!
//! Records are appended to a JSONL (JSON Lines) file under an exclusive file
//! lock. The lock is held while the next id is chosen and the line is written,
//! so concurrent writers never hand out the same id.
//!
//! A record counts as written once its line ends in `\n`. A trailing fragment
//! without one is left over from an interrupted append: readers skip it and
//! the next writer truncates it away.

use crate::decimal;
use crate::{BmiCategory, CalculationRecord, Error, NewCalculation, Result};
use chrono::Utc;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};

/// Persistence seam for calculation records
pub trait CalculationStore {
    /// Append one record, assigning its id (and timestamp if missing).
    fn save(&mut self, calculation: NewCalculation) -> Result<CalculationRecord>;

    /// Every stored record, newest first.
    fn list_history(&self) -> Result<Vec<CalculationRecord>>;
}

/// Check a row against the calculation table before anything is written.
pub fn check_row(calculation: &NewCalculation) -> Result<()> {
    let implied = BmiCategory::classify(calculation.bmi_value);
    if implied != calculation.category {
        return Err(Error::Validation(format!(
            "category {} does not match BMI {} (expected {})",
            calculation.category, calculation.bmi_value, implied
        )));
    }

    for (column, value) in [
        ("height_cm", calculation.height_cm),
        ("weight_kg", calculation.weight_kg),
        ("bmi_value", calculation.bmi_value),
    ] {
        if !decimal::fits_column(value) {
            return Err(Error::Constraint(format!(
                "{} value {} does not fit decimal(5,2)",
                column, value
            )));
        }
    }

    Ok(())
}

/// Newest first; equal timestamps fall back to the higher id first.
pub fn sort_newest_first(records: &mut [CalculationRecord]) {
    records.sort_by(|a, b| {
        b.calculated_at
            .cmp(&a.calculated_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

fn into_record(id: u64, calculation: NewCalculation) -> CalculationRecord {
    CalculationRecord {
        id,
        height_cm: calculation.height_cm,
        weight_kg: calculation.weight_kg,
        bmi_value: calculation.bmi_value,
        category: calculation.category,
        calculated_at: calculation.calculated_at.unwrap_or_else(Utc::now),
    }
}

// ============================================================================
// JSONL store
// ============================================================================

/// JSONL-backed calculation store with file locking
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Create a store backed by the log at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CalculationStore for JsonlStore {
    fn save(&mut self, calculation: NewCalculation) -> Result<CalculationRecord> {
        check_row(&calculation)?;
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        // Held across the id scan and the append
        file.lock_exclusive()?;
        let outcome = append_locked(&file, &self.path, calculation);
        file.unlock()?;

        let record = outcome?;
        tracing::debug!("Appended calculation {} to {:?}", record.id, self.path);
        Ok(record)
    }

    fn list_history(&self) -> Result<Vec<CalculationRecord>> {
        let mut records = read_records(&self.path)?;
        sort_newest_first(&mut records);
        Ok(records)
    }
}

fn append_locked(file: &File, path: &Path, calculation: NewCalculation) -> Result<CalculationRecord> {
    let contents = read_all(file)?;
    let (complete, fragment) = split_unterminated(&contents);
    if !fragment.is_empty() {
        tracing::warn!(
            "Dropping {} byte(s) of an interrupted write at the end of {:?}",
            fragment.len(),
            path
        );
        file.set_len(complete.len() as u64)?;
    }

    let existing = parse_records(complete)?;
    let next_id = existing.iter().map(|r| r.id).max().unwrap_or(0) + 1;
    let record = into_record(next_id, calculation);

    let mut writer = std::io::BufWriter::new(file);
    let line = serde_json::to_string(&record)?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    drop(writer);

    file.sync_data()?;
    Ok(record)
}

/// Read all records from a log file, in the order they were written
///
/// A missing file is an empty log, and an unterminated last line is skipped.
/// Any complete line that does not decode fails the whole read.
pub fn read_records(path: &Path) -> Result<Vec<CalculationRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;
    let outcome = read_all(&file);
    file.unlock()?;

    let contents = outcome?;
    let (complete, fragment) = split_unterminated(&contents);
    if !fragment.is_empty() {
        tracing::warn!(
            "Ignoring unterminated last line of {:?} ({} bytes)",
            path,
            fragment.len()
        );
    }

    let records = parse_records(complete)?;
    tracing::debug!("Read {} calculations from {:?}", records.len(), path);
    Ok(records)
}

fn read_all(mut file: &File) -> Result<Vec<u8>> {
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// Split the log into its newline-terminated lines and whatever follows them.
fn split_unterminated(contents: &[u8]) -> (&[u8], &[u8]) {
    let end = contents
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |pos| pos + 1);
    contents.split_at(end)
}

fn parse_records(reader: impl BufRead) -> Result<Vec<CalculationRecord>> {
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        let record = serde_json::from_str::<CalculationRecord>(&line).map_err(|e| {
            Error::CorruptLog {
                line: line_num + 1,
                reason: e.to_string(),
            }
        })?;
        records.push(record);
    }

    Ok(records)
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store, for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<CalculationRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CalculationStore for MemoryStore {
    fn save(&mut self, calculation: NewCalculation) -> Result<CalculationRecord> {
        check_row(&calculation)?;
        let next_id = self.records.last().map(|r| r.id).unwrap_or(0) + 1;
        let record = into_record(next_id, calculation);
        self.records.push(record.clone());
        Ok(record)
    }

    fn list_history(&self) -> Result<Vec<CalculationRecord>> {
        let mut records = self.records.clone();
        sort_newest_first(&mut records);
        Ok(records)
    }
}

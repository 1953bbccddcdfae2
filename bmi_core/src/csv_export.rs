//! CSV export of the calculation history.
//!
//! The export mirrors the calculation table column for column. It is written
//! to a temp file in the destination directory and renamed into place, so a
//! reader never sees a half-written export.

use crate::{CalculationRecord, CalculationStore, Error, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct CsvRow {
    id: u64,
    height_cm: String,
    weight_kg: String,
    bmi_value: String,
    category: String,
    calculated_at: String,
}

impl From<&CalculationRecord> for CsvRow {
    fn from(record: &CalculationRecord) -> Self {
        CsvRow {
            id: record.id,
            height_cm: record.height_cm.to_string(),
            weight_kg: record.weight_kg.to_string(),
            bmi_value: record.bmi_value.to_string(),
            category: record.category.to_string(),
            calculated_at: record.calculated_at.to_rfc3339(),
        }
    }
}

impl TryFrom<CsvRow> for CalculationRecord {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let calculated_at = DateTime::parse_from_rfc3339(&row.calculated_at)
            .map_err(|e| Error::MalformedExport(format!("invalid timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(CalculationRecord {
            id: row.id,
            height_cm: row.height_cm.parse()?,
            weight_kg: row.weight_kg.parse()?,
            bmi_value: row.bmi_value.parse()?,
            category: row.category.parse()?,
            calculated_at,
        })
    }
}

/// Write the full history, newest first, to a CSV file
///
/// Returns the number of records written. An empty history still produces a
/// file with just the header row.
pub fn export_history<S>(store: &S, csv_path: &Path) -> Result<usize>
where
    S: CalculationStore + ?Sized,
{
    let records = store.list_history()?;

    let parent = match csv_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = csv::Writer::from_writer(temp.as_file());
        if records.is_empty() {
            writer.write_record([
                "id",
                "height_cm",
                "weight_kg",
                "bmi_value",
                "category",
                "calculated_at",
            ])?;
        }
        for record in &records {
            writer.serialize(CsvRow::from(record))?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;

    temp.persist(csv_path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} calculations to {:?}", records.len(), csv_path);
    Ok(records.len())
}

/// Read an export back into records, in file order
pub fn read_export(csv_path: &Path) -> Result<Vec<CalculationRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(csv_path)?;

    let mut records = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        records.push(CalculationRecord::try_from(row?)?);
    }

    tracing::debug!("Read {} calculations from {:?}", records.len(), csv_path);
    Ok(records)
}

//! Sherlock power-map import.
//!
//! A power map is a CSV file with one row per component:
//!
//! ```text
//! Ref Des,Applied Power (W)
//! U1,0.35
//! U2,1.2
//! ```
//!
//! The power column may use `mW` or `kW` in its header. Each component
//! whose object exists in the design (`COMP_<ref>` or `<ref>`) becomes a
//! solid block dissipating its power. Rows that cannot be parsed are
//! skipped.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::aedt::boundary::BoundaryObject;
use crate::aedt::design::ThermalDesign;
use crate::aedt::error::{AedtError, AedtResult, ValidationError};

/// Header of the reference designator column.
const REF_DES_COLUMN: &str = "Ref Des";

/// Header prefix of the power column.
const POWER_COLUMN: &str = "Applied Power";

/// One parsed row.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerEntry {
    /// Reference designator.
    pub ref_des: String,
    /// Power in watts.
    pub power_w: f64,
}

/// Outcome of a power-map import.
#[derive(Debug, Default)]
pub struct PowerMapReport {
    /// Created blocks.
    pub blocks: Vec<BoundaryObject>,
    /// Components with no matching object.
    pub missing: Vec<String>,
    /// Total power assigned, in watts.
    pub total_power_w: f64,
}

fn power_scale(header: &str) -> Option<f64> {
    let unit = header
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map_or("W", |(unit, _)| unit.trim());
    match unit {
        "W" => Some(1.0),
        "mW" => Some(1e-3),
        "kW" => Some(1e3),
        _ => None,
    }
}

/// Parses power-map CSV data.
///
/// # Errors
///
/// Returns [`AedtError::Csv`] for unreadable CSV and
/// [`ValidationError::InvalidArgument`] if a required column is missing or
/// the power unit is unknown.
pub fn parse_power_map<R: Read>(reader: R) -> AedtResult<Vec<PowerEntry>> {
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let ref_col = headers
        .iter()
        .position(|h| h == REF_DES_COLUMN)
        .ok_or_else(|| ValidationError::invalid_argument(REF_DES_COLUMN, "column not found"))?;
    let (power_col, power_header) = headers
        .iter()
        .enumerate()
        .find(|(_, h)| h.starts_with(POWER_COLUMN))
        .ok_or_else(|| ValidationError::invalid_argument(POWER_COLUMN, "column not found"))?;
    let scale = power_scale(power_header).ok_or_else(|| {
        ValidationError::invalid_argument(power_header, "unknown power unit")
    })?;

    let mut entries = Vec::new();
    for (line, record) in csv.records().enumerate() {
        let record = record?;
        let ref_des = record.get(ref_col).unwrap_or_default();
        let power = record.get(power_col).and_then(|p| p.parse::<f64>().ok());
        match power {
            Some(power) if !ref_des.is_empty() => entries.push(PowerEntry {
                ref_des: ref_des.to_string(),
                power_w: power * scale,
            }),
            _ => {
                tracing::warn!(row = line + 2, ref_des, "skipping unparsable power map row");
            }
        }
    }
    tracing::debug!(count = entries.len(), "parsed power map");
    Ok(entries)
}

/// Creates one solid block per power-map entry with a matching object.
///
/// # Errors
///
/// Returns an error if a block cannot be created.
pub fn assign_blocks_from_power_map(
    design: &ThermalDesign,
    entries: &[PowerEntry],
) -> AedtResult<PowerMapReport> {
    let objects: HashSet<String> = design.session().object_names().into_iter().collect();
    let mut report = PowerMapReport::default();

    for entry in entries {
        let candidates = [format!("COMP_{}", entry.ref_des), entry.ref_des.clone()];
        let Some(object) = candidates.iter().find(|c| objects.contains(*c)) else {
            tracing::warn!(ref_des = %entry.ref_des, "no object for power map entry");
            report.missing.push(entry.ref_des.clone());
            continue;
        };
        let power = format!("{}W", entry.power_w);
        let block = design.assign_solid_block(&[object.as_str()], power, None)?;
        report.total_power_w += entry.power_w;
        report.blocks.push(block);
    }

    tracing::info!(
        blocks = report.blocks.len(),
        missing = report.missing.len(),
        total_power_w = report.total_power_w,
        "power map assigned"
    );
    Ok(report)
}

/// Reads a power-map file and assigns its blocks.
///
/// # Errors
///
/// Returns [`AedtError::FileRead`] if the file cannot be opened, otherwise
/// see [`parse_power_map`] and [`assign_blocks_from_power_map`].
pub fn import_power_map(design: &ThermalDesign, path: &Path) -> AedtResult<PowerMapReport> {
    let file = std::fs::File::open(path).map_err(|e| AedtError::file_read(path, e))?;
    let entries = parse_power_map(file)?;
    assign_blocks_from_power_map(design, &entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_and_skips_garbage() {
        let data = "Ref Des,Applied Power (W)\nU1,0.5\nU2,n/a\n,1.0\nU3,2\n";
        let entries = parse_power_map(data.as_bytes()).unwrap();
        assert_eq!(
            entries,
            vec![
                PowerEntry {
                    ref_des: "U1".into(),
                    power_w: 0.5
                },
                PowerEntry {
                    ref_des: "U3".into(),
                    power_w: 2.0
                },
            ]
        );
    }

    #[test]
    fn milliwatt_header_is_scaled() {
        let data = "Ref Des,Applied Power (mW)\nR1,250\n";
        let entries = parse_power_map(data.as_bytes()).unwrap();
        assert!((entries[0].power_w - 0.25).abs() < 1e-12);
    }

    #[test]
    fn missing_column_is_invalid() {
        let err = parse_power_map("Designator,Power\nU1,1\n".as_bytes()).unwrap_err();
        assert!(err.is_validation());
        let err = parse_power_map("Ref Des,Applied Power (BTU)\nU1,1\n".as_bytes()).unwrap_err();
        assert!(err.is_validation());
    }
}

//! Interchangeability matrix CSV decoding
//!
//! The matrix is square on disk: the first column labels the source
//! instance, every other header names a target, and a truthy cell means
//! the target may replace the source. Only the truthy edges are kept.

use super::error::TableError;
use crate::models::InterchangeabilityRelation;
use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;

/// Decode an interchangeability relation from CSV bytes
pub fn parse_relation(bytes: &[u8]) -> Result<InterchangeabilityRelation, TableError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(TableError::MissingHeader);
    }
    let targets: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut relation = InterchangeabilityRelation::new();
    let mut seen = HashSet::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 2;

        let source = match record.get(0) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => continue,
        };
        if !seen.insert(source.clone()) {
            return Err(TableError::DuplicateRow(source));
        }

        relation.add_row(source.clone());
        for (target, cell) in targets.iter().zip(record.iter().skip(1)) {
            let allowed = parse_flag(cell).ok_or_else(|| TableError::InvalidFlag {
                row,
                column: target.clone(),
                value: cell.to_string(),
            })?;
            if allowed {
                relation.allow(source.clone(), target.clone());
            }
        }
    }

    Ok(relation)
}

/// Coerce a matrix cell to a boolean
///
/// Empty cells are false; any non-zero number is true.
pub fn parse_flag(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "" | "false" | "f" | "no" | "n" => Some(false),
        "true" | "t" | "yes" | "y" => Some(true),
        other => other.parse::<f64>().ok().filter(|n| !n.is_nan()).map(|n| n != 0.0),
    }
}

//! Instance catalog CSV decoding
//!
//! Expected columns: `InstanceType`, `vCPUs`, `MemoryMiB`, `GPUs`. Only
//! `InstanceType` is mandatory; absent numeric columns and empty cells
//! read as zero. Extra columns are ignored.

use super::error::TableError;
use crate::models::{Catalog, InstanceSpec};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

pub const COL_INSTANCE_TYPE: &str = "InstanceType";
pub const COL_VCPUS: &str = "vCPUs";
pub const COL_MEMORY_MIB: &str = "MemoryMiB";
pub const COL_GPUS: &str = "GPUs";

/// Decode a catalog from CSV bytes
pub fn parse_catalog(bytes: &[u8]) -> Result<Catalog, TableError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(TableError::MissingHeader);
    }

    let name_idx = column_index(&headers, COL_INSTANCE_TYPE)
        .ok_or(TableError::MissingColumn(COL_INSTANCE_TYPE))?;
    let vcpu_idx = column_index(&headers, COL_VCPUS);
    let mem_idx = column_index(&headers, COL_MEMORY_MIB);
    let gpu_idx = column_index(&headers, COL_GPUS);

    let mut catalog = Catalog::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // 1-based, counting the header
        let row = i + 2;

        let name = record.get(name_idx).unwrap_or_default();
        if name.is_empty() {
            debug!(row, "Skipping catalog row without instance type");
            continue;
        }

        let spec = InstanceSpec {
            name: name.to_string(),
            vcpus: read_count(&record, vcpu_idx, row, COL_VCPUS)?,
            memory_mib: read_count(&record, mem_idx, row, COL_MEMORY_MIB)?,
            gpus: read_count(&record, gpu_idx, row, COL_GPUS)?,
        };

        if catalog.insert(spec).is_some() {
            return Err(TableError::DuplicateInstance(name.to_string()));
        }
    }

    Ok(catalog)
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn read_count<T>(
    record: &StringRecord,
    idx: Option<usize>,
    row: usize,
    column: &str,
) -> Result<T, TableError>
where
    T: TryFrom<u64> + Default,
{
    let value = match idx.and_then(|i| record.get(i)) {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(T::default()),
    };

    let invalid = || TableError::InvalidNumber {
        row,
        column: column.to_string(),
        value: value.to_string(),
    };

    let count = parse_count(value).ok_or_else(invalid)?;
    T::try_from(count).map_err(|_| invalid())
}

/// Parse a non-negative integer, accepting integral floats such as `8192.0`
fn parse_count(value: &str) -> Option<u64> {
    if let Ok(n) = value.parse::<u64>() {
        return Some(n);
    }
    let f = value.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

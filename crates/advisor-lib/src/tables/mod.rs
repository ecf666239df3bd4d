//! Catalog and interchangeability tables
//!
//! Decoding from CSV and fetching raw bytes from a filesystem directory or
//! an HTTP bucket. Tables are loaded fresh for every request.

mod catalog;
mod error;
mod relation;
mod source;

pub use catalog::{parse_catalog, COL_GPUS, COL_INSTANCE_TYPE, COL_MEMORY_MIB, COL_VCPUS};
pub use error::{SourceError, TableError};
pub use relation::{parse_flag, parse_relation};
pub use source::{open_source, FsTableSource, HttpTableSource, TableSource};

//! Engine error types

use std::fmt;
use thiserror::Error;

/// Table in which a source instance could not be found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Catalog,
    Relation,
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Catalog => f.write_str("catalog"),
            Lookup::Relation => f.write_str("interchangeability matrix"),
        }
    }
}

/// Hard failures of the recommendation engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("current instance {name} not found in {missing_from}")]
    UnknownSource { name: String, missing_from: Lookup },
}

impl EngineError {
    pub fn unknown_in_catalog(name: &str) -> Self {
        EngineError::UnknownSource {
            name: name.to_string(),
            missing_from: Lookup::Catalog,
        }
    }

    pub fn unknown_in_relation(name: &str) -> Self {
        EngineError::UnknownSource {
            name: name.to_string(),
            missing_from: Lookup::Relation,
        }
    }
}

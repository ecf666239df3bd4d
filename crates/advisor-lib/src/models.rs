//! Core data models for instance recommendations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hardware capacity of a single instance type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    #[serde(rename = "InstanceType")]
    pub name: String,
    #[serde(rename = "vCPUs")]
    pub vcpus: u32,
    #[serde(rename = "MemoryMiB")]
    pub memory_mib: u64,
    #[serde(rename = "GPUs")]
    pub gpus: u32,
}

impl InstanceSpec {
    pub fn new(name: impl Into<String>, vcpus: u32, memory_mib: u64, gpus: u32) -> Self {
        Self {
            name: name.into(),
            vcpus,
            memory_mib,
            gpus,
        }
    }

    /// Returns true if this instance meets or exceeds every dimension of the requirement
    pub fn satisfies(&self, requirement: &Requirement) -> bool {
        self.vcpus >= requirement.vcpus
            && self.memory_mib >= requirement.memory_mib
            && self.gpus >= requirement.gpus
    }
}

/// Instance catalog keyed by instance type name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    specs: HashMap<String, InstanceSpec>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a spec, returning the previous entry with the same name if any
    pub fn insert(&mut self, spec: InstanceSpec) -> Option<InstanceSpec> {
        self.specs.insert(spec.name.clone(), spec)
    }

    pub fn get(&self, name: &str) -> Option<&InstanceSpec> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl FromIterator<InstanceSpec> for Catalog {
    fn from_iter<I: IntoIterator<Item = InstanceSpec>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for spec in iter {
            catalog.insert(spec);
        }
        catalog
    }
}

/// Directional "can replace" relation between instance types
///
/// Stored sparsely as source -> allowed targets. Target order follows the
/// column order of the table the relation was decoded from, and is the
/// order in which candidates are considered.
#[derive(Debug, Clone, Default)]
pub struct InterchangeabilityRelation {
    rows: HashMap<String, Vec<String>>,
}

impl InterchangeabilityRelation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source row; a row may legitimately have no allowed targets
    pub fn add_row(&mut self, source: impl Into<String>) {
        self.rows.entry(source.into()).or_default();
    }

    /// Mark `target` as an allowed replacement for `source`
    pub fn allow(&mut self, source: impl Into<String>, target: impl Into<String>) {
        let target = target.into();
        let row = self.rows.entry(source.into()).or_default();
        if !row.contains(&target) {
            row.push(target);
        }
    }

    pub fn has_row(&self, source: &str) -> bool {
        self.rows.contains_key(source)
    }

    /// Allowed targets for `source` in relation order, or None if the source has no row
    pub fn targets(&self, source: &str) -> Option<&[String]> {
        self.rows.get(source).map(Vec::as_slice)
    }

    pub fn allowed(&self, source: &str, target: &str) -> bool {
        self.rows
            .get(source)
            .map(|row| row.iter().any(|t| t == target))
            .unwrap_or(false)
    }

    /// Number of source rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Minimum capacity requested for a replacement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub vcpus: u32,
    pub memory_mib: u64,
    pub gpus: u32,
}

impl Requirement {
    pub fn new(vcpus: u32, memory_mib: u64, gpus: u32) -> Self {
        Self {
            vcpus,
            memory_mib,
            gpus,
        }
    }
}

/// A feasible replacement together with its distance to the requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "InstanceType")]
    pub name: String,
    #[serde(rename = "vCPUs")]
    pub vcpus: u32,
    #[serde(rename = "MemoryMiB")]
    pub memory_mib: u64,
    #[serde(rename = "GPUs")]
    pub gpus: u32,
    #[serde(rename = "Score")]
    pub score: f64,
}

impl Candidate {
    pub fn from_spec(spec: &InstanceSpec, score: f64) -> Self {
        Self {
            name: spec.name.clone(),
            vcpus: spec.vcpus,
            memory_mib: spec.memory_mib,
            gpus: spec.gpus,
            score,
        }
    }
}

/// Ranked recommendation for a source instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    #[serde(rename = "current")]
    pub source: String,
    #[serde(rename = "requested")]
    pub requirement: Requirement,
    pub best: Candidate,
    #[serde(rename = "top_n")]
    pub top: Vec<Candidate>,
}

/// Why a recommendation produced no candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The relation lists nothing that may replace the source
    NoInterchangeableInstances,
    /// Replacements exist but none meets the requirement
    NoFeasibleCandidate,
}

impl EmptyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmptyReason::NoInterchangeableInstances => "no_interchangeable_instances",
            EmptyReason::NoFeasibleCandidate => "no_feasible_candidate",
        }
    }
}

/// Successful outcome carrying no candidates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyOutcome {
    #[serde(rename = "error")]
    pub message: String,
    pub reason: EmptyReason,
    #[serde(rename = "current")]
    pub source: String,
    #[serde(rename = "requested")]
    pub requirement: Requirement,
}

/// Engine outcome for a well-formed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recommendation {
    Ranked(RecommendationResult),
    Empty(EmptyOutcome),
}

impl Recommendation {
    pub fn best(&self) -> Option<&Candidate> {
        match self {
            Recommendation::Ranked(result) => Some(&result.best),
            Recommendation::Empty(_) => None,
        }
    }

    /// Ranked candidates, empty for an empty outcome
    pub fn top(&self) -> &[Candidate] {
        match self {
            Recommendation::Ranked(result) => &result.top,
            Recommendation::Empty(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Recommendation::Empty(_))
    }

    /// Metric/log label for this outcome
    pub fn outcome_label(&self) -> &'static str {
        match self {
            Recommendation::Ranked(_) => "ranked",
            Recommendation::Empty(empty) => empty.reason.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfies_requires_every_dimension() {
        let spec = InstanceSpec::new("g4dn.xlarge", 4, 16384, 1);

        assert!(spec.satisfies(&Requirement::new(4, 16384, 1)));
        assert!(spec.satisfies(&Requirement::default()));
        assert!(!spec.satisfies(&Requirement::new(5, 16384, 1)));
        assert!(!spec.satisfies(&Requirement::new(4, 16385, 1)));
        assert!(!spec.satisfies(&Requirement::new(4, 16384, 2)));
    }

    #[test]
    fn test_relation_is_directional() {
        let mut relation = InterchangeabilityRelation::new();
        relation.allow("m5.large", "m5.xlarge");

        assert!(relation.allowed("m5.large", "m5.xlarge"));
        assert!(!relation.allowed("m5.xlarge", "m5.large"));
        assert!(!relation.has_row("m5.xlarge"));
    }

    #[test]
    fn test_relation_preserves_insertion_order_without_duplicates() {
        let mut relation = InterchangeabilityRelation::new();
        relation.allow("a", "c");
        relation.allow("a", "b");
        relation.allow("a", "c");

        assert_eq!(relation.targets("a").unwrap(), ["c", "b"]);
    }

    #[test]
    fn test_empty_row_is_still_a_row() {
        let mut relation = InterchangeabilityRelation::new();
        relation.add_row("a");

        assert!(relation.has_row("a"));
        assert_eq!(relation.targets("a").unwrap().len(), 0);
    }

    #[test]
    fn test_candidate_serializes_with_catalog_column_names() {
        let candidate = Candidate::from_spec(&InstanceSpec::new("c5.large", 2, 4096, 0), 1.5);
        let json = serde_json::to_value(&candidate).unwrap();

        assert_eq!(json["InstanceType"], "c5.large");
        assert_eq!(json["vCPUs"], 2);
        assert_eq!(json["MemoryMiB"], 4096);
        assert_eq!(json["GPUs"], 0);
        assert_eq!(json["Score"], 1.5);
    }

    #[test]
    fn test_empty_outcome_serializes_reason_and_message() {
        let outcome = Recommendation::Empty(EmptyOutcome {
            message: "No interchangeable instances found for x1.large.".to_string(),
            reason: EmptyReason::NoInterchangeableInstances,
            source: "x1.large".to_string(),
            requirement: Requirement::new(1, 1024, 0),
        });
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["reason"], "no_interchangeable_instances");
        assert_eq!(json["current"], "x1.large");
        assert_eq!(json["requested"]["memory_mib"], 1024);
        assert!(json["error"].as_str().unwrap().contains("x1.large"));
    }
}

//! Replacement recommendation engine
//!
//! Given a source instance type, a requirement and the two lookup tables,
//! the engine collects every instance the relation allows as a replacement,
//! drops the ones that are unknown to the catalog or too small, and ranks
//! the rest by their distance to the requirement.
//!
//! The engine performs no I/O and holds no state between calls.

mod error;
mod scoring;


pub use error::{EngineError, Lookup};
pub use scoring::{distance, MIB_PER_GIB};

use crate::models::{
    Candidate, Catalog, EmptyOutcome, EmptyReason, InterchangeabilityRelation, Recommendation,
    RecommendationResult, Requirement,
};

/// Default number of ranked candidates returned
pub const DEFAULT_TOP_N: usize = 3;

/// Recommend replacements for `source`
///
/// Returns `Err(EngineError::UnknownSource)` if `source` is missing from
/// either table. Having nothing to recommend is not an error and yields
/// `Recommendation::Empty` with the reason.
pub fn recommend(
    source: &str,
    requirement: &Requirement,
    catalog: &Catalog,
    relation: &InterchangeabilityRelation,
    limit: usize,
) -> Result<Recommendation, EngineError> {
    if !catalog.contains(source) {
        return Err(EngineError::unknown_in_catalog(source));
    }
    let targets = relation
        .targets(source)
        .ok_or_else(|| EngineError::unknown_in_relation(source))?;

    let compatible: Vec<&str> = targets
        .iter()
        .map(String::as_str)
        .filter(|target| *target != source)
        .collect();

    if compatible.is_empty() {
        return Ok(empty(
            source,
            requirement,
            EmptyReason::NoInterchangeableInstances,
            format!("No interchangeable instances found for {}.", source),
        ));
    }

    let mut candidates: Vec<Candidate> = compatible
        .iter()
        .filter_map(|name| catalog.get(name))
        .filter(|spec| spec.satisfies(requirement))
        .map(|spec| Candidate::from_spec(spec, distance(spec, requirement)))
        .collect();

    if candidates.is_empty() {
        return Ok(empty(
            source,
            requirement,
            EmptyReason::NoFeasibleCandidate,
            format!(
                "No compatible instance meets requirements (vCPU≥{}, Mem≥{} MiB, GPU≥{}).",
                requirement.vcpus, requirement.memory_mib, requirement.gpus
            ),
        ));
    }

    // sort_by is stable: equal scores keep relation order
    candidates.sort_by(|a, b| a.score.total_cmp(&b.score));

    let best = candidates[0].clone();
    candidates.truncate(limit);

    Ok(Recommendation::Ranked(RecommendationResult {
        source: source.to_string(),
        requirement: *requirement,
        best,
        top: candidates,
    }))
}

fn empty(
    source: &str,
    requirement: &Requirement,
    reason: EmptyReason,
    message: String,
) -> Recommendation {
    Recommendation::Empty(EmptyOutcome {
        message,
        reason,
        source: source.to_string(),
        requirement: *requirement,
    })
}

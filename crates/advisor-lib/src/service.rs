//! Request-level orchestration around the engine
//!
//! One call validates the request, loads both tables fresh from the named
//! bucket, runs the engine and records metrics, health and logs. Nothing is
//! cached between calls.

use crate::engine::{self, EngineError, DEFAULT_TOP_N};
use crate::health::{components, HealthRegistry};
use crate::models::{Catalog, InterchangeabilityRelation, Recommendation, Requirement};
use crate::observability::{AdvisorMetrics, StructuredLogger};
use crate::tables::{
    open_source, parse_catalog, parse_relation, SourceError, TableError, TableSource,
};
use reqwest::Client;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Recommendation request as accepted at the service boundary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default, alias = "instance_type")]
    pub current_instance_type: Option<String>,
    #[serde(default, deserialize_with = "count")]
    pub required_vcpus: u32,
    #[serde(default, deserialize_with = "count")]
    pub required_memory_mib: u64,
    #[serde(default, deserialize_with = "count")]
    pub required_gpus: u32,
    #[serde(default = "default_top_n", deserialize_with = "count")]
    pub top_n: usize,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub catalog_key: Option<String>,
    #[serde(default)]
    pub matrix_key: Option<String>,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// A count sent either as a JSON number or as a numeric string
#[derive(Deserialize)]
#[serde(untagged)]
enum CountField {
    Number(u64),
    Text(String),
}

fn count<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let invalid = || <D::Error as de::Error>::custom("expected a non-negative integer");
    let value = match CountField::deserialize(deserializer).map_err(|_| invalid())? {
        CountField::Number(n) => n,
        CountField::Text(text) => text.trim().parse::<u64>().map_err(|_| invalid())?,
    };
    T::try_from(value).map_err(|_| de::Error::custom("integer out of range"))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Validated view of a request
#[derive(Debug, Clone, Copy)]
pub struct ValidRequest<'a> {
    pub current: &'a str,
    pub requirement: Requirement,
    pub top_n: usize,
    pub bucket: &'a str,
    pub catalog_key: &'a str,
    pub matrix_key: &'a str,
}

impl RecommendationRequest {
    pub fn requirement(&self) -> Requirement {
        Requirement::new(self.required_vcpus, self.required_memory_mib, self.required_gpus)
    }

    /// Check required fields before any table is loaded
    pub fn validate(&self) -> Result<ValidRequest<'_>, ServiceError> {
        let (bucket, catalog_key, matrix_key) = match (
            non_empty(&self.bucket),
            non_empty(&self.catalog_key),
            non_empty(&self.matrix_key),
        ) {
            (Some(b), Some(c), Some(m)) => (b, c, m),
            _ => return Err(ServiceError::MissingLocation),
        };
        let current = non_empty(&self.current_instance_type).ok_or(ServiceError::MissingInstanceType)?;

        Ok(ValidRequest {
            current,
            requirement: self.requirement(),
            top_n: self.top_n,
            bucket,
            catalog_key,
            matrix_key,
        })
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Missing bucket, catalog_key, or matrix_key.")]
    MissingLocation,

    #[error("Missing current_instance_type.")]
    MissingInstanceType,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("catalog table {key}: {source}")]
    Catalog {
        key: String,
        #[source]
        source: TableError,
    },

    #[error("interchangeability table {key}: {source}")]
    Matrix {
        key: String,
        #[source]
        source: TableError,
    },

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ServiceError {
    /// Errors caused by the shape of the request rather than by the data
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidBody(_)
                | ServiceError::MissingLocation
                | ServiceError::MissingInstanceType
                | ServiceError::Source(SourceError::InvalidKey(_))
        )
    }
}

/// Both lookup tables for one request
#[derive(Debug, Clone)]
pub struct Tables {
    pub catalog: Catalog,
    pub relation: InterchangeabilityRelation,
}

/// Fetch and decode the catalog and relation from `source`
pub async fn load_tables(
    source: &dyn TableSource,
    catalog_key: &str,
    matrix_key: &str,
) -> Result<Tables, ServiceError> {
    let (catalog_bytes, matrix_bytes) =
        tokio::try_join!(source.fetch(catalog_key), source.fetch(matrix_key))?;

    let catalog = parse_catalog(&catalog_bytes).map_err(|source| ServiceError::Catalog {
        key: catalog_key.to_string(),
        source,
    })?;
    let relation = parse_relation(&matrix_bytes).map_err(|source| ServiceError::Matrix {
        key: matrix_key.to_string(),
        source,
    })?;

    Ok(Tables { catalog, relation })
}

/// Serves recommendation requests against tables named in each request
#[derive(Clone)]
pub struct RecommendationService {
    data_root: PathBuf,
    client: Client,
    metrics: AdvisorMetrics,
    logger: StructuredLogger,
    health: HealthRegistry,
}

impl RecommendationService {
    pub fn new(
        data_root: impl Into<PathBuf>,
        client: Client,
        metrics: AdvisorMetrics,
        logger: StructuredLogger,
        health: HealthRegistry,
    ) -> Self {
        Self {
            data_root: data_root.into(),
            client,
            metrics,
            logger,
            health,
        }
    }

    /// Record a request whose body could not be decoded
    pub fn reject_body(&self, message: impl Into<String>) -> ServiceError {
        let err = ServiceError::InvalidBody(message.into());
        self.metrics.inc_requests_rejected();
        self.logger.log_failure(None, &err);
        err
    }

    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Recommendation, ServiceError> {
        let result = self.recommend_inner(request).await;
        if let Err(e) = &result {
            if e.is_client_error() {
                self.metrics.inc_requests_rejected();
            }
            self.logger
                .log_failure(request.current_instance_type.as_deref(), e);
        }
        result
    }

    async fn recommend_inner(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Recommendation, ServiceError> {
        let valid = request.validate()?;
        let source = open_source(valid.bucket, &self.data_root, &self.client)?;

        let started = Instant::now();
        let tables = match load_tables(source.as_ref(), valid.catalog_key, valid.matrix_key).await {
            Ok(tables) => {
                self.health.set_healthy(components::TABLE_SOURCE).await;
                tables
            }
            Err(e) if e.is_client_error() => return Err(e),
            Err(e) => {
                self.metrics.inc_table_errors();
                self.health
                    .set_degraded(components::TABLE_SOURCE, e.to_string())
                    .await;
                return Err(e);
            }
        };
        let elapsed = started.elapsed();
        self.metrics
            .observe_table_load_latency(source.kind(), elapsed.as_secs_f64());
        self.logger.log_tables_loaded(
            &source.describe(),
            tables.catalog.len(),
            tables.relation.len(),
            elapsed.as_secs_f64() * 1000.0,
        );

        self.run_engine(&valid, &tables).await
    }

    async fn run_engine(
        &self,
        valid: &ValidRequest<'_>,
        tables: &Tables,
    ) -> Result<Recommendation, ServiceError> {
        let started = Instant::now();
        let outcome = engine::recommend(
            valid.current,
            &valid.requirement,
            &tables.catalog,
            &tables.relation,
            valid.top_n,
        );
        self.metrics
            .observe_recommendation_latency(started.elapsed().as_secs_f64());
        self.health.set_healthy(components::ENGINE).await;

        match outcome {
            Ok(recommendation) => {
                self.metrics.inc_outcome(recommendation.outcome_label());
                self.metrics
                    .observe_candidates_returned(recommendation.top().len());
                self.logger.log_recommendation(&recommendation, valid.top_n);
                Ok(recommendation)
            }
            Err(e) => {
                self.metrics.inc_outcome("unknown_source");
                Err(e.into())
            }
        }
    }
}

//! Library for the instance advisor
//!
//! This crate provides:
//! - Instance catalog and interchangeability relation models
//! - CSV decoding of both tables and fetching them from disk or HTTP
//! - The replacement recommendation engine
//! - Request orchestration, health checks and observability

pub mod engine;
pub mod health;
pub mod models;
pub mod observability;
pub mod service;
pub mod tables;

pub use engine::{recommend, EngineError, DEFAULT_TOP_N};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{AdvisorMetrics, StructuredLogger};
pub use service::{RecommendationRequest, RecommendationService, ServiceError};

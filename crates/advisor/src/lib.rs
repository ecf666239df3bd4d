//! Instance Advisor HTTP service
//!
//! Exposes the recommendation engine over HTTP together with health,
//! readiness and Prometheus metrics endpoints.

pub mod api;
pub mod config;

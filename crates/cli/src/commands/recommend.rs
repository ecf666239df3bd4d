//! Recommendation commands: via the advisor service or against local files

use advisor_lib::tables::{parse_catalog, parse_relation};
use advisor_lib::{recommend, Catalog, InterchangeabilityRelation, RecommendationRequest, Requirement};
use anyhow::{Context, Result};
use std::path::Path;

use crate::client::ApiClient;
use crate::output::{print_recommendation, OutputFormat};

/// Ask the advisor service for a recommendation
pub async fn recommend_remote(
    client: &ApiClient,
    request: &RecommendationRequest,
    format: OutputFormat,
) -> Result<()> {
    request
        .validate()
        .context("Incomplete request; set --bucket/--catalog-key/--matrix-key or save them with `iadv config set`")?;

    let recommendation = client.recommend(request).await?;
    print_recommendation(&recommendation, format)
}

/// Run the engine in-process against CSV files on disk
pub async fn recommend_local(
    catalog_path: &Path,
    matrix_path: &Path,
    current: &str,
    requirement: Requirement,
    top_n: usize,
    format: OutputFormat,
) -> Result<()> {
    let (catalog, relation) = load_local_tables(catalog_path, matrix_path).await?;

    let recommendation = recommend(current, &requirement, &catalog, &relation, top_n)?;
    print_recommendation(&recommendation, format)
}

/// Read and decode both tables from local files
pub async fn load_local_tables(
    catalog_path: &Path,
    matrix_path: &Path,
) -> Result<(Catalog, InterchangeabilityRelation)> {
    let catalog_bytes = tokio::fs::read(catalog_path)
        .await
        .with_context(|| format!("Failed to read catalog {}", catalog_path.display()))?;
    let matrix_bytes = tokio::fs::read(matrix_path)
        .await
        .with_context(|| format!("Failed to read matrix {}", matrix_path.display()))?;

    let catalog = parse_catalog(&catalog_bytes)
        .with_context(|| format!("Invalid catalog {}", catalog_path.display()))?;
    let relation = parse_relation(&matrix_bytes)
        .with_context(|| format!("Invalid matrix {}", matrix_path.display()))?;

    Ok((catalog, relation))
}

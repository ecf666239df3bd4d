//! Show an instance's spec and what may replace it

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use super::recommend::load_local_tables;
use crate::output::{format_memory_mib, print_json, print_warning, OutputFormat};
use advisor_lib::{Catalog, InstanceSpec, InterchangeabilityRelation};

#[derive(Tabled)]
struct TargetRow {
    #[tabled(rename = "Replacement")]
    name: String,
    #[tabled(rename = "vCPUs")]
    vcpus: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "GPUs")]
    gpus: String,
    #[tabled(rename = "Catalog")]
    status: String,
}

/// Everything the tables say about one instance type
#[derive(Debug, Serialize)]
pub struct InstanceReport {
    pub instance: String,
    pub spec: Option<InstanceSpec>,
    pub in_relation: bool,
    /// Allowed replacements in relation order, self excluded
    pub replacements: Vec<String>,
    /// Replacements absent from the catalog, which the engine skips
    pub unknown_replacements: Vec<String>,
}

pub fn build_report(
    instance: &str,
    catalog: &Catalog,
    relation: &InterchangeabilityRelation,
) -> InstanceReport {
    let replacements: Vec<String> = relation
        .targets(instance)
        .unwrap_or_default()
        .iter()
        .filter(|t| t.as_str() != instance)
        .cloned()
        .collect();
    let unknown_replacements = replacements
        .iter()
        .filter(|t| !catalog.contains(t))
        .cloned()
        .collect();

    InstanceReport {
        instance: instance.to_string(),
        spec: catalog.get(instance).cloned(),
        in_relation: relation.has_row(instance),
        replacements,
        unknown_replacements,
    }
}

pub async fn inspect_instance(
    catalog_path: &Path,
    matrix_path: &Path,
    instance: &str,
    format: OutputFormat,
) -> Result<()> {
    let (catalog, relation) = load_local_tables(catalog_path, matrix_path).await?;
    let report = build_report(instance, &catalog, &relation);

    if let OutputFormat::Json = format {
        return print_json(&report);
    }

    println!("{}", format!("Instance {}", instance).bold());
    println!("{}", "=".repeat(60));
    match &report.spec {
        Some(spec) => println!(
            "vCPUs: {}  Memory: {}  GPUs: {}",
            spec.vcpus,
            format_memory_mib(spec.memory_mib),
            spec.gpus
        ),
        None => print_warning("Not in catalog; recommendations for it will fail"),
    }
    if !report.in_relation {
        print_warning("No row in interchangeability matrix; recommendations for it will fail");
        return Ok(());
    }
    println!();

    if report.replacements.is_empty() {
        print_warning("Matrix lists no replacements");
        return Ok(());
    }

    let rows: Vec<TargetRow> = report
        .replacements
        .iter()
        .map(|name| match catalog.get(name) {
            Some(spec) => TargetRow {
                name: name.clone(),
                vcpus: spec.vcpus.to_string(),
                memory: format_memory_mib(spec.memory_mib),
                gpus: spec.gpus.to_string(),
                status: "✓".green().to_string(),
            },
            None => TargetRow {
                name: name.clone(),
                vcpus: "-".to_string(),
                memory: "-".to_string(),
                gpus: "-".to_string(),
                status: "unknown".yellow().to_string(),
            },
        })
        .collect();

    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
    println!("\nTotal: {} replacements", report.replacements.len());

    Ok(())
}

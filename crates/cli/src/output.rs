//! Output formatting utilities

use advisor_lib::{Candidate, Recommendation, Requirement};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Row for ranked candidates table
#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Instance")]
    name: String,
    #[tabled(rename = "vCPUs")]
    vcpus: u32,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "GPUs")]
    gpus: u32,
    #[tabled(rename = "Score")]
    score: String,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format MiB as GiB with two decimals
pub fn format_memory_mib(mib: u64) -> String {
    format!("{:.2} GiB", mib as f64 / 1024.0)
}

pub fn format_score(score: f64) -> String {
    format!("{:.3}", score)
}

pub fn format_requirement(requirement: &Requirement) -> String {
    format!(
        "vCPU≥{}, Mem≥{}, GPU≥{}",
        requirement.vcpus,
        format_memory_mib(requirement.memory_mib),
        requirement.gpus
    )
}

/// Color a health status string
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" | "ready" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" | "not ready" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Render a recommendation outcome
pub fn print_recommendation(recommendation: &Recommendation, format: OutputFormat) -> anyhow::Result<()> {
    if let OutputFormat::Json = format {
        return print_json(recommendation);
    }

    match recommendation {
        Recommendation::Ranked(result) => {
            println!("Current:   {}", result.source.cyan());
            println!("Requested: {}", format_requirement(&result.requirement));
            println!();

            if result.top.is_empty() {
                print_warning("Result limit is 0; showing best match only");
                print_candidates(std::slice::from_ref(&result.best));
            } else {
                print_candidates(&result.top);
            }
            println!();
            print_success(&format!(
                "Best replacement: {} (score {})",
                result.best.name.bold(),
                format_score(result.best.score)
            ));
        }
        Recommendation::Empty(empty) => {
            print_warning(&empty.message);
            print_info(&format!("Reason: {}", empty.reason.as_str()));
        }
    }
    Ok(())
}

fn print_candidates(candidates: &[Candidate]) {
    let rows: Vec<CandidateRow> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| CandidateRow {
            rank: i + 1,
            name: c.name.clone(),
            vcpus: c.vcpus,
            memory: format_memory_mib(c.memory_mib),
            gpus: c.gpus,
            score: format_score(c.score),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

//! Advisor service health

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, print_json, OutputFormat};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;
    let readiness = client.readiness().await?;

    if let OutputFormat::Json = format {
        return print_json(&json!({ "health": health, "readiness": readiness }));
    }

    let status = serde_json::to_value(health.status)?
        .as_str()
        .unwrap_or_default()
        .to_string();
    println!("{} {}", "Status:".bold(), color_status(&status));
    let ready = if readiness.ready { "ready" } else { "not ready" };
    println!("{} {}", "Ready: ".bold(), color_status(ready));
    if let Some(reason) = &readiness.reason {
        println!("        {}", reason);
    }
    println!();

    let mut rows: Vec<ComponentRow> = health
        .components
        .iter()
        .map(|(name, component)| {
            let status = serde_json::to_value(component.status)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            ComponentRow {
                name: name.clone(),
                status: color_status(&status),
                message: component.message.clone().unwrap_or_default(),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);

    Ok(())
}

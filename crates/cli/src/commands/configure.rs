//! Persisted CLI defaults

use anyhow::Result;

use crate::config::Config;
use crate::output::{print_info, print_json, print_success, OutputFormat};

pub fn show_config(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Table => {
            let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "(unset)".to_string());
            println!("api_url:     {}", show(&config.api_url));
            println!("bucket:      {}", show(&config.bucket));
            println!("catalog_key: {}", show(&config.catalog_key));
            println!("matrix_key:  {}", show(&config.matrix_key));
            Ok(())
        }
    }
}

pub fn set_config(mut config: Config, updates: Config) -> Result<()> {
    if updates == Config::default() {
        print_info("Nothing to set");
        return Ok(());
    }

    config.merge(updates);
    let path = config.save()?;
    print_success(&format!("Saved {}", path.display()));
    Ok(())
}

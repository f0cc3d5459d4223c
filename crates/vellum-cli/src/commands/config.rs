//! Config command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use vellum_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            output.print_json(&serde_json::json!({
                "backend_url": config.backend_url,
                "auth_token": config.auth_token.as_ref().map(|_| "********"),
                "local_dir": config.local_dir,
                "request_timeout_secs": config.request_timeout_secs,
                "log_file": config.log_file
            }));
        }
        OutputFormat::Quiet => {
            println!("{}", config.backend_description());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            let not_set = || "(not set)".to_string();
            println!("Configuration:");
            println!("  backend_url:          {}", config.backend_url);
            println!(
                "  auth_token:           {}",
                config
                    .auth_token
                    .as_ref()
                    .map(|_| "********".to_string())
                    .unwrap_or_else(not_set)
            );
            println!(
                "  local_dir:            {}",
                config
                    .local_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(not_set)
            );
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!(
                "  log_file:             {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(not_set)
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
///
/// Only the file is rewritten; environment overrides are not persisted.
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);

    let mut config = Config::read_file(&save_path).context("Failed to load configuration")?;
    let value = if value == "none" { String::new() } else { value };
    config.set(&key, &value)?;

    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if key == "auth_token" && !value.is_empty() {
        "********"
    } else {
        value.as_str()
    };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

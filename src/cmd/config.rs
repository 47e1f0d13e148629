//! Configuration view and validation commands: `pipeline config`.

use anyhow::Result;

use pipeline::config::{PipelineConfig, PipelineToml};

use super::super::ConfigCommands;

pub fn cmd_config(config: &PipelineConfig, command: Option<ConfigCommands>) -> Result<()> {
    let config_dir = config.config_dir();
    let config_path = config.config_path();

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Pipeline Configuration");
            println!("======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No pipeline.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let toml = &config.toml;
            println!("[api]");
            println!("  base_url = \"{}\"", toml.api.base_url);
            println!("  timeout_secs = {}", toml.api.timeout_secs);
            println!();
            println!("[cache]");
            println!("  stale_secs = {}", toml.cache.stale_secs);
            println!();
            println!("[logging]");
            println!("  format = \"{}\"", toml.logging.format);
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  api_base_url = \"{}\"", config.api_base_url());
            println!("  request_timeout = {}s", config.request_timeout().as_secs());
            println!("  log_format = \"{}\"", config.log_format());
            println!("  session = {}", config.session_path().display());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No pipeline.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = PipelineToml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("pipeline.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if !config_dir.exists() {
                std::fs::create_dir_all(&config_dir)?;
            }

            PipelineToml::default().save(&config_path)?;

            println!("Created pipeline.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, timeout_secs");
            println!("  - [cache] stale_secs");
            println!("  - [logging] format");
            println!();
        }
    }

    Ok(())
}

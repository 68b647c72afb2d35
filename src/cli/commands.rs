//! CLI command handlers

use crate::core::{Config, Result};
use crate::pipeline::VideoPipeline;

/// Drive the video pipeline on one instruction
pub async fn run_pipeline(config: &Config, instruction: &str, preflight: bool) -> Result<()> {
    let mut pipeline = VideoPipeline::from_config(config)?;

    if preflight {
        println!("Checking backends...");
        pipeline.preflight().await?;
        println!(
            "  ✓ planner:   {} at {}",
            config.planner.model, config.planner.base_url
        );
        println!(
            "  ✓ describer: {} at {}",
            config.describer.model, config.describer.base_url
        );
    }

    let published = pipeline.run(instruction).await?;

    println!(
        "\nRun complete: {} message(s) published, {} in transcript",
        published.len(),
        pipeline.transcript().len()
    );

    Ok(())
}

/// Show the effective configuration
pub fn show_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| crate::core::TroupeError::config(e.to_string()))?;
    println!("# Effective configuration");
    println!("# File: {}", Config::config_file().display());
    println!("{}", rendered);
    Ok(())
}

/// Write a default config file if none exists
pub fn init_config() -> Result<()> {
    if Config::config_exists() {
        println!(
            "Config already exists at {}",
            Config::config_file().display()
        );
        return Ok(());
    }

    let path = Config::default().save_and_get_path()?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

/// Print the config file path
pub fn config_path() -> Result<()> {
    println!("{}", Config::config_file().display());
    Ok(())
}

//! `chatline config`: show the effective configuration.

use chatline_config::AppConfig;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("# {}", AppConfig::config_dir().join("config.toml").display());
    println!(
        "# api key: {}",
        if config.has_api_key() { "set" } else { "not set" }
    );
    println!();
    println!("{}", config.to_toml());
    Ok(())
}

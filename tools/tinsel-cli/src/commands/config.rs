//! Show or write the effective configuration.

use tinsel_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, write: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if write {
        config.validate()?;
        config.save()?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let origin = if path.exists() { "file" } else { "defaults" };
    println!("Config: {} ({origin})", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

//! Config command implementation.
//!
//! Runs before settings are loaded, so `path` and `init` keep working when the
//! file on disk is malformed or fails validation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command against `config_path`, or the default path.
pub fn run_config(action: &ConfigAction, config_path: Option<&str>) -> Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let settings = Settings::load_from(Some(&path))?;
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", path.display());
        }

        ConfigAction::Init { force } => {
            if path.exists() && !force {
                Output::warning(&format!("Config already exists at {}", path.display()));
                Output::info("Use --force to overwrite it with defaults.");
                return Ok(());
            }
            Settings::default().save_to(&path)?;
            Output::success(&format!("Wrote default config to {}", path.display()));
        }
    }

    Ok(())
}

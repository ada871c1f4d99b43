//! Config command implementation.

use std::path::Path;

use anyhow::{Result, bail};

use spinrig_cli::config::Config;

use crate::cli::ConfigAction;

pub fn cmd_config(action: ConfigAction, path: &Path, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "Config already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save_to(path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

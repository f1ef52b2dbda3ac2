//! Config command implementation.

use crate::cli::ConfigAction;
use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Run the config command.
pub fn run_config(action: &ConfigAction, config_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load_from(config_path)?;
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", Settings::resolve_path(config_path).display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_show_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("podbrief.toml");
        std::fs::write(&path, "[digest]\ndays = 3\n").unwrap();

        run_config(&ConfigAction::Show, Some(path.as_path())).unwrap();
        run_config(&ConfigAction::Path, Some(path.as_path())).unwrap();
    }

    #[test]
    fn test_show_missing_config_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(run_config(&ConfigAction::Show, Some(path.as_path())).is_err());
        // The path is still reported for a file that does not exist yet.
        run_config(&ConfigAction::Path, Some(path.as_path())).unwrap();
    }
}

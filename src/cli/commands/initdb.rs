//! Initdb command implementation.

use super::open_catalog;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the initdb command.
pub fn run_initdb(settings: &Settings) -> Result<()> {
    for dir in [
        settings.data_dir(),
        settings.transcript_dir(),
        settings.summary_dir(),
        settings.digest_dir(),
    ] {
        std::fs::create_dir_all(&dir)?;
        Output::kv("Directory", &dir.display().to_string());
    }

    open_catalog(settings)?;
    Output::success(&format!("Catalog ready at {}", settings.db_path().display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::settings_in;
    use tempfile::TempDir;

    #[test]
    fn test_initdb_creates_dirs_and_catalog() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(dir.path());

        run_initdb(&settings).unwrap();
        for path in [
            settings.data_dir(),
            settings.transcript_dir(),
            settings.summary_dir(),
            settings.digest_dir(),
        ] {
            assert!(path.is_dir(), "{} missing", path.display());
        }
        assert!(settings.db_path().is_file());

        // Running twice is harmless.
        run_initdb(&settings).unwrap();
    }
}

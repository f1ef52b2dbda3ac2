//! CLI command implementations.

mod config;
mod digest;
mod fetch;
mod initdb;
mod purge;
mod status;
mod summarize;
mod transcribe;

pub use config::run_config;
pub use digest::run_digest;
pub use fetch::run_fetch;
pub use initdb::run_initdb;
pub use purge::run_purge;
pub use status::run_status;
pub use summarize::run_summarize;
pub use transcribe::run_transcribe;

use crate::catalog::Catalog;
use crate::config::Settings;
use anyhow::{Context, Result};

/// Open the catalog named in settings.
fn open_catalog(settings: &Settings) -> Result<Catalog> {
    let path = settings.db_path();
    Catalog::open(&path).with_context(|| format!("Failed to open catalog at {}", path.display()))
}

/// Per-episode tallies of a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BatchCounts {
    success: usize,
    failed: usize,
}

/// Settings with every path under `dir`.
#[cfg(test)]
fn settings_in(dir: &std::path::Path) -> Settings {
    let path = |name: &str| dir.join(name).to_string_lossy().into_owned();
    let mut settings = Settings::default();
    settings.general.data_dir = path("data");
    settings.general.transcript_dir = path("data/transcripts");
    settings.general.summary_dir = path("data/summaries");
    settings.general.db_path = path("podbrief.db");
    settings.digest.output_dir = path("data/digests");
    settings
}

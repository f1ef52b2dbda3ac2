//! Status command implementation.

use super::open_catalog;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the status command.
pub fn run_status(settings: &Settings) -> Result<()> {
    let catalog = open_catalog(settings)?;
    let stats = catalog.stats()?;

    Output::header("Catalog Statistics");
    Output::kv("Catalog", &settings.db_path().display().to_string());
    Output::count("Episodes", stats.total_episodes);
    Output::count("Transcripts", stats.with_transcripts);
    Output::count("Summaries", stats.with_summaries);
    Output::count("On disk", stats.transcripts_on_disk);

    if !stats.by_channel.is_empty() {
        Output::header("Episodes by Channel");
        for (channel, n) in &stats.by_channel {
            Output::count(channel, *n);
        }
    }

    Ok(())
}

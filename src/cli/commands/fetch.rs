//! Fetch command implementation.

use super::open_catalog;
use crate::catalog::InsertOutcome;
use crate::cli::Output;
use crate::config::Settings;
use crate::youtube::YouTubeClient;
use anyhow::Result;

/// Run the fetch command.
pub async fn run_fetch(settings: &Settings) -> Result<()> {
    if settings.channels.is_empty() {
        Output::warning("No channels configured. Add [[channels]] entries to the config file.");
        return Ok(());
    }

    let client = YouTubeClient::from_settings(&settings.fetch)?;
    let catalog = open_catalog(settings)?;

    Output::info("Starting episode fetch from YouTube...");

    let mut episodes = Vec::new();
    for channel in &settings.channels {
        let spinner = Output::spinner(&format!("Listing {}...", channel.name));
        let found = client
            .channel_episodes(channel, settings.fetch.max_per_channel)
            .await;
        spinner.finish_and_clear();
        Output::list_item(&format!("{}: {} episodes", channel.name, found.len()));
        episodes.extend(found);
    }

    let mut inserted = 0;
    let mut existing = 0;
    let mut errors = 0;

    let pb = Output::progress_bar(episodes.len() as u64, "Inserting into catalog");
    for episode in &episodes {
        match catalog.insert_episode(episode) {
            Ok(InsertOutcome::Inserted) => inserted += 1,
            Ok(InsertOutcome::AlreadyExisted) => existing += 1,
            Err(e) => {
                tracing::error!("Error inserting {}: {}", episode.video_id, e);
                errors += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Output::header("Fetch Results");
    Output::count("Total fetched", episodes.len());
    Output::count("Newly inserted", inserted);
    Output::count("Already existed", existing);
    if errors > 0 {
        Output::count("Errors", errors);
    }
    Output::success("Fetch complete");

    Ok(())
}

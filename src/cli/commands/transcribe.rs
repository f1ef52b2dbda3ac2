//! Transcribe command implementation.

use super::{open_catalog, BatchCounts};
use crate::archive::{episode_file_path, write_text};
use crate::catalog::{Catalog, Episode};
use crate::cli::output::short_title;
use crate::cli::Output;
use crate::config::Settings;
use crate::transcript::TranscriptFetcher;
use anyhow::Result;
use indicatif::ProgressBar;
use std::path::Path;

/// Run the transcribe command.
pub async fn run_transcribe(recent: usize, settings: &Settings) -> Result<()> {
    let catalog = open_catalog(settings)?;
    let fetcher = TranscriptFetcher::from_settings(&settings.transcripts)?;
    let transcript_dir = settings.transcript_dir();

    Output::info(&format!("Fetching transcripts for {} recent episodes...", recent));

    let episodes = catalog.episodes_without_transcript(recent)?;
    if episodes.is_empty() {
        Output::warning("No episodes need transcription");
        return Ok(());
    }

    let pb = Output::progress_bar(episodes.len() as u64, "Processing episodes");
    let counts = transcribe_batch(&catalog, &fetcher, &transcript_dir, &episodes, &pb).await;
    pb.finish_and_clear();

    Output::header("Transcription Results");
    Output::count("Successful", counts.success);
    Output::count("Failed", counts.failed);
    Output::success("Transcription complete");

    Ok(())
}

/// Transcribe each episode in turn. A failing episode is logged and counted,
/// then the batch moves on.
async fn transcribe_batch(
    catalog: &Catalog,
    fetcher: &TranscriptFetcher,
    transcript_dir: &Path,
    episodes: &[Episode],
    pb: &ProgressBar,
) -> BatchCounts {
    let mut counts = BatchCounts::default();
    for episode in episodes {
        pb.set_message(short_title(&episode.title, 40));
        match transcribe_episode(catalog, fetcher, transcript_dir, episode).await {
            Ok(true) => counts.success += 1,
            Ok(false) => counts.failed += 1,
            Err(e) => {
                tracing::error!("Error processing {}: {:#}", episode.video_id, e);
                counts.failed += 1;
            }
        }
        pb.inc(1);
    }
    counts
}

/// Fetch, archive and record one transcript. `Ok(false)` when no provider delivered.
async fn transcribe_episode(
    catalog: &Catalog,
    fetcher: &TranscriptFetcher,
    transcript_dir: &Path,
    episode: &Episode,
) -> Result<bool> {
    let Some(fetched) = fetcher.fetch(&episode.video_id, &episode.title).await else {
        return Ok(false);
    };

    let path = episode_file_path(transcript_dir, &episode.video_id, &episode.title);
    write_text(&path, &fetched.text)?;

    let record = fetched.into_record(Some(path));
    catalog.update_transcript(&episode.video_id, &record)?;
    Ok(true)
}

//! Summarize command implementation.

use super::{open_catalog, BatchCounts};
use crate::archive::{episode_file_path, write_text};
use crate::catalog::{Catalog, Episode};
use crate::cli::output::short_title;
use crate::cli::Output;
use crate::config::Settings;
use crate::summarize::Summarizer;
use anyhow::Result;
use indicatif::ProgressBar;
use std::path::Path;

/// Run the summarize command.
pub async fn run_summarize(recent: usize, settings: &Settings) -> Result<()> {
    let catalog = open_catalog(settings)?;
    let mut summarizer = Summarizer::from_settings(settings)?;
    let summary_dir = settings.summary_dir();

    Output::info(&format!("Generating summaries for {} recent episodes...", recent));

    if !summarizer.client().check_health().await {
        Output::warning(&format!(
            "Ollama not reachable at {}; attempting anyway",
            settings.summarize.host
        ));
    }

    let episodes = catalog.episodes_without_summary(recent)?;
    if episodes.is_empty() {
        Output::warning("No episodes need summarization");
        return Ok(());
    }

    let pb = Output::progress_bar(episodes.len() as u64, "Summarizing");
    let counts = summarize_batch(&catalog, &mut summarizer, &summary_dir, &episodes, &pb).await;
    pb.finish_and_clear();

    Output::header("Summarization Results");
    Output::count("Successful", counts.success);
    Output::count("Failed", counts.failed);
    Output::success("Summarization complete");

    Ok(())
}

/// Summarize each episode in turn, counting failures without stopping.
async fn summarize_batch(
    catalog: &Catalog,
    summarizer: &mut Summarizer,
    summary_dir: &Path,
    episodes: &[Episode],
    pb: &ProgressBar,
) -> BatchCounts {
    let mut counts = BatchCounts::default();
    for episode in episodes {
        pb.set_message(short_title(&episode.title, 40));
        match summarize_episode(catalog, summarizer, summary_dir, episode).await {
            Ok(true) => counts.success += 1,
            Ok(false) => counts.failed += 1,
            Err(e) => {
                tracing::error!("Error summarizing {}: {:#}", episode.video_id, e);
                counts.failed += 1;
            }
        }
        pb.inc(1);
    }
    counts
}

/// Summarize one episode, archive the summary and record it.
async fn summarize_episode(
    catalog: &Catalog,
    summarizer: &mut Summarizer,
    summary_dir: &Path,
    episode: &Episode,
) -> Result<bool> {
    let Some(transcript) = episode.transcript.as_ref() else {
        return Ok(false);
    };

    let summary = summarizer
        .summarize(&transcript.text, Some(episode.channel_title.as_str()), &episode.title)
        .await;
    let Some(summary) = summary else {
        return Ok(false);
    };

    let path = episode_file_path(summary_dir, &episode.video_id, &episode.title);
    write_text(&path, &summary)?;

    let model = summarizer.model().to_string();
    catalog.update_summary(&episode.video_id, &summary, &model)?;
    Ok(true)
}

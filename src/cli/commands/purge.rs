//! Purge command implementation.

use super::open_catalog;
use crate::archive::{purge_transcripts, PurgeOutcome};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the purge command.
pub fn run_purge(dry_run: bool, settings: &Settings) -> Result<()> {
    let catalog = open_catalog(settings)?;

    if dry_run {
        Output::info("Dry run: verifying transcript files without deleting");
    } else {
        Output::info("Purging transcript files...");
    }

    let spinner = Output::spinner("Verifying checksums...");
    let report = purge_transcripts(&catalog, dry_run)?;
    spinner.finish_and_clear();

    if report.outcomes.is_empty() {
        Output::warning("No transcripts to purge");
        return Ok(());
    }

    for (video_id, outcome) in &report.outcomes {
        match outcome {
            PurgeOutcome::Mismatch { expected, actual } => Output::error(&format!(
                "{}: checksum mismatch (expected {}, got {}), kept",
                video_id, expected, actual
            )),
            PurgeOutcome::Failed(reason) => Output::error(&format!("{}: {}", video_id, reason)),
            PurgeOutcome::WouldDelete => Output::list_item(&format!("Would delete {}", video_id)),
            PurgeOutcome::Missing | PurgeOutcome::Deleted => {}
        }
    }

    Output::header("Purge Results");
    if dry_run {
        Output::count("Would delete", report.deleted);
    } else {
        Output::count("Deleted", report.deleted);
    }
    Output::count("Mismatches", report.mismatched);
    Output::count("Missing", report.missing);
    Output::count("Errors", report.errors);
    Output::success("Purge complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{episode_file_path, write_text};
    use crate::catalog::{NewEpisode, TranscriptRecord};
    use crate::cli::commands::settings_in;
    use tempfile::TempDir;

    #[test]
    fn test_purge_on_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(dir.path());

        run_purge(false, &settings).unwrap();
        run_purge(true, &settings).unwrap();
    }

    #[test]
    fn test_dry_run_keeps_file_then_purge_deletes() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(dir.path());
        let path = episode_file_path(&settings.transcript_dir(), "vid1", "Ep");
        write_text(&path, "text").unwrap();

        {
            let catalog = open_catalog(&settings).unwrap();
            catalog
                .insert_episode(&NewEpisode {
                    video_id: "vid1".to_string(),
                    channel_id: None,
                    channel_title: "Chan".to_string(),
                    title: "Ep".to_string(),
                    url: String::new(),
                    published_at: None,
                })
                .unwrap();
            catalog
                .update_transcript(
                    "vid1",
                    &TranscriptRecord {
                        text: "text".to_string(),
                        provider: "p".to_string(),
                        language: "en".to_string(),
                        checksum: crate::archive::sha256_hex("text"),
                        length: 4,
                        path: Some(path.clone()),
                        on_disk: true,
                    },
                )
                .unwrap();
        }

        run_purge(true, &settings).unwrap();
        assert!(path.exists());

        run_purge(false, &settings).unwrap();
        assert!(!path.exists());
        let catalog = open_catalog(&settings).unwrap();
        let record = catalog.get_episode("vid1").unwrap().unwrap().transcript.unwrap();
        assert!(!record.on_disk);
        assert_eq!(record.text, "text");
    }
}

//! Digest command implementation.

use super::open_catalog;
use crate::catalog::days_ago;
use crate::cli::Output;
use crate::config::Settings;
use crate::digest::{render, write_previews};
use anyhow::Result;
use chrono::Utc;

/// Run the digest command.
pub fn run_digest(days: Option<u32>, settings: &Settings) -> Result<()> {
    let days = days.unwrap_or(settings.digest.days);
    let catalog = open_catalog(settings)?;

    Output::info("Generating digest...");

    let episodes = catalog.recent_summaries(days)?;
    if episodes.is_empty() {
        Output::warning(&format!("No episodes summarized in the past {} days", days));
        return Ok(());
    }
    Output::info(&format!("Found {} episodes from the past {} days", episodes.len(), days));

    let end = Utc::now();
    let start = days_ago(days);
    let digest = render(&episodes, start, end);
    let files = write_previews(&settings.digest_dir(), &digest)?;

    Output::kv("Markdown", &files.markdown.display().to_string());
    Output::kv("Text", &files.text.display().to_string());
    Output::success("Digest previews saved");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, NewEpisode, TranscriptRecord};
    use crate::cli::commands::settings_in;
    use tempfile::TempDir;

    fn summarized(settings: &Settings, video_id: &str) {
        let catalog = Catalog::open(&settings.db_path()).unwrap();
        catalog
            .insert_episode(&NewEpisode {
                video_id: video_id.to_string(),
                channel_id: None,
                channel_title: "Chan".to_string(),
                title: "Ep".to_string(),
                url: String::new(),
                published_at: None,
            })
            .unwrap();
        catalog
            .update_transcript(
                video_id,
                &TranscriptRecord {
                    text: "text".to_string(),
                    provider: "p".to_string(),
                    language: "en".to_string(),
                    checksum: crate::archive::sha256_hex("text"),
                    length: 4,
                    path: None,
                    on_disk: false,
                },
            )
            .unwrap();
        catalog.update_summary(video_id, "# Summary\n\nPoint.", "m").unwrap();
    }

    #[test]
    fn test_empty_window_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(dir.path());

        run_digest(Some(7), &settings).unwrap();
        assert!(!settings.digest_dir().join("digest.md").exists());
        assert!(!settings.digest_dir().join("digest.txt").exists());
    }

    #[test]
    fn test_huge_window_writes_previews() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(dir.path());
        summarized(&settings, "vid1");

        run_digest(Some(u32::MAX), &settings).unwrap();
        let markdown = std::fs::read_to_string(settings.digest_dir().join("digest.md")).unwrap();
        assert!(markdown.contains("Chan"));
        assert!(settings.digest_dir().join("digest.txt").is_file());
    }
}

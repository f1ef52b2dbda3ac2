//! Digest of recently summarized episodes.
//!
//! Episodes are grouped by channel in the order the catalog returns them and
//! rendered as markdown and plain text previews.

use crate::archive::write_text;
use crate::catalog::Episode;
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Rendered digest bodies.
#[derive(Debug, Clone)]
pub struct Digest {
    pub markdown: String,
    pub text: String,
    pub episode_count: usize,
}

/// Preview files written by [`write_previews`].
#[derive(Debug, Clone)]
pub struct DigestFiles {
    pub markdown: PathBuf,
    pub text: PathBuf,
}

/// Episodes grouped by channel title, keeping first-seen order.
fn group_by_channel(episodes: &[Episode]) -> Vec<(&str, Vec<&Episode>)> {
    let mut groups: Vec<(&str, Vec<&Episode>)> = Vec::new();
    for episode in episodes {
        let channel = episode.channel_title.as_str();
        match groups.iter_mut().find(|(name, _)| *name == channel) {
            Some((_, list)) => list.push(episode),
            None => groups.push((channel, vec![episode])),
        }
    }
    groups
}

fn channel_label(name: &str) -> &str {
    if name.trim().is_empty() {
        "Unknown channel"
    } else {
        name
    }
}

fn published(episode: &Episode) -> String {
    episode
        .published_at
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}

/// Push summary headings below the digest's own channel and episode levels.
fn demote_headings(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| {
            let level = line.chars().take_while(|c| *c == '#').count();
            if level > 0 && line[level..].starts_with(' ') {
                format!("{} {}", "#".repeat((level + 3).min(6)), line[level..].trim_start())
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_headings(markdown: &str) -> String {
    markdown
        .lines()
        .map(|line| line.trim_start_matches('#').trim_start())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a digest covering `[start, end]`.
pub fn render(episodes: &[Episode], start: DateTime<Utc>, end: DateTime<Utc>) -> Digest {
    let range = format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"));
    let mut markdown = format!("# Podcast Digest ({})\n\n", range);
    let mut text = format!("PODCAST DIGEST ({})\n\n", range);

    if episodes.is_empty() {
        markdown.push_str("No new summaries.\n");
        text.push_str("No new summaries.\n");
    }

    for (channel, list) in group_by_channel(episodes) {
        let label = channel_label(channel);
        markdown.push_str(&format!("## {}\n\n", label));
        text.push_str(&format!("{}\n{}\n\n", label, "=".repeat(label.chars().count())));

        for episode in list {
            let summary = episode
                .summary
                .as_ref()
                .map(|s| s.text.as_str())
                .unwrap_or_default();

            markdown.push_str(&format!(
                "### [{}]({})\n\n*Published {}*\n\n{}\n\n",
                episode.title,
                episode.url,
                published(episode),
                demote_headings(summary)
            ));
            text.push_str(&format!(
                "{}\n{}\nPublished {}\n\n{}\n\n",
                episode.title,
                episode.url,
                published(episode),
                strip_headings(summary)
            ));
        }
    }

    Digest {
        markdown: markdown.trim_end().to_string() + "\n",
        text: text.trim_end().to_string() + "\n",
        episode_count: episodes.len(),
    }
}

/// Write `digest.md` and `digest.txt` into `dir`.
pub fn write_previews(dir: &Path, digest: &Digest) -> Result<DigestFiles> {
    let files = DigestFiles {
        markdown: dir.join("digest.md"),
        text: dir.join("digest.txt"),
    };
    write_text(&files.markdown, &digest.markdown)?;
    write_text(&files.text, &digest.text)?;
    tracing::info!("Digest previews written to {}", dir.display());
    Ok(files)
}

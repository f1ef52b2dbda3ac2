//! Episode catalog for Podbrief.
//!
//! One row per video identifier holding discovery metadata, the transcript record
//! and the summary record.

mod sqlite;

pub use sqlite::Catalog;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Start of a window reaching `days` back from now, clamped to the earliest
/// representable instant.
pub fn days_ago(days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|span| Utc::now().checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Episode identity fields as supplied by discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEpisode {
    pub video_id: String,
    pub channel_id: Option<String>,
    pub channel_title: String,
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Transcript fields of an episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptRecord {
    /// Full transcript text.
    pub text: String,
    /// Provider that produced the text.
    pub provider: String,
    /// Detected language code.
    pub language: String,
    /// Lowercase hex SHA-256 of `text`.
    pub checksum: String,
    /// Length of `text` in characters.
    pub length: usize,
    /// Raw transcript file, if one was written.
    pub path: Option<PathBuf>,
    /// Whether the raw file is expected to exist at `path`.
    pub on_disk: bool,
}

/// Summary fields of an episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryRecord {
    pub text: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// A catalog row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub video_id: String,
    pub channel_id: Option<String>,
    pub channel_title: String,
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub transcript: Option<TranscriptRecord>,
    pub summary: Option<SummaryRecord>,
}

/// Result of an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExisted,
}

/// Aggregate counts over the catalog.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogStats {
    pub total_episodes: usize,
    pub with_transcripts: usize,
    pub with_summaries: usize,
    pub transcripts_on_disk: usize,
    /// (channel title, episode count), largest first.
    pub by_channel: Vec<(String, usize)>,
}

//! Integrity-checked deletion of on-disk transcript copies.
//!
//! The catalog keeps the full transcript text, so the raw file is expendable, but
//! only once its content still hashes to the checksum recorded when it was written.

use super::files::{delete_file, file_sha256};
use crate::catalog::{Catalog, Episode};
use crate::error::Result;
use tracing::{error, info, instrument, warn};

/// What happened to one transcript file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Checksum verified, file deleted, flag cleared.
    Deleted,
    /// Checksum verified; nothing deleted because of a dry run.
    WouldDelete,
    /// File content differs from the stored checksum. Left in place.
    Mismatch { expected: String, actual: String },
    /// File was already gone. Flag cleared unless dry run.
    Missing,
    /// Could not hash or delete the file.
    Failed(String),
}

/// Counts over a purge run.
#[derive(Debug, Clone, Default)]
pub struct PurgeReport {
    pub deleted: usize,
    pub mismatched: usize,
    pub missing: usize,
    pub errors: usize,
    pub outcomes: Vec<(String, PurgeOutcome)>,
}

impl PurgeReport {
    fn record(&mut self, video_id: &str, outcome: PurgeOutcome) {
        match &outcome {
            PurgeOutcome::Deleted | PurgeOutcome::WouldDelete => self.deleted += 1,
            PurgeOutcome::Mismatch { .. } => self.mismatched += 1,
            PurgeOutcome::Missing => self.missing += 1,
            PurgeOutcome::Failed(_) => self.errors += 1,
        }
        self.outcomes.push((video_id.to_string(), outcome));
    }
}

/// Verify and delete one episode's transcript file.
#[instrument(skip(catalog, episode), fields(video_id = %episode.video_id))]
pub fn purge_transcript(catalog: &Catalog, episode: &Episode, dry_run: bool) -> Result<PurgeOutcome> {
    let Some(record) = episode.transcript.as_ref() else {
        return Ok(PurgeOutcome::Failed("no transcript record".to_string()));
    };
    let Some(path) = record.path.as_deref() else {
        return Ok(PurgeOutcome::Failed("no transcript path".to_string()));
    };

    if !path.exists() {
        warn!("File not found: {}", path.display());
        if !dry_run {
            catalog.set_transcript_on_disk(&episode.video_id, false)?;
        }
        return Ok(PurgeOutcome::Missing);
    }

    let actual = match file_sha256(path) {
        Ok(digest) => digest,
        Err(e) => return Ok(PurgeOutcome::Failed(format!("hashing failed: {}", e))),
    };

    if actual != record.checksum {
        error!(
            "Checksum mismatch: expected {}, got {}",
            record.checksum, actual
        );
        return Ok(PurgeOutcome::Mismatch {
            expected: record.checksum.clone(),
            actual,
        });
    }

    if dry_run {
        return Ok(PurgeOutcome::WouldDelete);
    }

    match delete_file(path) {
        Ok(true) => {
            catalog.set_transcript_on_disk(&episode.video_id, false)?;
            Ok(PurgeOutcome::Deleted)
        }
        Ok(false) => {
            catalog.set_transcript_on_disk(&episode.video_id, false)?;
            Ok(PurgeOutcome::Missing)
        }
        Err(e) => Ok(PurgeOutcome::Failed(format!("delete failed: {}", e))),
    }
}

/// Purge every transcript file flagged as on disk.
pub fn purge_transcripts(catalog: &Catalog, dry_run: bool) -> Result<PurgeReport> {
    let episodes = catalog.episodes_with_transcript_on_disk()?;
    let mut report = PurgeReport::default();

    for episode in &episodes {
        let outcome = purge_transcript(catalog, episode, dry_run).unwrap_or_else(|e| {
            error!("Error purging {}: {}", episode.video_id, e);
            PurgeOutcome::Failed(e.to_string())
        });
        report.record(&episode.video_id, outcome);
    }

    info!(
        "Purge finished: {} deleted, {} mismatched, {} missing, {} errors",
        report.deleted, report.mismatched, report.missing, report.errors
    );
    Ok(report)
}

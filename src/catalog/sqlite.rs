//! SQLite-backed episode catalog.

use super::{days_ago, CatalogStats, Episode, InsertOutcome, NewEpisode, SummaryRecord, TranscriptRecord};
use crate::error::{PodbriefError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS episodes (
    video_id            TEXT PRIMARY KEY,
    channel_id          TEXT,
    channel_title       TEXT NOT NULL DEFAULT '',
    title               TEXT NOT NULL DEFAULT '',
    url                 TEXT NOT NULL DEFAULT '',
    published_at        TEXT,
    fetched_at          TEXT NOT NULL,

    transcript_md       TEXT,
    transcript_provider TEXT,
    transcript_language TEXT,
    transcript_checksum TEXT,
    transcript_length   INTEGER,
    transcript_path     TEXT,
    transcript_on_disk  INTEGER NOT NULL DEFAULT 0,

    summary_md          TEXT,
    summary_model       TEXT,
    summary_created_at  TEXT,

    updated_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_episodes_channel_date
    ON episodes (channel_title, published_at DESC);

CREATE INDEX IF NOT EXISTS idx_episodes_summary_created
    ON episodes (summary_created_at DESC);
"#;

const EPISODE_COLUMNS: &str = r#"
    video_id, channel_id, channel_title, title, url, published_at, fetched_at, updated_at,
    transcript_md, transcript_provider, transcript_language, transcript_checksum,
    transcript_length, transcript_path, transcript_on_disk,
    summary_md, summary_model, summary_created_at
"#;

/// SQLite episode catalog, opened once per invocation.
pub struct Catalog {
    conn: Mutex<Connection>,
}

impl Catalog {
    /// Open (or create) the catalog at `path` and ensure the schema exists.
    #[instrument(skip_all)]
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let catalog = Self {
            conn: Mutex::new(conn),
        };
        catalog.init_schema()?;

        info!("Opened catalog at {:?}", path);
        Ok(catalog)
    }

    /// Create an in-memory catalog (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let catalog = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    /// Create tables and indexes if they do not exist.
    pub fn init_schema(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        debug!("Catalog schema ensured");
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PodbriefError::Catalog(format!("Failed to acquire lock: {}", e)))
    }

    /// Insert an episode unless its video ID is already present.
    #[instrument(skip(self, episode), fields(video_id = %episode.video_id))]
    pub fn insert_episode(&self, episode: &NewEpisode) -> Result<InsertOutcome> {
        let now = timestamp(Utc::now());

        let inserted = self.conn()?.execute(
            r#"
            INSERT OR IGNORE INTO episodes
            (video_id, channel_id, channel_title, title, url, published_at,
             fetched_at, updated_at, transcript_on_disk)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, 0)
            "#,
            params![
                episode.video_id,
                episode.channel_id,
                episode.channel_title,
                episode.title,
                episode.url,
                episode.published_at.map(timestamp),
                now,
            ],
        )?;

        if inserted == 0 {
            debug!("Episode already exists, skipping");
            Ok(InsertOutcome::AlreadyExisted)
        } else {
            debug!("Episode inserted");
            Ok(InsertOutcome::Inserted)
        }
    }

    /// Overwrite the transcript fields of an episode. Returns false if the ID is unknown.
    #[instrument(skip(self, record))]
    pub fn update_transcript(&self, video_id: &str, record: &TranscriptRecord) -> Result<bool> {
        let updated = self.conn()?.execute(
            r#"
            UPDATE episodes SET
                transcript_md = ?1,
                transcript_provider = ?2,
                transcript_language = ?3,
                transcript_checksum = ?4,
                transcript_length = ?5,
                transcript_path = ?6,
                transcript_on_disk = ?7,
                updated_at = ?8
            WHERE video_id = ?9
            "#,
            params![
                record.text,
                record.provider,
                record.language,
                record.checksum,
                record.length as i64,
                record.path.as_ref().map(|p| p.to_string_lossy().into_owned()),
                record.on_disk,
                timestamp(Utc::now()),
                video_id,
            ],
        )?;

        debug!("Transcript updated");
        Ok(updated > 0)
    }

    /// Overwrite the summary fields of an episode. Returns false if the ID is unknown.
    #[instrument(skip(self, summary))]
    pub fn update_summary(&self, video_id: &str, summary: &str, model: &str) -> Result<bool> {
        let now = timestamp(Utc::now());

        let updated = self.conn()?.execute(
            r#"
            UPDATE episodes SET
                summary_md = ?1,
                summary_model = ?2,
                summary_created_at = ?3,
                updated_at = ?3
            WHERE video_id = ?4
            "#,
            params![summary, model, now, video_id],
        )?;

        debug!("Summary updated");
        Ok(updated > 0)
    }

    /// Set the on-disk flag of a transcript.
    #[instrument(skip(self))]
    pub fn set_transcript_on_disk(&self, video_id: &str, on_disk: bool) -> Result<()> {
        self.conn()?.execute(
            "UPDATE episodes SET transcript_on_disk = ?1, updated_at = ?2 WHERE video_id = ?3",
            params![on_disk, timestamp(Utc::now()), video_id],
        )?;
        debug!("Transcript on_disk flag set to {}", on_disk);
        Ok(())
    }

    /// Fetch a single episode.
    pub fn get_episode(&self, video_id: &str) -> Result<Option<Episode>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM episodes WHERE video_id = ?1", EPISODE_COLUMNS);

        match conn.query_row(&sql, params![video_id], row_to_episode) {
            Ok(episode) => Ok(Some(episode)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Newest episodes that have no transcript yet.
    pub fn episodes_without_transcript(&self, limit: usize) -> Result<Vec<Episode>> {
        self.select(
            r#"
            WHERE transcript_md IS NULL
            ORDER BY COALESCE(published_at, fetched_at) DESC
            LIMIT ?1
            "#,
            params![limit as i64],
        )
    }

    /// Newest episodes that have a transcript but no summary.
    pub fn episodes_without_summary(&self, limit: usize) -> Result<Vec<Episode>> {
        self.select(
            r#"
            WHERE transcript_md IS NOT NULL AND summary_md IS NULL
            ORDER BY COALESCE(published_at, fetched_at) DESC
            LIMIT ?1
            "#,
            params![limit as i64],
        )
    }

    /// Episodes whose raw transcript file is flagged as present.
    pub fn episodes_with_transcript_on_disk(&self) -> Result<Vec<Episode>> {
        self.select(
            r#"
            WHERE transcript_on_disk = 1 AND transcript_path IS NOT NULL
            ORDER BY video_id
            "#,
            [],
        )
    }

    /// Episodes summarized within the last `days` days, grouped by channel.
    pub fn recent_summaries(&self, days: u32) -> Result<Vec<Episode>> {
        let cutoff = timestamp(days_ago(days));
        self.select(
            r#"
            WHERE summary_md IS NOT NULL AND summary_created_at >= ?1
            ORDER BY channel_title, COALESCE(published_at, fetched_at) DESC
            "#,
            params![cutoff],
        )
    }

    fn select<P: rusqlite::Params>(&self, clause: &str, params: P) -> Result<Vec<Episode>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM episodes {}", EPISODE_COLUMNS, clause);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params, row_to_episode)?;

        let episodes = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        debug!("Selected {} episodes", episodes.len());
        Ok(episodes)
    }

    /// Aggregate counts.
    pub fn stats(&self) -> Result<CatalogStats> {
        let conn = self.conn()?;
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        let total_episodes = count("SELECT COUNT(*) FROM episodes")?;
        let with_transcripts = count("SELECT COUNT(*) FROM episodes WHERE transcript_md IS NOT NULL")?;
        let with_summaries = count("SELECT COUNT(*) FROM episodes WHERE summary_md IS NOT NULL")?;
        let transcripts_on_disk = count("SELECT COUNT(*) FROM episodes WHERE transcript_on_disk = 1")?;

        let mut stmt = conn.prepare(
            r#"
            SELECT channel_title, COUNT(*) AS n
            FROM episodes
            GROUP BY channel_title
            ORDER BY n DESC, channel_title
            "#,
        )?;
        let by_channel = stmt
            .query_map([], |row| {
                let n: i64 = row.get(1)?;
                Ok((row.get::<_, String>(0)?, n as usize))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(CatalogStats {
            total_episodes,
            with_transcripts,
            with_summaries,
            transcripts_on_disk,
            by_channel,
        })
    }
}

/// Second-precision RFC 3339 UTC, so string order is chronological order.
fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

fn row_to_episode(row: &Row<'_>) -> rusqlite::Result<Episode> {
    let transcript_text: Option<String> = row.get(8)?;
    let transcript = match transcript_text {
        Some(text) => {
            let length: Option<i64> = row.get(12)?;
            let path: Option<String> = row.get(13)?;
            Some(TranscriptRecord {
                length: length.map(|n| n as usize).unwrap_or_else(|| text.chars().count()),
                text,
                provider: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
                language: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
                checksum: row.get::<_, Option<String>>(11)?.unwrap_or_default(),
                path: path.map(PathBuf::from),
                on_disk: row.get(14)?,
            })
        }
        None => None,
    };

    let summary_text: Option<String> = row.get(15)?;
    let summary = match summary_text {
        Some(text) => Some(SummaryRecord {
            text,
            model: row.get::<_, Option<String>>(16)?.unwrap_or_default(),
            created_at: parse_timestamp(row.get(17)?).unwrap_or_else(Utc::now),
        }),
        None => None,
    };

    let fetched_at = parse_timestamp(row.get(6)?).unwrap_or_else(Utc::now);

    Ok(Episode {
        video_id: row.get(0)?,
        channel_id: row.get(1)?,
        channel_title: row.get(2)?,
        title: row.get(3)?,
        url: row.get(4)?,
        published_at: parse_timestamp(row.get(5)?),
        fetched_at,
        updated_at: parse_timestamp(row.get(7)?).unwrap_or(fetched_at),
        transcript,
        summary,
    })
}

//! Podbrief - YouTube Podcast Archive
//!
//! A batch CLI that keeps a local archive of podcast episodes published on YouTube.
//!
//! # Overview
//!
//! Podbrief allows you to:
//! - Discover episodes from configured channels and playlists
//! - Fetch transcripts from several external providers with ordered failover
//! - Summarize transcripts with a local Ollama model
//! - Render a digest of recent summaries
//! - Purge on-disk transcript copies after verifying their checksums
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `youtube` - Episode discovery through the YouTube Data API
//! - `transcript` - Provider clients and the failover fetcher
//! - `summarize` - Ollama client and summarizer
//! - `catalog` - SQLite episode catalog
//! - `archive` - Transcript/summary files and integrity-checked purge
//! - `digest` - Digest rendering for recent summaries
//!
//! # Example
//!
//! ```rust,no_run
//! use podbrief::config::Settings;
//! use podbrief::transcript::TranscriptFetcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let fetcher = TranscriptFetcher::from_settings(&settings.transcripts)?;
//!
//!     if let Some(fetched) = fetcher.fetch("dQw4w9WgXcQ", "Some episode").await {
//!         println!("{} chars from {}", fetched.char_count(), fetched.provider);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod summarize;
pub mod transcript;
pub mod youtube;

#[cfg(test)]
mod test_support;

pub use error::{PodbriefError, Result};

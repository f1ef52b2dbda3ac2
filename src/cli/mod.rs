//! CLI module for Podbrief.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Podbrief - YouTube Podcast Archive
///
/// Discovers podcast episodes on YouTube, archives their transcripts and
/// summarizes them with a local model.
#[derive(Parser, Debug)]
#[command(name = "podbrief")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "PODBRIEF_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the catalog schema and data directories
    Initdb,

    /// Discover episodes from configured channels and playlists
    Fetch,

    /// Fetch transcripts for episodes that lack one
    Transcribe {
        /// Number of recent episodes to process
        #[arg(long, default_value = "10")]
        recent: usize,
    },

    /// Summarize transcribed episodes that lack a summary
    Summarize {
        /// Number of recent episodes to process
        #[arg(long, default_value = "10")]
        recent: usize,
    },

    /// Render a digest of recent summaries
    Digest {
        /// Look-back window in days (default: digest.days)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Delete on-disk transcripts after verifying their checksums
    Purge {
        /// Report what would be deleted without touching anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show catalog statistics
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show effective configuration
    Show,

    /// Show configuration file path
    Path,
}

//! On-disk archive: transcript and summary files, digests, and purge.

mod files;
mod purge;

pub use files::{
    delete_file, episode_file_path, file_sha256, read_text, sanitize_filename, sha256_hex,
    write_text,
};
pub use purge::{purge_transcript, purge_transcripts, PurgeOutcome, PurgeReport};

//! Local summarization through Ollama.
//!
//! [`OllamaClient`] owns the HTTP conversation and retry policy;
//! [`Summarizer`] owns prompt selection, truncation and output cleanup.

mod ollama;
mod summarizer;

pub use ollama::OllamaClient;
pub use summarizer::{clean_summary, truncate_transcript, Summarizer, MAX_TRANSCRIPT_CHARS};

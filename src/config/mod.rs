//! Configuration module for Podbrief.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, DEFAULT_SUMMARY_PROMPT};
pub use settings::{
    expand_env, ChannelSettings, DigestSettings, FetchSettings, GeneralSettings, PromptSettings,
    ProviderSettings, Settings, SummarizeSettings, TranscriptSettings,
};

//! Configuration module for Tubescribe.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ChatPrompts, Prompts};
pub use settings::{
    CaptionSettings, GeneralSettings, OllamaSettings, PromptSettings, ServerSettings, Settings,
    WhisperSettings,
};

//! Configuration module for Pensum.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, Prompts, SynthesisPrompts};
pub use settings::{
    AgentSettings, GeneralSettings, PromptSettings, SessionSettings, Settings,
};

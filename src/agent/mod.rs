//! Agent orchestration for Pensum.
//!
//! Drives the LLM through a bounded number of tool-calling rounds and
//! synthesizes a fallback answer when the round budget runs out without a
//! clean stop.

mod runner;
mod state;

pub use runner::{suggests_continuation, Agent, ContinuationPolicy};
pub use state::ConversationState;

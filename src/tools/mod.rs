//! Retrieval tools for the Pensum agent.
//!
//! Each tool describes its callable shape as a JSON schema and returns a
//! typed [`ToolOutput`]: the text the model sees plus the source
//! attributions the caller surfaces alongside the final answer.

mod outline;
mod registry;
mod search;

pub use outline::CourseOutlineTool;
pub use registry::ToolRegistry;
pub use search::ContentSearchTool;

use crate::error::Result;
use crate::llm::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A source attribution produced by a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Human-readable label, e.g. `"Intro to RAG - Lesson 2"`.
    pub label: String,
    /// Link to the source, when one is recorded.
    pub link: Option<String>,
}

/// Result of one tool execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// The text returned to the model.
    pub text: String,
    /// Source attributions for this result.
    pub sources: Vec<SourceRef>,
}

impl ToolOutput {
    /// A text-only output with no attributions.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }

    /// An output carrying source attributions.
    pub fn with_sources(text: impl Into<String>, sources: Vec<SourceRef>) -> Self {
        Self {
            text: text.into(),
            sources,
        }
    }
}

/// Trait for tools the agent can call.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Schema describing the tool's callable shape.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given argument map.
    async fn execute(&self, args: &Value) -> Result<ToolOutput>;
}

//! LLM transport abstraction for Pensum.
//!
//! Defines provider-neutral message and tool types plus the [`LlmClient`]
//! trait the orchestration loop talks to. The OpenAI-backed implementation
//! lives in the `openai` submodule.

mod openai;

pub use openai::{create_client, create_client_with_timeout, OpenAiClient};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A structured tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    /// Opaque id assigned by the provider, echoed back with the result.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Argument map as raw JSON.
    pub input: Value,
}

/// Result of executing one requested tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the tool use this result answers.
    pub tool_use_id: String,
    /// Textual tool output (or error text).
    pub content: String,
}

/// One block of model-produced content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentBlock {
    Text(String),
    ToolUse(ToolUse),
}

/// Content of a single conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageContent {
    /// Plain text.
    Text(String),
    /// Assistant content blocks, possibly including tool-use requests.
    Blocks(Vec<ContentBlock>),
    /// A batch of tool results sent back to the model.
    ToolResults(Vec<ToolResult>),
}

/// A role-tagged turn in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    /// A plain user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A plain assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    /// An assistant message preserving the model's content blocks
    /// (including tool-use requests).
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    /// A user-side message carrying a batch of tool results.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::ToolResults(results),
        }
    }
}

/// Static metadata describing a callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub input_schema: Value,
}

/// Tool-choice mode for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model decides whether to call tools or answer directly.
    Auto,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model produced a complete answer.
    EndTurn,
    /// The model requested one or more tool invocations.
    ToolUse,
    /// Generation was cut off by the token limit.
    MaxTokens,
}

/// A single LLM call.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Full conversation transcript, in order.
    pub messages: Vec<Message>,
    /// System prompt for this call.
    pub system: String,
    /// Tool schemas offered to the model, if any.
    pub tools: Option<Vec<ToolDefinition>>,
    /// Tool-choice mode; only meaningful when tools are present.
    pub tool_choice: Option<ToolChoice>,
}

/// Response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub stop_reason: StopReason,
    pub content: Vec<ContentBlock>,
}

impl LlmResponse {
    /// The first text block of the response, or an empty string.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .find_map(|block| match block {
                ContentBlock::Text(text) => Some(text.clone()),
                ContentBlock::ToolUse(_) => None,
            })
            .unwrap_or_default()
    }

    /// All tool-use requests in the response, in emission order.
    pub fn tool_uses(&self) -> Vec<&ToolUse> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse(tool_use) => Some(tool_use),
                ContentBlock::Text(_) => None,
            })
            .collect()
    }
}

/// Trait for LLM transport implementations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Perform one chat completion call.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

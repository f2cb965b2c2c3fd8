//! OpenAI-backed LLM client.

use super::{
    ContentBlock, LlmClient, LlmRequest, LlmResponse, Message, MessageContent, Role, StopReason,
    ToolChoice, ToolDefinition, ToolUse,
};
use crate::config::AgentSettings;
use crate::error::{PensumError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolChoiceOption, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FinishReason, FunctionCall, FunctionObject,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client with configured timeout.
///
/// Uses a 5-minute timeout by default to prevent hung API calls.
pub fn create_client() -> Client<OpenAIConfig> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}

/// LLM client backed by the OpenAI chat completions API.
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Create a client from agent settings.
    pub fn new(settings: &AgentSettings) -> Self {
        Self {
            client: create_client(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system.clone())
                .build()
                .map_err(|e| PensumError::Agent(e.to_string()))?
                .into(),
        ];
        for message in &request.messages {
            messages.extend(to_openai_messages(message)?);
        }

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        if let Some(tools) = &request.tools {
            builder.tools(tools.iter().map(to_openai_tool).collect::<Vec<_>>());
            if let Some(ToolChoice::Auto) = request.tool_choice {
                builder.tool_choice(ChatCompletionToolChoiceOption::Auto);
            }
        }

        let api_request = builder
            .build()
            .map_err(|e| PensumError::Agent(e.to_string()))?;

        debug!("Calling {} with {} tools", self.model, request.tools.as_ref().map_or(0, |t| t.len()));

        let response = self
            .client
            .chat()
            .create(api_request)
            .await
            .map_err(|e| PensumError::OpenAI(format!("Chat completion failed: {}", e)))?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| PensumError::Agent("No response from model".to_string()))?;

        let mut content = Vec::new();
        if let Some(text) = &choice.message.content {
            if !text.is_empty() {
                content.push(ContentBlock::Text(text.clone()));
            }
        }
        if let Some(tool_calls) = &choice.message.tool_calls {
            for tool_call in tool_calls {
                // Tolerate malformed argument JSON: the tool itself will
                // report the missing parameters back to the model.
                let input = serde_json::from_str(&tool_call.function.arguments)
                    .unwrap_or(serde_json::Value::Null);
                content.push(ContentBlock::ToolUse(ToolUse {
                    id: tool_call.id.clone(),
                    name: tool_call.function.name.clone(),
                    input,
                }));
            }
        }

        let has_tool_calls = choice
            .message
            .tool_calls
            .as_ref()
            .is_some_and(|calls| !calls.is_empty());
        let stop_reason = match choice.finish_reason {
            Some(FinishReason::ToolCalls) => StopReason::ToolUse,
            Some(FinishReason::Length) => StopReason::MaxTokens,
            _ if has_tool_calls => StopReason::ToolUse,
            _ => StopReason::EndTurn,
        };

        Ok(LlmResponse {
            stop_reason,
            content,
        })
    }
}

/// Convert a neutral tool definition to the OpenAI function-tool format.
fn to_openai_tool(definition: &ToolDefinition) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: definition.name.clone(),
            description: Some(definition.description.clone()),
            parameters: Some(definition.input_schema.clone()),
            strict: None,
        },
    }
}

/// Convert one transcript turn into OpenAI request messages.
///
/// Tool-result batches fan out into one tool-role message per result.
fn to_openai_messages(message: &Message) -> Result<Vec<ChatCompletionRequestMessage>> {
    let converted = match (&message.role, &message.content) {
        (Role::User, MessageContent::Text(text)) => vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(text.clone())
                .build()
                .map_err(|e| PensumError::Agent(e.to_string()))?
                .into(),
        ],
        (Role::Assistant, MessageContent::Text(text)) => vec![
            ChatCompletionRequestAssistantMessageArgs::default()
                .content(text.clone())
                .build()
                .map_err(|e| PensumError::Agent(e.to_string()))?
                .into(),
        ],
        (Role::Assistant, MessageContent::Blocks(blocks)) => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();

            let text: Vec<&str> = blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text(text) => Some(text.as_str()),
                    ContentBlock::ToolUse(_) => None,
                })
                .collect();
            if !text.is_empty() {
                builder.content(text.join("\n"));
            }

            let tool_calls: Vec<ChatCompletionMessageToolCall> = blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse(tool_use) => Some(to_openai_tool_call(tool_use)),
                    ContentBlock::Text(_) => None,
                })
                .collect();
            if !tool_calls.is_empty() {
                builder.tool_calls(tool_calls);
            }

            vec![builder
                .build()
                .map_err(|e| PensumError::Agent(e.to_string()))?
                .into()]
        }
        (Role::User, MessageContent::ToolResults(results)) => {
            let mut converted = Vec::with_capacity(results.len());
            for result in results {
                converted.push(
                    ChatCompletionRequestToolMessageArgs::default()
                        .tool_call_id(result.tool_use_id.clone())
                        .content(result.content.clone())
                        .build()
                        .map_err(|e| PensumError::Agent(e.to_string()))?
                        .into(),
                );
            }
            converted
        }
        (role, content) => {
            return Err(PensumError::Agent(format!(
                "Unsupported transcript turn: {:?} with {:?}",
                role, content
            )))
        }
    };

    Ok(converted)
}

/// Convert a neutral tool use back to the OpenAI tool-call format.
fn to_openai_tool_call(tool_use: &ToolUse) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: tool_use.id.clone(),
        r#type: ChatCompletionToolType::Function,
        function: FunctionCall {
            name: tool_use.name.clone(),
            arguments: tool_use.input.to_string(),
        },
    }
}

//! The multi-round tool-calling orchestration loop.

use super::state::ConversationState;
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::{
    LlmClient, LlmRequest, LlmResponse, Message, StopReason, ToolChoice, ToolResult,
};
use crate::tools::ToolRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fixed apology when rounds are exhausted with nothing gathered.
const NO_CONTEXT_APOLOGY: &str =
    "I apologize, but I wasn't able to gather the information needed to answer your question.";

/// Phrases indicating the model wants another round of tool usage.
const CONTINUATION_INDICATORS: [&str; 8] = [
    "let me search for more",
    "i need to find",
    "let me look up",
    "i should check",
    "additional information",
    "more details needed",
    "need to search for more",
    "search for more specific",
];

/// Decision function for whether a round's follow-up text asks for another
/// round.
pub type ContinuationPolicy = fn(&str) -> bool;

/// Default continuation policy: case-insensitive match against a fixed
/// phrase list.
///
/// This keys on the model's natural phrasing rather than a structured
/// signal; paraphrased or non-English output will not match.
pub fn suggests_continuation(response: &str) -> bool {
    let response_lower = response.to_lowercase();
    CONTINUATION_INDICATORS
        .iter()
        .any(|indicator| response_lower.contains(indicator))
}

/// Agent that answers course-material questions, optionally calling
/// retrieval tools across a bounded number of rounds.
pub struct Agent {
    client: Arc<dyn LlmClient>,
    prompts: Prompts,
    max_rounds: usize,
    continuation_policy: ContinuationPolicy,
}

impl Agent {
    /// Create an agent with the default round budget of 2.
    pub fn new(client: Arc<dyn LlmClient>, prompts: Prompts) -> Self {
        Self {
            client,
            prompts,
            max_rounds: 2,
            continuation_policy: suggests_continuation,
        }
    }

    /// Set the round budget.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Replace the continuation policy.
    pub fn with_continuation_policy(mut self, policy: ContinuationPolicy) -> Self {
        self.continuation_policy = policy;
        self
    }

    /// Answer a query, letting the model call the registry's tools across
    /// up to `max_rounds` rounds.
    ///
    /// `conversation_history` is pre-formatted prior-exchange text injected
    /// into round 1's system prompt.
    pub async fn answer(
        &self,
        query: &str,
        conversation_history: Option<&str>,
        registry: &mut ToolRegistry,
    ) -> Result<String> {
        let system_prompt = match conversation_history {
            Some(history) => format!(
                "{}\n\nPrevious conversation:\n{}",
                self.prompts.agent.system, history
            ),
            None => self.prompts.agent.system.clone(),
        };

        let mut state = ConversationState::new(query, system_prompt, self.max_rounds);
        self.run_rounds(&mut state, registry).await
    }

    /// Execute conversation rounds until the model stops cleanly or the
    /// budget runs out.
    async fn run_rounds(
        &self,
        state: &mut ConversationState,
        registry: &mut ToolRegistry,
    ) -> Result<String> {
        let definitions = registry.definitions();
        let tools = if definitions.is_empty() {
            None
        } else {
            Some(definitions)
        };

        while state.can_continue() {
            state.begin_round();
            debug!("Round {} of {}", state.round_count, state.max_rounds);

            let round_system = state.round_system_prompt();
            let request = LlmRequest {
                messages: state.messages.clone(),
                system: round_system.clone(),
                tools: tools.clone(),
                tool_choice: tools.as_ref().map(|_| ToolChoice::Auto),
            };

            let response = match self.client.complete(&request).await {
                Ok(response) => response,
                Err(e) => {
                    // No retry: recover through synthesis when anything was
                    // gathered, otherwise surface the failure.
                    if state.accumulated_context.is_empty() {
                        return Err(e);
                    }
                    warn!("LLM call failed in round {}: {}", state.round_count, e);
                    return Ok(self.synthesize(state).await);
                }
            };

            if response.stop_reason == StopReason::ToolUse && !response.tool_uses().is_empty() {
                let follow_up = self
                    .run_tools_for_round(&response, state, &round_system, registry)
                    .await?;

                if !(self.continuation_policy)(&follow_up) {
                    // The model considers its answer complete.
                    return Ok(follow_up);
                }
                if !state.can_continue() {
                    // Budget exhausted while the model still wants more.
                    return Ok(self.synthesize(state).await);
                }

                state.messages.push(Message::assistant(follow_up));
            } else {
                // No tool use: the model answered directly.
                return Ok(response.text());
            }
        }

        Ok(self.synthesize(state).await)
    }

    /// Execute the round's requested tool calls, extend the transcript, and
    /// fetch the round's natural-language follow-up (a call without tools).
    async fn run_tools_for_round(
        &self,
        response: &LlmResponse,
        state: &mut ConversationState,
        round_system: &str,
        registry: &mut ToolRegistry,
    ) -> Result<String> {
        let mut tool_results = Vec::new();
        for tool_use in response.tool_uses() {
            // Each call is contained on its own: a failure becomes a
            // textual result, leaving the rest of the batch intact.
            let result_text = match registry.dispatch(&tool_use.name, &tool_use.input).await {
                Ok(text) => text,
                Err(e) => format!("Tool execution failed: {}", e),
            };

            state.add_tool_context(format!("{}: {}", tool_use.name, result_text));
            tool_results.push(ToolResult {
                tool_use_id: tool_use.id.clone(),
                content: result_text,
            });
        }

        state
            .messages
            .push(Message::assistant_blocks(response.content.clone()));
        if !tool_results.is_empty() {
            state.messages.push(Message::tool_results(tool_results));
        }

        let follow_up_request = LlmRequest {
            messages: state.messages.clone(),
            system: round_system.to_string(),
            tools: None,
            tool_choice: None,
        };

        match self.client.complete(&follow_up_request).await {
            Ok(follow_up) => Ok(follow_up.text()),
            Err(e) => {
                if state.accumulated_context.is_empty() {
                    return Err(e);
                }
                warn!("Follow-up call failed in round {}: {}", state.round_count, e);
                Ok(self.synthesize(state).await)
            }
        }
    }

    /// Build a final answer from the accumulated context when no round
    /// produced a clean stop.
    async fn synthesize(&self, state: &ConversationState) -> String {
        if state.accumulated_context.is_empty() {
            return NO_CONTEXT_APOLOGY.to_string();
        }

        info!(
            "Synthesizing final answer from {} tool results",
            state.accumulated_context.len()
        );

        let context_summary = state.accumulated_context.join("\n\n");
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context_summary.clone());
        vars.insert("question".to_string(), state.original_query.clone());
        let synthesis_prompt = self
            .prompts
            .render_with_custom(&self.prompts.synthesis.user, &vars);

        let request = LlmRequest {
            messages: vec![Message::user(synthesis_prompt)],
            system: self.prompts.synthesis.system.clone(),
            tools: None,
            tool_choice: None,
        };

        match self.client.complete(&request).await {
            Ok(response) => response.text(),
            Err(e) => {
                warn!("Synthesis call failed: {}", e);
                format!(
                    "Based on my search, here's what I found:\n\n{}",
                    context_summary
                )
            }
        }
    }
}

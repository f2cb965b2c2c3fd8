//! Per-query conversation state.

use crate::llm::Message;

/// Mutable record of one query's lifecycle across tool-calling rounds.
///
/// Created fresh per query, owned by the orchestration loop, and discarded
/// once a final answer is produced.
#[derive(Debug, Clone)]
pub struct ConversationState {
    /// The user's question, verbatim.
    pub original_query: String,
    /// The transcript sent to the LLM each round, in insertion order.
    pub messages: Vec<Message>,
    /// Rounds started so far; `0 <= round_count <= max_rounds`.
    pub round_count: usize,
    /// Round budget, fixed at construction.
    pub max_rounds: usize,
    /// Base system prompt for this query; round-specific augmentation is
    /// computed, never stored back.
    pub system_prompt: String,
    /// Running ledger of every tool result produced so far, insertion order
    /// preserved, duplicates suppressed.
    pub accumulated_context: Vec<String>,
}

impl ConversationState {
    /// Create state for one query. The transcript starts with the query as
    /// the sole user turn.
    pub fn new(query: impl Into<String>, system_prompt: String, max_rounds: usize) -> Self {
        let original_query = query.into();
        Self {
            messages: vec![Message::user(original_query.clone())],
            original_query,
            round_count: 0,
            max_rounds,
            system_prompt,
            accumulated_context: Vec::new(),
        }
    }

    /// Whether another round may start.
    pub fn can_continue(&self) -> bool {
        self.round_count < self.max_rounds
    }

    /// Start the next round.
    pub fn begin_round(&mut self) {
        self.round_count += 1;
    }

    /// Record a tool result for future rounds. Empty and duplicate entries
    /// are dropped.
    pub fn add_tool_context(&mut self, context: String) {
        if !context.is_empty() && !self.accumulated_context.contains(&context) {
            self.accumulated_context.push(context);
        }
    }

    /// System prompt for the current round.
    ///
    /// Round 1 uses the base prompt. Later rounds append the accumulated
    /// tool context and state which round this is and whether it is the
    /// last one.
    pub fn round_system_prompt(&self) -> String {
        if self.round_count > 1 && !self.accumulated_context.is_empty() {
            let context_summary = self.accumulated_context.join("\n");
            let round_note = if self.round_count == self.max_rounds {
                "This is your final round of tool usage."
            } else {
                "You may use tools again if needed for follow-up searches."
            };
            format!(
                "{}\n\nPrevious tool results from this query:\n{}\n\nThis is round {} of {}. {}",
                self.system_prompt, context_summary, self.round_count, self.max_rounds, round_note
            )
        } else {
            self.system_prompt.clone()
        }
    }
}

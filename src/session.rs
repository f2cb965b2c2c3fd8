//! In-memory conversation sessions.
//!
//! Keeps a bounded window of question-answer exchanges per session and
//! renders them as the history text injected into round-1 prompts. Nothing
//! here is persisted; durable history is the caller's concern.

use std::collections::HashMap;
use uuid::Uuid;

/// A single turn in a session.
#[derive(Debug, Clone)]
struct SessionMessage {
    role: &'static str,
    content: String,
}

/// Manages conversation sessions and message history.
pub struct SessionManager {
    max_history: usize,
    sessions: HashMap<String, Vec<SessionMessage>>,
}

impl SessionManager {
    /// Create a manager keeping at most `max_history` exchanges per session.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            sessions: HashMap::new(),
        }
    }

    /// Create a new conversation session and return its id.
    pub fn create_session(&mut self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions.insert(session_id.clone(), Vec::new());
        session_id
    }

    /// Record a complete question-answer exchange.
    pub fn add_exchange(&mut self, session_id: &str, user_message: &str, assistant_message: &str) {
        let messages = self.sessions.entry(session_id.to_string()).or_default();
        messages.push(SessionMessage {
            role: "User",
            content: user_message.to_string(),
        });
        messages.push(SessionMessage {
            role: "Assistant",
            content: assistant_message.to_string(),
        });

        // Keep conversation history within limits
        let cap = self.max_history * 2;
        if messages.len() > cap {
            messages.drain(..messages.len() - cap);
        }
    }

    /// Formatted conversation history for a session, or None when there is
    /// nothing recorded.
    pub fn conversation_history(&self, session_id: &str) -> Option<String> {
        let messages = self.sessions.get(session_id)?;
        if messages.is_empty() {
            return None;
        }

        Some(
            messages
                .iter()
                .map(|m| format!("{}: {}", m.role, m.content))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    /// Clear all messages from a session.
    pub fn clear_session(&mut self, session_id: &str) {
        if let Some(messages) = self.sessions.get_mut(session_id) {
            messages.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_formatting() {
        let mut sessions = SessionManager::new(2);
        let id = sessions.create_session();
        sessions.add_exchange(&id, "What is MCP?", "A protocol for tool access.");

        assert_eq!(
            sessions.conversation_history(&id).unwrap(),
            "User: What is MCP?\nAssistant: A protocol for tool access."
        );
    }

    #[test]
    fn test_empty_session_has_no_history() {
        let mut sessions = SessionManager::new(2);
        let id = sessions.create_session();
        assert!(sessions.conversation_history(&id).is_none());
        assert!(sessions.conversation_history("unknown").is_none());
    }

    #[test]
    fn test_history_window_is_bounded() {
        let mut sessions = SessionManager::new(1);
        let id = sessions.create_session();
        sessions.add_exchange(&id, "first question", "first answer");
        sessions.add_exchange(&id, "second question", "second answer");

        let history = sessions.conversation_history(&id).unwrap();
        assert!(!history.contains("first question"));
        assert_eq!(
            history,
            "User: second question\nAssistant: second answer"
        );
    }

    #[test]
    fn test_exchange_for_unknown_session_creates_it() {
        let mut sessions = SessionManager::new(2);
        sessions.add_exchange("adhoc", "q", "a");
        assert_eq!(
            sessions.conversation_history("adhoc").unwrap(),
            "User: q\nAssistant: a"
        );
    }

    #[test]
    fn test_clear_session() {
        let mut sessions = SessionManager::new(2);
        let id = sessions.create_session();
        sessions.add_exchange(&id, "q", "a");
        sessions.clear_session(&id);
        assert!(sessions.conversation_history(&id).is_none());
    }
}

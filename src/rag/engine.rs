//! High-level query engine.

use crate::agent::Agent;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::llm::OpenAiClient;
use crate::session::SessionManager;
use crate::store::CourseStore;
use crate::tools::{ContentSearchTool, CourseOutlineTool, SourceRef, ToolRegistry};
use std::sync::Arc;
use tracing::{info, instrument};

/// RAG engine for course-material question answering.
pub struct RagEngine {
    agent: Agent,
    registry: ToolRegistry,
    sessions: SessionManager,
}

impl RagEngine {
    /// Create an engine over the given course store, using the OpenAI
    /// client configured by `settings`.
    pub fn new(settings: &Settings, store: Arc<dyn CourseStore>) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let client = Arc::new(OpenAiClient::new(&settings.agent));
        let agent = Agent::new(client, prompts).with_max_rounds(settings.agent.max_rounds);

        let mut registry = ToolRegistry::new();
        registry.register(Box::new(ContentSearchTool::new(store.clone())))?;
        registry.register(Box::new(CourseOutlineTool::new(store)))?;

        Ok(Self {
            agent,
            registry,
            sessions: SessionManager::new(settings.session.max_history),
        })
    }

    /// Create an engine from pre-built components.
    pub fn with_components(
        agent: Agent,
        registry: ToolRegistry,
        sessions: SessionManager,
    ) -> Self {
        Self {
            agent,
            registry,
            sessions,
        }
    }

    /// Answer a user question, optionally within a session.
    ///
    /// Sources are harvested from the registry after the agent finishes and
    /// the registry is reset so the next query starts clean.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn query(&mut self, query: &str, session_id: Option<&str>) -> Result<RagResponse> {
        info!("Processing query: {}", query);

        let prompt = format!("Answer this question about course materials: {}", query);
        let history = session_id.and_then(|id| self.sessions.conversation_history(id));

        let answer = self
            .agent
            .answer(&prompt, history.as_deref(), &mut self.registry)
            .await?;

        let sources = self.registry.last_sources().to_vec();
        self.registry.reset();

        if let Some(id) = session_id {
            self.sessions.add_exchange(id, query, &answer);
        }

        Ok(RagResponse { answer, sources })
    }

    /// Start a new conversation session.
    pub fn create_session(&mut self) -> String {
        self.sessions.create_session()
    }

    /// Clear a session's history.
    pub fn clear_session(&mut self, session_id: &str) {
        self.sessions.clear_session(session_id);
    }
}

/// An answer together with the sources consulted.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// The generated answer.
    pub answer: String,
    /// Attributions for the tool results behind the answer.
    pub sources: Vec<SourceRef>,
}

impl RagResponse {
    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                output.push_str(&format!("\n{}", source.label));
                if let Some(link) = &source.link {
                    output.push_str(&format!("\n  {}", link));
                }
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::llm::{
        ContentBlock, LlmClient, LlmRequest, LlmResponse, StopReason, ToolDefinition, ToolUse,
    };
    use crate::tools::{Tool, ToolOutput};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// LLM stub replaying scripted responses; records every request.
    struct ScriptedClient {
        responses: Mutex<VecDeque<LlmResponse>>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<LlmResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<LlmRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected extra LLM call"))
        }
    }

    /// Tool stub producing a result with one attribution.
    struct SourcedTool;

    #[async_trait]
    impl Tool for SourcedTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "search_course_content".to_string(),
                description: "stub".to_string(),
                input_schema: json!({"type": "object", "properties": {}}),
            }
        }

        async fn execute(&self, _args: &Value) -> Result<ToolOutput> {
            Ok(ToolOutput::with_sources(
                "[Intro to RAG - Lesson 1]\nRetrieval basics.",
                vec![SourceRef {
                    label: "Intro to RAG - Lesson 1".to_string(),
                    link: Some("https://example.com/rag/1".to_string()),
                }],
            ))
        }
    }

    fn text(content: &str) -> LlmResponse {
        LlmResponse {
            stop_reason: StopReason::EndTurn,
            content: vec![ContentBlock::Text(content.to_string())],
        }
    }

    fn tool_use() -> LlmResponse {
        LlmResponse {
            stop_reason: StopReason::ToolUse,
            content: vec![ContentBlock::ToolUse(ToolUse {
                id: "call_1".to_string(),
                name: "search_course_content".to_string(),
                input: json!({"query": "retrieval"}),
            })],
        }
    }

    fn engine(client: Arc<ScriptedClient>) -> RagEngine {
        let agent = Agent::new(client, Prompts::default());
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(SourcedTool)).unwrap();
        RagEngine::with_components(agent, registry, SessionManager::new(2))
    }

    #[tokio::test]
    async fn test_query_returns_answer_with_sources() {
        let client = ScriptedClient::new(vec![tool_use(), text("Retrieval finds relevant text.")]);
        let mut engine = engine(client);

        let response = engine.query("What is retrieval?", None).await.unwrap();
        assert_eq!(response.answer, "Retrieval finds relevant text.");
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].label, "Intro to RAG - Lesson 1");
    }

    #[tokio::test]
    async fn test_registry_reset_between_queries() {
        let client = ScriptedClient::new(vec![
            tool_use(),
            text("First answer."),
            // Second query answers directly, touching no tools.
            text("Second answer."),
        ]);
        let mut engine = engine(client);

        let first = engine.query("first", None).await.unwrap();
        assert_eq!(first.sources.len(), 1);

        let second = engine.query("second", None).await.unwrap();
        assert!(second.sources.is_empty());
    }

    #[tokio::test]
    async fn test_session_history_feeds_next_query() {
        let client = ScriptedClient::new(vec![text("MCP is a protocol."), text("Lesson 2.")]);
        let mut engine = engine(client.clone());
        let session = engine.create_session();

        engine.query("What is MCP?", Some(&session)).await.unwrap();
        engine
            .query("Which lesson covers it?", Some(&session))
            .await
            .unwrap();

        let requests = client.requests();
        assert!(!requests[0].system.contains("Previous conversation:"));
        assert!(requests[1].system.contains(
            "Previous conversation:\nUser: What is MCP?\nAssistant: MCP is a protocol."
        ));
    }

    #[tokio::test]
    async fn test_query_is_wrapped_in_course_prompt() {
        let client = ScriptedClient::new(vec![text("ok")]);
        let mut engine = RagEngine::with_components(
            Agent::new(client.clone(), Prompts::default()),
            ToolRegistry::new(),
            SessionManager::new(2),
        );

        engine.query("What is MCP?", None).await.unwrap();

        let requests = client.requests();
        match &requests[0].messages[0].content {
            crate::llm::MessageContent::Text(text) => {
                assert_eq!(
                    text,
                    "Answer this question about course materials: What is MCP?"
                );
            }
            other => panic!("Expected text turn, got {:?}", other),
        }
    }

    #[test]
    fn test_format_for_display() {
        let response = RagResponse {
            answer: "The answer.".to_string(),
            sources: vec![
                SourceRef {
                    label: "Intro to RAG - Lesson 1".to_string(),
                    link: Some("https://example.com/rag/1".to_string()),
                },
                SourceRef {
                    label: "Intro to RAG".to_string(),
                    link: None,
                },
            ],
        };

        let display = response.format_for_display();
        assert!(display.starts_with("The answer."));
        assert!(display.contains("--- Sources ---"));
        assert!(display.contains("Intro to RAG - Lesson 1\n  https://example.com/rag/1"));
    }
}

//! Tool registry: dispatch by name plus source attribution tracking.

use super::{SourceRef, Tool};
use crate::error::{PensumError, Result};
use crate::llm::ToolDefinition;
use serde_json::Value;
use tracing::{debug, warn};

/// Holds the registered tools and the attributions from whichever tool most
/// recently produced results.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    last_sources: Vec<SourceRef>,
}

struct RegisteredTool {
    name: String,
    tool: Box<dyn Tool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under the name declared in its own schema.
    ///
    /// Re-registering a name replaces the previous tool.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<()> {
        let name = tool.definition().name;
        if name.is_empty() {
            return Err(PensumError::Config(
                "Tool must declare a name in its definition".to_string(),
            ));
        }

        if let Some(existing) = self.tools.iter_mut().find(|t| t.name == name) {
            warn!("Replacing registered tool {:?}", name);
            existing.tool = tool;
        } else {
            self.tools.push(RegisteredTool { name, tool });
        }
        Ok(())
    }

    /// All registered tool schemas, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.tool.definition()).collect()
    }

    /// Whether any tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name.
    ///
    /// An unknown name yields a textual result rather than an error, so a
    /// hallucinated tool call never aborts the round. A tool's own error
    /// does propagate; the orchestration loop converts it to text.
    pub async fn dispatch(&mut self, name: &str, args: &Value) -> Result<String> {
        let Some(registered) = self.tools.iter().find(|t| t.name == name) else {
            return Ok(format!("Tool '{}' not found", name));
        };

        debug!("Dispatching tool {:?}", name);
        let output = registered.tool.execute(args).await?;

        if !output.sources.is_empty() {
            self.last_sources = output.sources;
        }
        Ok(output.text)
    }

    /// Attributions from the most recent tool execution that produced any.
    pub fn last_sources(&self) -> &[SourceRef] {
        &self.last_sources
    }

    /// Clear tracked attributions; called once per completed query so the
    /// next query starts clean.
    pub fn reset(&mut self) {
        self.last_sources.clear();
    }
}

//! Prompt templates for Pensum.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    pub synthesis: SynthesisPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for the tool-calling agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an AI assistant specialized in course materials and educational content with access to comprehensive search and outline tools for course information.

Tool Usage Guidelines:
- **Content Search**: Use the search tool for questions about specific course content or detailed educational materials
- **Course Outline**: Use the outline tool for questions about course structure, lesson lists, or course overview
- **Sequential Tool Usage**: You can use tools multiple times (up to 2 rounds) to gather comprehensive information for complex queries
- **Multi-step Reasoning**: For complex questions, use initial tool results to inform follow-up tool searches
- Synthesize tool results into accurate, fact-based responses
- If tools yield no results, state this clearly without offering alternatives

Sequential Tool Usage Examples:
- "Find a course that covers the same topic as lesson 4 of course X" → First get outline of course X to find lesson 4 title → Then search for courses covering that topic
- Comparing content across multiple courses → Search each course separately then synthesize
- Multi-part questions requiring different types of information

Response Protocol:
- **General knowledge questions**: Answer using existing knowledge without using tools
- **Course content questions**: Use search tool(s) as needed, then answer
- **Course outline/structure questions**: Use outline tool(s) as needed, then answer
- **Complex queries**: Break down into multiple tool uses if beneficial
- **No meta-commentary**:
 - Provide direct answers only — no reasoning process, tool explanations, or question-type analysis
 - Do not mention "based on the search results" or "based on the outline"

For outline-related queries, always return:
- Course title
- Course link
- Complete lesson list with lesson numbers and titles

All responses must be:
1. **Brief, Concise and focused** - Get to the point quickly
2. **Educational** - Maintain instructional value
3. **Clear** - Use accessible language
4. **Example-supported** - Include relevant examples when they aid understanding
Provide only the direct answer to what was asked.
"#
            .to_string(),
        }
    }
}

/// Prompts for synthesizing a final answer from accumulated tool results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisPrompts {
    pub system: String,
    pub user: String,
}

impl Default for SynthesisPrompts {
    fn default() -> Self {
        Self {
            system: "You are an AI assistant. Synthesize the provided information to answer the user's question comprehensively and accurately. Provide only the direct answer without mentioning the synthesis process.".to_string(),

            user: r#"Based on the information I gathered:

{{context}}

Please provide a comprehensive answer to: {{question}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load agent prompts if file exists
            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }

            // Load synthesis prompts if file exists
            let synthesis_path = custom_path.join("synthesis.toml");
            if synthesis_path.exists() {
                let content = std::fs::read_to_string(&synthesis_path)?;
                prompts.synthesis = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.agent.system.is_empty());
        assert!(!prompts.synthesis.system.is_empty());
        assert!(prompts.synthesis.user.contains("{{context}}"));
        assert!(prompts.synthesis.user.contains("{{question}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }
}

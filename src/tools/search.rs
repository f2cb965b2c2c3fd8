//! Course content search tool.

use super::{SourceRef, Tool, ToolOutput};
use crate::error::{PensumError, Result};
use crate::llm::ToolDefinition;
use crate::store::{CourseStore, SearchResults};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Tool for searching course content with fuzzy course name matching and
/// optional lesson filtering.
pub struct ContentSearchTool {
    store: Arc<dyn CourseStore>,
}

impl ContentSearchTool {
    /// Create a new content search tool over the given store.
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }

    /// Format matched chunks with course/lesson headers and collect
    /// attributions for each one.
    async fn format_results(&self, results: &SearchResults) -> Result<ToolOutput> {
        let mut formatted = Vec::with_capacity(results.documents.len());
        let mut sources = Vec::with_capacity(results.documents.len());

        for (doc, meta) in results.documents.iter().zip(results.metadata.iter()) {
            let mut header = format!("[{}", meta.course_title);
            let mut label = meta.course_title.clone();
            if let Some(lesson_number) = meta.lesson_number {
                header.push_str(&format!(" - Lesson {}", lesson_number));
                label.push_str(&format!(" - Lesson {}", lesson_number));
            }
            header.push(']');

            // Link is only looked up when the chunk is tied to a lesson.
            let link = match meta.lesson_number {
                Some(lesson_number) => {
                    self.store
                        .lesson_link(&meta.course_title, lesson_number)
                        .await?
                }
                None => None,
            };
            sources.push(SourceRef { label, link });

            formatted.push(format!("{}\n{}", header, doc));
        }

        Ok(ToolOutput::with_sources(formatted.join("\n\n"), sources))
    }
}

/// Build the no-match message for the supplied filters.
fn no_results_message(course_name: Option<&str>, lesson_number: Option<u32>) -> String {
    let mut filter_info = String::new();
    if let Some(course) = course_name {
        filter_info.push_str(&format!(" in course '{}'", course));
    }
    if let Some(lesson) = lesson_number {
        filter_info.push_str(&format!(" in lesson {}", lesson));
    }
    format!("No relevant content found{}.", filter_info)
}

#[async_trait]
impl Tool for ContentSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "search_course_content".to_string(),
            description: "Search course materials with smart course name matching and lesson filtering".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, args: &Value) -> Result<ToolOutput> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| PensumError::InvalidInput("Missing 'query' argument".to_string()))?;
        let course_name = args["course_name"].as_str();
        let lesson_number = args["lesson_number"].as_u64().map(|n| n as u32);

        debug!("Searching content: query={:?} course={:?} lesson={:?}", query, course_name, lesson_number);

        // A store-reported error is surfaced to the model as the tool's
        // text, not raised; the agent reacts to it in-conversation.
        let results = match self.store.search(query, course_name, lesson_number).await {
            Ok(results) => results,
            Err(e) => return Ok(ToolOutput::text(e.to_string())),
        };

        if results.is_empty() {
            return Ok(ToolOutput::text(no_results_message(
                course_name,
                lesson_number,
            )));
        }

        self.format_results(&results).await
    }
}

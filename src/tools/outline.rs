//! Course outline tool.

use super::{Tool, ToolOutput};
use crate::error::{PensumError, Result};
use crate::llm::ToolDefinition;
use crate::store::{CourseMetadata, CourseStore};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Tool for retrieving course outline information including lesson structure.
pub struct CourseOutlineTool {
    store: Arc<dyn CourseStore>,
}

impl CourseOutlineTool {
    /// Create a new outline tool over the given store.
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }
}

/// Format course metadata into a readable outline.
fn format_course_outline(metadata: &CourseMetadata) -> String {
    let course_link = metadata
        .course_link
        .as_deref()
        .unwrap_or("No link available");

    let mut outline = vec![
        format!("Course: {}", metadata.title),
        format!("Course Link: {}", course_link),
        format!("Total Lessons: {}", metadata.lessons.len()),
        String::new(),
        "Lesson Outline:".to_string(),
    ];

    // Lessons are emitted in stored order, not re-sorted.
    for lesson in &metadata.lessons {
        outline.push(format!("  {}. {}", lesson.lesson_number, lesson.lesson_title));
    }

    outline.join("\n")
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_course_outline".to_string(),
            description: "Get the complete outline of a course including course title, course link, and all lessons with their numbers and titles".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "course_title": {
                        "type": "string",
                        "description": "Course title to get the outline for (partial matches work, e.g. 'MCP', 'Introduction')"
                    }
                },
                "required": ["course_title"]
            }),
        }
    }

    async fn execute(&self, args: &Value) -> Result<ToolOutput> {
        let course_title = args["course_title"].as_str().ok_or_else(|| {
            PensumError::InvalidInput("Missing 'course_title' argument".to_string())
        })?;

        debug!("Fetching outline for {:?}", course_title);

        let Some(resolved_title) = self.store.resolve_course_name(course_title).await? else {
            return Ok(ToolOutput::text(format!(
                "No course found matching '{}'",
                course_title
            )));
        };

        // Resolution succeeded, so a matching record should exist; guard
        // against an inconsistent store anyway.
        let all_courses = self.store.all_course_metadata().await?;
        let Some(metadata) = all_courses.iter().find(|c| c.title == resolved_title) else {
            return Ok(ToolOutput::text(format!(
                "Course metadata not found for '{}'",
                resolved_title
            )));
        };

        Ok(ToolOutput::text(format_course_outline(metadata)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Lesson, SearchResults};

    /// Store stub with one known course.
    struct StubStore {
        courses: Vec<CourseMetadata>,
        resolves_to: Option<String>,
    }

    #[async_trait]
    impl CourseStore for StubStore {
        async fn search(
            &self,
            _query: &str,
            _course_name: Option<&str>,
            _lesson_number: Option<u32>,
        ) -> Result<SearchResults> {
            Ok(SearchResults::default())
        }

        async fn resolve_course_name(&self, _partial_title: &str) -> Result<Option<String>> {
            Ok(self.resolves_to.clone())
        }

        async fn all_course_metadata(&self) -> Result<Vec<CourseMetadata>> {
            Ok(self.courses.clone())
        }

        async fn lesson_link(
            &self,
            _course_title: &str,
            _lesson_number: u32,
        ) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn mcp_course() -> CourseMetadata {
        CourseMetadata {
            title: "MCP: Build Rich-Context AI Apps".to_string(),
            course_link: Some("https://example.com/mcp".to_string()),
            lessons: vec![
                Lesson {
                    lesson_number: 1,
                    lesson_title: "Why MCP".to_string(),
                },
                Lesson {
                    lesson_number: 2,
                    lesson_title: "Architecture".to_string(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_outline_formatting() {
        let store = StubStore {
            courses: vec![mcp_course()],
            resolves_to: Some("MCP: Build Rich-Context AI Apps".to_string()),
        };
        let tool = CourseOutlineTool::new(Arc::new(store));

        let output = tool.execute(&json!({"course_title": "MCP"})).await.unwrap();
        assert_eq!(
            output.text,
            "Course: MCP: Build Rich-Context AI Apps\n\
             Course Link: https://example.com/mcp\n\
             Total Lessons: 2\n\
             \n\
             Lesson Outline:\n\
             \x20 1. Why MCP\n\
             \x20 2. Architecture"
        );
        assert!(output.sources.is_empty());
    }

    #[tokio::test]
    async fn test_missing_link_placeholder() {
        let mut course = mcp_course();
        course.course_link = None;
        let store = StubStore {
            courses: vec![course],
            resolves_to: Some("MCP: Build Rich-Context AI Apps".to_string()),
        };
        let tool = CourseOutlineTool::new(Arc::new(store));

        let output = tool.execute(&json!({"course_title": "MCP"})).await.unwrap();
        assert!(output.text.contains("Course Link: No link available"));
    }

    #[tokio::test]
    async fn test_unknown_course() {
        let store = StubStore {
            courses: vec![],
            resolves_to: None,
        };
        let tool = CourseOutlineTool::new(Arc::new(store));

        let output = tool
            .execute(&json!({"course_title": "Quantum Basket Weaving"}))
            .await
            .unwrap();
        assert_eq!(
            output.text,
            "No course found matching 'Quantum Basket Weaving'"
        );
    }

    #[tokio::test]
    async fn test_resolution_without_metadata() {
        let store = StubStore {
            courses: vec![],
            resolves_to: Some("Ghost Course".to_string()),
        };
        let tool = CourseOutlineTool::new(Arc::new(store));

        let output = tool.execute(&json!({"course_title": "Ghost"})).await.unwrap();
        assert_eq!(output.text, "Course metadata not found for 'Ghost Course'");
    }

    #[tokio::test]
    async fn test_lessons_not_resorted() {
        let mut course = mcp_course();
        course.lessons = vec![
            Lesson {
                lesson_number: 2,
                lesson_title: "Architecture".to_string(),
            },
            Lesson {
                lesson_number: 1,
                lesson_title: "Why MCP".to_string(),
            },
        ];
        let store = StubStore {
            courses: vec![course],
            resolves_to: Some("MCP: Build Rich-Context AI Apps".to_string()),
        };
        let tool = CourseOutlineTool::new(Arc::new(store));

        let output = tool.execute(&json!({"course_title": "MCP"})).await.unwrap();
        let architecture = output.text.find("2. Architecture").unwrap();
        let why_mcp = output.text.find("1. Why MCP").unwrap();
        assert!(architecture < why_mcp);
    }
}

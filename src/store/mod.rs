//! Course store abstraction for Pensum.
//!
//! The store is the retrieval collaborator: it owns chunking, embeddings and
//! fuzzy course-name matching. Pensum only passes filter values through and
//! formats what comes back.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single lesson within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson number within the course.
    pub lesson_number: u32,
    /// Lesson title.
    pub lesson_title: String,
}

/// Metadata describing one course in the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseMetadata {
    /// Canonical course title.
    pub title: String,
    /// Link to the course page, if known.
    pub course_link: Option<String>,
    /// Lessons in stored order.
    pub lessons: Vec<Lesson>,
}

/// Metadata attached to one matched content chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Title of the course the chunk belongs to.
    pub course_title: String,
    /// Lesson number the chunk belongs to, if any.
    pub lesson_number: Option<u32>,
}

/// Results of a content search: parallel document/metadata lists.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Matched chunk texts.
    pub documents: Vec<String>,
    /// Metadata for each matched chunk, same order as `documents`.
    pub metadata: Vec<ChunkMetadata>,
}

impl SearchResults {
    /// Whether the search matched nothing.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Trait for course store implementations.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Search course content. Course-name matching is fuzzy on the store's
    /// side; `lesson_number` is an exact filter.
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> Result<SearchResults>;

    /// Resolve a partial course title to its canonical form.
    async fn resolve_course_name(&self, partial_title: &str) -> Result<Option<String>>;

    /// Metadata for every course in the corpus.
    async fn all_course_metadata(&self) -> Result<Vec<CourseMetadata>>;

    /// Link for a specific lesson, if one is recorded.
    async fn lesson_link(&self, course_title: &str, lesson_number: u32) -> Result<Option<String>>;
}

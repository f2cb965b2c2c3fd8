//! RAG engine for course-material question answering.
//!
//! Ties the agent, the retrieval tools, and session history together into a
//! single `query` operation that returns an answer with its sources.

mod engine;

pub use engine::{RagEngine, RagResponse};

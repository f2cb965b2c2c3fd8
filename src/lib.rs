//! Pensum - Course Materials RAG Assistant
//!
//! A retrieval-augmented-generation library for answering questions about a
//! corpus of course documents.
//!
//! The name "Pensum" comes from the Norwegian/Scandinavian word for a
//! course syllabus.
//!
//! # Overview
//!
//! Pensum drives an LLM agent through a bounded number of tool-calling
//! rounds: the model may search course content, fetch course outlines, and
//! follow up on earlier results before producing a final answer. Every tool
//! result is tracked so the caller gets the answer together with the sources
//! consulted, and so a fallback answer can be synthesized when the round
//! budget runs out.
//!
//! Retrieval itself (chunking, embeddings, vector search) is behind the
//! [`store::CourseStore`] trait; callers bring their own implementation.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `llm` - Provider-neutral LLM messages and the OpenAI-backed client
//! - `store` - Course store abstraction (the retrieval collaborator)
//! - `tools` - Retrieval tools and the tool registry
//! - `agent` - The multi-round orchestration loop
//! - `session` - In-memory conversation history
//! - `rag` - High-level query engine tying it all together
//!
//! # Example
//!
//! ```rust,no_run
//! use pensum::config::Settings;
//! use pensum::rag::RagEngine;
//! use pensum::store::CourseStore;
//! use std::sync::Arc;
//!
//! async fn answer(store: Arc<dyn CourseStore>) -> pensum::Result<()> {
//!     let settings = Settings::load()?;
//!     let mut engine = RagEngine::new(&settings, store)?;
//!
//!     let response = engine.query("What does lesson 3 of the MCP course cover?", None).await?;
//!     println!("{}", response.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod rag;
pub mod session;
pub mod store;
pub mod tools;

pub use error::{PensumError, Result};

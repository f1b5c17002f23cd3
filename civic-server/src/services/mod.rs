//! Service Layer
//!
//! External collaborators behind small service types:
//!
//! - [`analyzer`] - AI triage over the language model
//! - [`llm`] - language model client
//! - [`image_store`] - content-addressed image storage

pub mod analyzer;
pub mod image_store;
pub mod llm;

pub use analyzer::IssueAnalyzer;
pub use image_store::ImageStore;
pub use llm::{GeminiClient, LanguageModel, LlmError};

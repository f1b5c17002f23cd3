//! Database Models
//!
//! Typed records matching the SurrealDB tables.

pub mod analysis;
pub mod issue;
pub mod serde_helpers;
pub mod user;

pub use analysis::{AiAnalysis, AnalysisRecord, Severity};
pub use issue::{Issue, IssueStatus};
pub use user::User;

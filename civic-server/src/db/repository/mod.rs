//! Repository Module
//!
//! Provides CRUD operations for the SurrealDB tables.

pub mod analysis;
pub mod issue;
pub mod user;

// Re-exports
pub use analysis::AnalysisRepository;
pub use issue::IssueRepository;
pub use user::UserRepository;

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Build a RecordId for `table`, accepting both "table:key" and bare keys
pub fn record_id(table: &str, id: &str) -> RecordId {
    if let Some((tb, key)) = id.split_once(':')
        && tb == table
    {
        return RecordId::from_table_key(table, key);
    }
    RecordId::from_table_key(table, id)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

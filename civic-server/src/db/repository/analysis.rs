//! Analysis Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::AnalysisRecord;

const TABLE: &str = "ai_analysis";

#[derive(Clone)]
pub struct AnalysisRepository {
    base: BaseRepository,
}

impl AnalysisRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a standalone analysis record
    pub async fn create(&self, record: AnalysisRecord) -> RepoResult<AnalysisRecord> {
        let created: Option<AnalysisRecord> =
            self.base.db().create(TABLE).content(record).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create analysis record".to_string()))
    }

    /// Find all standalone analysis records, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<AnalysisRecord>> {
        let records: Vec<AnalysisRecord> = self
            .base
            .db()
            .query("SELECT * FROM ai_analysis ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(records)
    }
}

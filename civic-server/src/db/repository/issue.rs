//! Issue Repository
//!
//! All writes that carry server-generated timestamps go through single
//! `UPDATE ... MERGE` statements so concurrent status changes on the same
//! issue never race a read-then-write split. The timestamp sentinel is
//! SurrealDB's own `time::now()`, cast to a string so every stored
//! timestamp has the same RFC 3339 shape as `created_at`.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Issue, IssueStatus};
use crate::workflow::{AssignmentPatch, StatusPatch};

const TABLE: &str = "issue";

#[derive(Clone)]
pub struct IssueRepository {
    base: BaseRepository,
}

impl IssueRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new issue, newest first on listing
    pub async fn create(&self, issue: Issue) -> RepoResult<Issue> {
        let created: Option<Issue> = self.base.db().create(TABLE).content(issue).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create issue".to_string()))
    }

    /// Find all issues, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Issue>> {
        let issues: Vec<Issue> = self
            .base
            .db()
            .query("SELECT * FROM issue ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(issues)
    }

    /// Find issues with the given status, newest first
    pub async fn find_by_status(&self, status: IssueStatus) -> RepoResult<Vec<Issue>> {
        let issues: Vec<Issue> = self
            .base
            .db()
            .query("SELECT * FROM issue WHERE status = $status ORDER BY created_at DESC")
            .bind(("status", status.as_str()))
            .await?
            .take(0)?;
        Ok(issues)
    }

    /// Find issues assigned to the given officer, newest first
    pub async fn find_by_officer(&self, officer_id: &str) -> RepoResult<Vec<Issue>> {
        let officer_id = officer_id.to_string();
        let issues: Vec<Issue> = self
            .base
            .db()
            .query(
                "SELECT * FROM issue WHERE assigned_officer_id = $officer \
                 ORDER BY created_at DESC",
            )
            .bind(("officer", officer_id))
            .await?
            .take(0)?;
        Ok(issues)
    }

    /// Find issue by id, accepting "issue:key" or a bare key
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Issue>> {
        let issue: Option<Issue> = self.base.db().select(record_id(TABLE, id)).await?;
        Ok(issue)
    }

    /// Apply a status-update patch atomically
    ///
    /// The statement text varies only in which fields are present; all
    /// values are bound.
    pub async fn apply_status_update(&self, id: &str, patch: &StatusPatch) -> RepoResult<Issue> {
        let mut stmt = String::from(
            "UPDATE $id MERGE { \
             status: $status, \
             notes: $notes, \
             updated_at: <string> time::now()",
        );
        if patch.resolved_image_url.is_some() {
            stmt.push_str(", resolved_image_url: $proof");
        }
        if patch.set_resolved_at {
            stmt.push_str(", resolved_at: <string> time::now()");
        }
        stmt.push_str(" } RETURN AFTER");

        let mut query = self
            .base
            .db()
            .query(stmt)
            .bind(("id", record_id(TABLE, id)))
            .bind(("status", patch.status.as_str()))
            .bind(("notes", patch.notes.clone()));
        if let Some(proof) = &patch.resolved_image_url {
            query = query.bind(("proof", proof.clone()));
        }

        let updated: Vec<Issue> = query.await?.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Issue {} not found", id)))
    }

    /// Apply an assignment patch atomically
    pub async fn apply_assignment(&self, id: &str, patch: &AssignmentPatch) -> RepoResult<Issue> {
        let mut stmt = String::from(
            "UPDATE $id MERGE { \
             assigned_officer_id: $officer_id, \
             assigned_officer_name: $officer_name, \
             status: $status, \
             updated_at: <string> time::now()",
        );
        if patch.set_assigned_at {
            stmt.push_str(", assigned_at: <string> time::now()");
        }
        stmt.push_str(" } RETURN AFTER");

        let updated: Vec<Issue> = self
            .base
            .db()
            .query(stmt)
            .bind(("id", record_id(TABLE, id)))
            .bind(("officer_id", patch.officer_id.clone()))
            .bind(("officer_name", patch.officer_name.clone()))
            .bind(("status", patch.status.as_str()))
            .await?
            .take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Issue {} not found", id)))
    }
}

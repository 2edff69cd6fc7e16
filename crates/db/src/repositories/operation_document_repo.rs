//! Repository for the `operation_documents` table.

use labflow_core::operation::OperationDraft;
use labflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::operation_document::OperationDocumentRow;

/// Column list for the `operation_documents` table.
const COLUMNS: &str =
    "id, name, description, average_time, version, commands, created_at, updated_at";

/// Provides whole-document CRUD for operation documents.
pub struct OperationDocumentRepo;

impl OperationDocumentRepo {
    /// Insert a new document at version 1.
    pub async fn create(
        pool: &PgPool,
        draft: &OperationDraft,
        commands: &serde_json::Value,
    ) -> Result<OperationDocumentRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO operation_documents (name, description, average_time, commands) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OperationDocumentRow>(&query)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.average_time)
            .bind(commands)
            .fetch_one(pool)
            .await
    }

    /// Find a document by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OperationDocumentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM operation_documents WHERE id = $1");
        sqlx::query_as::<_, OperationDocumentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all documents, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<OperationDocumentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM operation_documents ORDER BY id");
        sqlx::query_as::<_, OperationDocumentRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Replace every field of a document if its version still matches.
    ///
    /// Returns `None` when no row has both `id` and `expected_version`.
    pub async fn replace(
        pool: &PgPool,
        id: DbId,
        expected_version: i64,
        draft: &OperationDraft,
        commands: &serde_json::Value,
    ) -> Result<Option<OperationDocumentRow>, sqlx::Error> {
        let query = format!(
            "UPDATE operation_documents SET \
                name = $3, \
                description = $4, \
                average_time = $5, \
                commands = $6, \
                version = version + 1 \
             WHERE id = $1 AND version = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OperationDocumentRow>(&query)
            .bind(id)
            .bind(expected_version)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.average_time)
            .bind(commands)
            .fetch_optional(pool)
            .await
    }

    /// Current version of a document, if it exists.
    pub async fn current_version(pool: &PgPool, id: DbId) -> Result<Option<i64>, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT version FROM operation_documents WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|(version,)| version))
    }

    /// Delete a document. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM operation_documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

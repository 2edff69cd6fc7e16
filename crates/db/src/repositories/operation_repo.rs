//! Repository for the `operations` table.

use labflow_core::operation::OperationDraft;
use labflow_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::operation::Operation;

/// Column list for the `operations` table.
const COLUMNS: &str = "id, name, description, average_time, version, created_at, updated_at";

/// Provides CRUD operations for operation rows. Bindings live in
/// [`super::OperationCommandRepo`].
pub struct OperationRepo;

impl OperationRepo {
    /// Insert a new operation at version 1.
    pub async fn create(
        conn: &mut PgConnection,
        draft: &OperationDraft,
    ) -> Result<Operation, sqlx::Error> {
        let query = format!(
            "INSERT INTO operations (name, description, average_time) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Operation>(&query)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.average_time)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find an operation by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Operation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM operations WHERE id = $1");
        sqlx::query_as::<_, Operation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all operations, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Operation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM operations ORDER BY id");
        sqlx::query_as::<_, Operation>(&query).fetch_all(pool).await
    }

    /// Read an operation and lock its row until the transaction ends.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Operation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM operations WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Operation>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Overwrite scalar fields and bump `version`.
    ///
    /// Fails with `RowNotFound` if the row does not exist.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        draft: &OperationDraft,
    ) -> Result<Operation, sqlx::Error> {
        let query = format!(
            "UPDATE operations SET \
                name = $2, \
                description = $3, \
                average_time = $4, \
                version = version + 1 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Operation>(&query)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.average_time)
            .fetch_one(&mut *conn)
            .await
    }

    /// Delete an operation row. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM operations WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

//! Repository for the `operation_commands` table.

use labflow_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::operation::{OperationCommand, WriteOperationCommand};

/// Column list for binding rows. The command fields are the snapshot
/// stored on the binding, not the live catalog row.
const COLUMNS: &str = "id, operation_id, address, position, command_id, command_name, \
    system_name, reagent, average_time, volume_waste, volume_drive_fluid, volume_container, \
    max_volume, default_address";

/// Provides CRUD operations for the bindings of an operation.
pub struct OperationCommandRepo;

impl OperationCommandRepo {
    /// Insert bindings for an operation. Returns the new IDs in input order.
    pub async fn create_many(
        conn: &mut PgConnection,
        operation_id: DbId,
        rows: &[WriteOperationCommand<'_>],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let (id,): (DbId,) = sqlx::query_as(
                "INSERT INTO operation_commands \
                    (operation_id, command_id, address, position, command_name, system_name, \
                     reagent, average_time, volume_waste, volume_drive_fluid, volume_container, \
                     max_volume, default_address) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
                 RETURNING id",
            )
            .bind(operation_id)
            .bind(row.command.id)
            .bind(row.address)
            .bind(row.position)
            .bind(&row.command.name)
            .bind(&row.command.system_name)
            .bind(row.command.reagent.as_str())
            .bind(row.command.average_time)
            .bind(row.command.volume_waste)
            .bind(row.command.volume_drive_fluid)
            .bind(row.command.volume_container)
            .bind(row.command.max_volume)
            .bind(row.command.default_address.as_str())
            .fetch_one(&mut *conn)
            .await?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Rewrite a binding in place.
    ///
    /// Scoped to `operation_id`; returns `false` if the binding does not
    /// exist or belongs to another operation.
    pub async fn update(
        conn: &mut PgConnection,
        operation_id: DbId,
        id: DbId,
        row: &WriteOperationCommand<'_>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE operation_commands SET \
                command_id = $3, \
                address = $4, \
                position = $5, \
                command_name = $6, \
                system_name = $7, \
                reagent = $8, \
                average_time = $9, \
                volume_waste = $10, \
                volume_drive_fluid = $11, \
                volume_container = $12, \
                max_volume = $13, \
                default_address = $14 \
             WHERE id = $1 AND operation_id = $2",
        )
        .bind(id)
        .bind(operation_id)
        .bind(row.command.id)
        .bind(row.address)
        .bind(row.position)
        .bind(&row.command.name)
        .bind(&row.command.system_name)
        .bind(row.command.reagent.as_str())
        .bind(row.command.average_time)
        .bind(row.command.volume_waste)
        .bind(row.command.volume_drive_fluid)
        .bind(row.command.volume_container)
        .bind(row.command.max_volume)
        .bind(row.command.default_address.as_str())
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every binding of `operation_id` whose ID is not in `keep_ids`.
    pub async fn delete_except(
        conn: &mut PgConnection,
        operation_id: DbId,
        keep_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM operation_commands \
             WHERE operation_id = $1 AND NOT (id = ANY($2))",
        )
        .bind(operation_id)
        .bind(keep_ids)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete all bindings of an operation.
    pub async fn delete_by_operation_id(
        conn: &mut PgConnection,
        operation_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM operation_commands WHERE operation_id = $1")
            .bind(operation_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// List the bindings of one operation in composition order.
    pub async fn list_for_operation(
        pool: &PgPool,
        operation_id: DbId,
    ) -> Result<Vec<OperationCommand>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM operation_commands \
             WHERE operation_id = $1 \
             ORDER BY position, id"
        );
        sqlx::query_as::<_, OperationCommand>(&query)
            .bind(operation_id)
            .fetch_all(pool)
            .await
    }

    /// List the bindings of several operations, grouped by operation and
    /// ordered by position within each.
    pub async fn list_for_operations(
        pool: &PgPool,
        operation_ids: &[DbId],
    ) -> Result<Vec<OperationCommand>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM operation_commands \
             WHERE operation_id = ANY($1) \
             ORDER BY operation_id, position, id"
        );
        sqlx::query_as::<_, OperationCommand>(&query)
            .bind(operation_ids)
            .fetch_all(pool)
            .await
    }
}

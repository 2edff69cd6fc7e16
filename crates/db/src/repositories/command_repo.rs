//! Repository for the `commands` table.

use labflow_core::catalog::CommandDefinition;
use sqlx::{PgConnection, PgPool};

use crate::models::command::Command;

/// Column list for the `commands` table.
const COLUMNS: &str = "id, name, system_name, reagent, average_time, volume_waste, \
    volume_drive_fluid, volume_container, max_volume, default_address, created_at, updated_at";

/// Provides read access and definition-file sync for the command catalog.
pub struct CommandRepo;

impl CommandRepo {
    /// List every command, ordered by system name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Command>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM commands ORDER BY system_name");
        sqlx::query_as::<_, Command>(&query).fetch_all(pool).await
    }

    /// Insert a definition, or overwrite the row with the same system name.
    ///
    /// Existing rows keep their `id`, so bindings referencing them survive.
    pub async fn upsert(
        conn: &mut PgConnection,
        def: &CommandDefinition,
    ) -> Result<Command, sqlx::Error> {
        let query = format!(
            "INSERT INTO commands \
                (name, system_name, reagent, average_time, volume_waste, \
                 volume_drive_fluid, volume_container, max_volume, default_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (system_name) DO UPDATE SET \
                name = EXCLUDED.name, \
                reagent = EXCLUDED.reagent, \
                average_time = EXCLUDED.average_time, \
                volume_waste = EXCLUDED.volume_waste, \
                volume_drive_fluid = EXCLUDED.volume_drive_fluid, \
                volume_container = EXCLUDED.volume_container, \
                max_volume = EXCLUDED.max_volume, \
                default_address = EXCLUDED.default_address \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Command>(&query)
            .bind(&def.name)
            .bind(&def.system_name)
            .bind(def.reagent.as_str())
            .bind(def.average_time)
            .bind(def.volume_waste)
            .bind(def.volume_drive_fluid)
            .bind(def.volume_container)
            .bind(def.max_volume)
            .bind(def.default_address.as_str())
            .fetch_one(&mut *conn)
            .await
    }

    /// Upsert every definition in one transaction. Returns the number synced.
    pub async fn sync(pool: &PgPool, defs: &[CommandDefinition]) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for def in defs {
            Self::upsert(&mut tx, def).await?;
        }
        tx.commit().await?;
        Ok(defs.len())
    }
}

//! Command catalog sync from the definition file.

use std::path::Path;

use labflow_core::catalog::parse_definitions;
use labflow_db::models::command::Command;
use labflow_db::repositories::CommandRepo;
use labflow_db::DbPool;

use crate::error::{AppError, AppResult};

/// The catalog as stored, ordered by system name.
pub async fn list_commands(pool: &DbPool) -> AppResult<Vec<Command>> {
    Ok(CommandRepo::list(pool).await?)
}

/// Read the definition file at `path` and upsert every entry by system name.
///
/// The file is fully parsed and checked before the database is touched.
/// Returns the number of synced commands.
pub async fn sync_commands(pool: &DbPool, path: &Path) -> AppResult<usize> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::InternalError(format!(
            "Failed to read command catalog {}: {e}",
            path.display()
        ))
    })?;
    let definitions = parse_definitions(&raw)?;
    let synced = CommandRepo::sync(pool, &definitions).await?;

    tracing::info!(synced, path = %path.display(), "Command catalog synced");
    Ok(synced)
}

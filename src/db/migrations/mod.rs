//! Database schema migrations.
//!
//! Migration files are stored in this directory with the naming convention
//! `migration_NN_up.sql`, which upgrades the schema from version `NN-1` to version `NN`.
//! Migrations only go forward.

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::debug;

use crate::error::Re;

/// A database migration.
struct Migration {
    /// The version this migration brings the database to.
    version: i32,
    /// SQL to execute when upgrading to this version.
    up_sql: &'static str,
}

/// All available migrations in order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
}];

/// The schema version that this build of the program expects.
pub(crate) const LATEST_VERSION: i32 = 1;

/// Runs migrations to bring the database from `current_ver` up to `target_ver`.
///
/// Each migration is executed within a transaction that includes the schema_version update.
/// Validates all required migrations exist before running any of them.
pub(crate) async fn run(pool: &SqlitePool, current_ver: i32, target_ver: i32) -> Re<()> {
    if current_ver == target_ver {
        debug!("Database already at target version {target_ver}, no migrations needed");
        return Ok(());
    }
    if current_ver > target_ver {
        bail!(
            "The database schema is at version {current_ver}, which is newer than version \
            {target_ver} supported by this program"
        );
    }

    validate_migrations(current_ver, target_ver)?;

    for version in (current_ver + 1)..=target_ver {
        let migration = MIGRATIONS
            .iter()
            .find(|m| m.version == version)
            .with_context(|| format!("Migration {version} not found"))?;

        debug!("Running migration {version:02}");
        run_single_migration(pool, migration.up_sql, version).await?;
    }

    debug!("Migration complete, schema now at version {target_ver}");
    Ok(())
}

/// Executes a single migration's SQL and updates schema_version, all within a transaction.
async fn run_single_migration(pool: &SqlitePool, sql: &str, new_version: i32) -> Re<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;

    // The migration SQL may hold more than one statement
    tx.execute(sql)
        .await
        .context("Failed to execute migration SQL")?;

    sqlx::query("DELETE FROM schema_version")
        .execute(&mut *tx)
        .await
        .context("Failed to clear schema_version")?;

    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;

    tx.commit()
        .await
        .context("Failed to commit migration transaction")?;

    Ok(())
}

/// Validates that migrations are available for every version after `current_version` up to and
/// including `target_version`.
fn validate_migrations(current_version: i32, target_version: i32) -> Re<()> {
    for version in (current_version + 1)..=target_version {
        if !MIGRATIONS.iter().any(|m| m.version == version) {
            bail!(
                "Migration {version} is missing but required to migrate from version {current_version} to {target_version}"
            );
        }
    }
    Ok(())
}

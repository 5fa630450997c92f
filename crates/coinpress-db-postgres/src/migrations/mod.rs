//! Embedded schema migrations for the PostgreSQL backend.

use sqlx_core::migrate::{Migration, MigrationType};
use sqlx_postgres::PgPool;
use std::borrow::Cow;
use tracing::{info, instrument};

use crate::error::Result;

/// The embedded migration list, in chronological order.
///
/// Each entry is (version, description, sql); versions are the timestamp
/// prefix of the SQL file name.
macro_rules! embedded_migrations {
    () => {
        &[(
            20250812000001i64,
            "initial_schema",
            include_str!("../../migrations/20250812000001_initial_schema.sql"),
        )]
    };
}

fn build_migrations() -> Vec<Migration> {
    embedded_migrations!()
        .iter()
        .map(|(version, description, sql)| Migration {
            version: *version,
            description: Cow::Borrowed(description),
            migration_type: MigrationType::Simple,
            sql: Cow::Borrowed(sql),
            // Checksums are skipped; the SQL ships inside the binary.
            checksum: Cow::Borrowed(&[]),
            no_tx: false,
        })
        .collect()
}

/// Runs all pending database migrations using embedded migrations.
///
/// Migrations are compiled into the binary with `include_str!` and tracked
/// in the `_sqlx_migrations` table, so deployments need neither a CLI nor
/// filesystem access to the SQL files.
///
/// # Errors
///
/// Returns an error if a migration fails to execute.
#[instrument(skip(pool))]
pub async fn run(pool: &PgPool) -> Result<()> {
    let migrations = build_migrations();
    info!("Running {} embedded migration(s)", migrations.len());

    let migrator = sqlx_core::migrate::Migrator {
        migrations: Cow::Owned(migrations),
        ignore_missing: false,
        locking: true,
        no_tx: false,
    };

    migrator
        .run(pool)
        .await
        .map_err(|e| crate::error::PostgresError::Migration(format!("Migration failed: {e}")))?;

    info!("Database migrations completed successfully");

    Ok(())
}

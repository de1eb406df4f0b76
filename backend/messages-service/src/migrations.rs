use sqlx::{Pool, Postgres};

// Embed SQL migrations at compile time for deterministic startup.
const MIG_0001: &str = include_str!("../migrations/0001_create_users.sql");
const MIG_0002: &str = include_str!("../migrations/0002_create_messages.sql");

/// Run all migrations sequentially. Every statement is written to be
/// idempotent (IF NOT EXISTS), so re-running on an up-to-date database is a
/// no-op and any error is a real schema problem.
pub async fn run_all(db: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    for (label, sql) in [("0001_create_users", MIG_0001), ("0002_create_messages", MIG_0002)] {
        // raw_sql: each migration file holds multiple statements
        sqlx::raw_sql(sql).execute(db).await?;
        tracing::info!(migration = %label, "migration applied");
    }
    Ok(())
}

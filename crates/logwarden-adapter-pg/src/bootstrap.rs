//! Idempotent schema creation.

use sqlx::PgPool;

/// DDL run by [`bootstrap_schema`], in order. Every statement is safe to re-run.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS accounts (
    user_id SERIAL PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL
)"#,
    r#"CREATE TABLE IF NOT EXISTS system_log_table (
    log_id SERIAL PRIMARY KEY,
    "timestamp" TIMESTAMPTZ NOT NULL DEFAULT now(),
    user_id INTEGER NOT NULL,
    action TEXT NOT NULL,
    details TEXT
)"#,
    r#"CREATE INDEX IF NOT EXISTS system_log_table_timestamp_idx ON system_log_table ("timestamp")"#,
];

/// Create the accounts and audit-log tables if they do not exist.
pub async fn bootstrap_schema(pool: &PgPool) -> anyhow::Result<()> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!(statements = SCHEMA_STATEMENTS.len(), "Schema bootstrap complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use logwarden_core::{ACCOUNTS_TABLE, SYSTEM_LOG_TABLE};

    #[test]
    fn test_statements_are_idempotent() {
        for statement in SCHEMA_STATEMENTS {
            assert!(
                statement.contains("IF NOT EXISTS"),
                "not re-runnable: {}",
                statement
            );
        }
    }

    #[test]
    fn test_statements_cover_both_tables() {
        let ddl = SCHEMA_STATEMENTS.join("\n");
        assert!(ddl.contains(&format!("TABLE IF NOT EXISTS {} (", ACCOUNTS_TABLE)));
        assert!(ddl.contains(&format!("TABLE IF NOT EXISTS {} (", SYSTEM_LOG_TABLE)));
        assert!(ddl.contains(r#""timestamp" TIMESTAMPTZ"#));
        assert!(ddl.contains("username TEXT NOT NULL UNIQUE"));
    }
}

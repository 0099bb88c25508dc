//! Postgres-backed collaborators for the audit-log read path.
//!
//! - [`PgLogStore`] runs the built [`LogQuery`](logwarden_runtime::LogQuery)
//!   against `system_log_table`.
//! - [`PgAccountDirectory`] resolves accounts from the `accounts` table.
//! - [`bootstrap`] creates both tables when they are missing.
//! - [`connect_service`] assembles the full read path from configuration.

use logwarden_core::UpstreamConfig;
use logwarden_runtime::{Collaborator, QueryError};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod bootstrap;
mod directory;
mod service;
mod store;

pub use bootstrap::bootstrap_schema;
pub use directory::PgAccountDirectory;
pub use service::{connect_service, token_verifier};
pub use store::PgLogStore;

/// Open a connection pool to the configured upstream.
pub async fn connect(config: &UpstreamConfig) -> anyhow::Result<PgPool> {
    tracing::info!(
        upstream = %config.redacted_connection_string(),
        max_connections = config.max_connections,
        "Connecting to Postgres"
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    Ok(pool)
}

/// Classify a driver error: row-shape problems are decode failures, anything
/// else means the collaborator could not serve the request.
pub(crate) fn map_sqlx_error(collaborator: Collaborator, err: sqlx::Error) -> QueryError {
    match err {
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_) => QueryError::Decode(err.to_string()),
        other => QueryError::transport(collaborator, other),
    }
}

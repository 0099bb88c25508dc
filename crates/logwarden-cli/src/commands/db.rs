//! Database commands.
//!
//! `logwarden db init` - Create the accounts and audit-log tables.

use anyhow::Context;
use logwarden_core::UpstreamConfig;

/// Run the idempotent schema bootstrap against the configured upstream.
pub async fn init(upstream: &UpstreamConfig) -> anyhow::Result<()> {
    let pool = logwarden_adapter_pg::connect(upstream)
        .await
        .with_context(|| format!("failed to connect to {}", upstream.redacted_connection_string()))?;
    logwarden_adapter_pg::bootstrap_schema(&pool).await?;
    pool.close().await;

    println!(
        "✔ Schema ready on {}",
        upstream.redacted_connection_string()
    );
    Ok(())
}

//! Wiring of the Postgres collaborators into an [`AuditLogService`].

use crate::{PgAccountDirectory, PgLogStore, bootstrap_schema, connect};
use anyhow::Context;
use logwarden_biscuit::{TokenVerifier, load_public_key_hex};
use logwarden_core::{BiscuitConfig, LogwardenConfig};
use logwarden_runtime::AuditLogService;
use std::sync::Arc;

/// Build the token verifier from the configured public key and revocation list.
pub fn token_verifier(config: &BiscuitConfig) -> anyhow::Result<TokenVerifier> {
    let public_key_hex = config
        .resolve_public_key()
        .context("failed to read public key")?
        .context("no public key configured; set biscuit.public_key_env or biscuit.public_key_file")?;
    let public_key = load_public_key_hex(&public_key_hex)?;

    if !config.revoked_ids.is_empty() {
        tracing::info!(count = config.revoked_ids.len(), "Loaded revoked token ids");
    }
    Ok(TokenVerifier::new(public_key).with_revoked_ids(&config.revoked_ids))
}

/// Connect to the upstream, optionally bootstrap the schema, and assemble the
/// read path over Postgres.
pub async fn connect_service(config: &LogwardenConfig) -> anyhow::Result<AuditLogService> {
    let verifier = Arc::new(token_verifier(&config.biscuit)?);

    let pool = connect(&config.upstream)
        .await
        .context("failed to connect to upstream database")?;
    if config.bootstrap_schema {
        bootstrap_schema(&pool)
            .await
            .context("schema bootstrap failed")?;
    }

    let directory = Arc::new(PgAccountDirectory::new(pool.clone(), verifier.clone()));
    let store = Arc::new(PgLogStore::new(pool));
    Ok(AuditLogService::new(verifier, directory, store))
}

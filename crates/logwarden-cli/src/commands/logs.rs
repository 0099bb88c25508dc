//! Audit log commands.
//!
//! `logwarden logs query` - Run one query through the full pipeline.

use anyhow::Context;
use chrono::{DateTime, Utc};
use logwarden_core::{LogwardenConfig, RequestContext};
use logwarden_runtime::{AuditLogService, QueryFilter};
use std::io::Write;

/// Connect to the configured upstream and print matching entries as JSON lines.
pub async fn query(
    config: &LogwardenConfig,
    token: String,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    user_ids: Vec<i32>,
) -> anyhow::Result<()> {
    let service = logwarden_adapter_pg::connect_service(config).await?;
    let token = super::token::read_token(token)?;

    let mut filter = QueryFilter::new().user_ids(user_ids);
    if let Some(from) = from {
        filter = filter.since(from);
    }
    if let Some(to) = to {
        filter = filter.until(to);
    }

    let stdout = std::io::stdout();
    let count = write_entries(&service, &token, filter, &mut stdout.lock()).await?;
    tracing::info!(count, "Query finished");
    Ok(())
}

/// Run the pipeline and write one JSON object per entry to `out`.
pub async fn write_entries<W: Write>(
    service: &AuditLogService,
    token: &str,
    filter: QueryFilter,
    out: &mut W,
) -> anyhow::Result<usize> {
    let ctx = RequestContext::new();
    let entries = service
        .query_logs(&ctx, token, filter)
        .await
        .with_context(|| format!("query {} failed", ctx.trace_id))?;

    for entry in &entries {
        serde_json::to_writer(&mut *out, entry)?;
        writeln!(out)?;
    }
    Ok(entries.len())
}

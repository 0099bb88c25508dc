use crate::map_sqlx_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use logwarden_core::{LogEntry, RequestContext};
use logwarden_runtime::{Collaborator, LogQuery, LogStore, QueryError, QueryParam};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Arguments, PgPool, Row};

/// Log store reading `system_log_table`.
#[derive(Clone)]
pub struct PgLogStore {
    pool: PgPool,
}

impl PgLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn args_add<T>(args: &mut PgArguments, v: T) -> Result<(), QueryError>
where
    T: Send + Sync + 'static,
    for<'q> T: sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    args.add(v)
        .map_err(|e| QueryError::transport(Collaborator::Storage, format!("bind failed: {}", e)))
}

fn bind_params(params: &[QueryParam]) -> Result<PgArguments, QueryError> {
    let mut args = PgArguments::default();
    for param in params {
        match param {
            QueryParam::Timestamp(ts) => args_add(&mut args, *ts)?,
            QueryParam::UserIds(ids) => args_add(&mut args, ids.clone())?,
        }
    }
    Ok(args)
}

fn decode_entry(row: &PgRow) -> Result<LogEntry, sqlx::Error> {
    Ok(LogEntry {
        log_id: row.try_get("log_id")?,
        timestamp: row.try_get::<DateTime<Utc>, _>("timestamp")?,
        user_id: row.try_get("user_id")?,
        action: row.try_get("action")?,
        details: row.try_get("details")?,
    })
}

#[async_trait]
impl LogStore for PgLogStore {
    async fn fetch(
        &self,
        ctx: &RequestContext,
        query: &LogQuery,
    ) -> Result<Vec<LogEntry>, QueryError> {
        let sql = query.sql();
        let args = bind_params(query.params())?;

        tracing::debug!(trace_id = %ctx.trace_id, sql = %sql, "Fetching audit log rows");

        let rows = sqlx::query_with(&sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(Collaborator::Storage, e))?;

        rows.iter()
            .map(|row| decode_entry(row).map_err(|e| map_sqlx_error(Collaborator::Storage, e)))
            .collect()
    }
}

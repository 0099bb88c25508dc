use crate::map_sqlx_error;
use async_trait::async_trait;
use logwarden_biscuit::TokenVerifier;
use logwarden_core::{ACCOUNTS_TABLE, Account, AccountRole, RequestContext};
use logwarden_runtime::{AccountDirectory, Collaborator, QueryError};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Account directory backed by the `accounts` table.
///
/// Tokens name their holder in a signed `user` fact; the verifier extracts it
/// and the account row is looked up by that ID.
#[derive(Clone)]
pub struct PgAccountDirectory {
    pool: PgPool,
    verifier: Arc<TokenVerifier>,
}

impl PgAccountDirectory {
    pub fn new(pool: PgPool, verifier: Arc<TokenVerifier>) -> Self {
        Self { pool, verifier }
    }
}

fn decode_account(row: &PgRow) -> Result<Account, QueryError> {
    let decode = |e: sqlx::Error| map_sqlx_error(Collaborator::Directory, e);
    let role: String = row.try_get("role").map_err(decode)?;
    Ok(Account {
        user_id: row.try_get("user_id").map_err(decode)?,
        username: row.try_get("username").map_err(decode)?,
        role: role
            .parse::<AccountRole>()
            .map_err(|e| QueryError::Decode(e.to_string()))?,
    })
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    async fn lookup_account_by_token(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> Result<Option<Account>, QueryError> {
        let user_id = match self.verifier.verify(token) {
            Ok(verified) => verified.user_id,
            Err(e) => {
                tracing::debug!(
                    trace_id = %ctx.trace_id,
                    error = %e,
                    "Token does not name an account"
                );
                return Ok(None);
            }
        };

        let sql = format!(
            "SELECT user_id, username, role FROM {} WHERE user_id = $1",
            ACCOUNTS_TABLE
        );
        let row = sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(Collaborator::Directory, e))?;

        row.as_ref().map(decode_account).transpose()
    }

    async fn lookup_accounts_by_ids(
        &self,
        ctx: &RequestContext,
        ids: &BTreeSet<i32>,
    ) -> Result<Vec<Account>, QueryError> {
        let ids: Vec<i32> = ids.iter().copied().collect();
        tracing::debug!(trace_id = %ctx.trace_id, count = ids.len(), "Resolving accounts");

        let sql = format!(
            "SELECT user_id, username, role FROM {} WHERE user_id = ANY($1)",
            ACCOUNTS_TABLE
        );
        let rows = sqlx::query(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(Collaborator::Directory, e))?;

        rows.iter().map(decode_account).collect()
    }
}

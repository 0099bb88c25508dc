//! Validation of caller-supplied user-ID filters.

use crate::directory::AccountDirectory;
use crate::error::QueryError;
use logwarden_core::RequestContext;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Rejects user-ID filters that reference accounts the directory does not know.
#[derive(Clone)]
pub struct FilterValidator {
    directory: Arc<dyn AccountDirectory>,
}

impl FilterValidator {
    pub fn new(directory: Arc<dyn AccountDirectory>) -> Self {
        Self { directory }
    }

    /// Fails with `InvalidRequest` naming every ID that did not resolve.
    ///
    /// An empty set takes part in no predicate, so it is accepted without a
    /// directory round-trip.
    pub async fn validate_user_ids(
        &self,
        ctx: &RequestContext,
        ids: &BTreeSet<i32>,
    ) -> Result<(), QueryError> {
        if ids.is_empty() {
            return Ok(());
        }

        let resolved: BTreeSet<i32> = self
            .directory
            .lookup_accounts_by_ids(ctx, ids)
            .await?
            .into_iter()
            .map(|account| account.user_id)
            .collect();

        let missing_ids: Vec<i32> = ids.difference(&resolved).copied().collect();
        if missing_ids.is_empty() {
            Ok(())
        } else {
            tracing::warn!(
                trace_id = %ctx.trace_id,
                missing = ?missing_ids,
                "User-ID filter references unknown accounts"
            );
            Err(QueryError::InvalidRequest { missing_ids })
        }
    }
}

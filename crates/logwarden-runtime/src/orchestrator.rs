use crate::auth::{AuthorizationContext, IdentityVerifier, RoleAuthorizer};
use crate::directory::AccountDirectory;
use crate::error::QueryError;
use crate::filter::FilterValidator;
use crate::order::order_entries;
use crate::query::{LogQuery, QueryFilter};
use crate::store::LogStore;
use logwarden_core::{LogEntry, RequestContext};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Successful states of the request pipeline, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    IdentityVerified,
    RoleAuthorized,
    FiltersValidated,
    QueryBuilt,
    RowsFetched,
    Sorted,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::IdentityVerified => "identity_verified",
            Self::RoleAuthorized => "role_authorized",
            Self::FiltersValidated => "filters_validated",
            Self::QueryBuilt => "query_built",
            Self::RowsFetched => "rows_fetched",
            Self::Sorted => "sorted",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Read path for the audit log.
///
/// Holds no per-request state; one instance serves concurrent requests.
/// Dropping the returned future abandons whichever collaborator call is in
/// flight.
#[derive(Clone)]
pub struct AuditLogService {
    verifier: Arc<dyn IdentityVerifier>,
    authorizer: RoleAuthorizer,
    validator: FilterValidator,
    store: Arc<dyn LogStore>,
}

impl AuditLogService {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        directory: Arc<dyn AccountDirectory>,
        store: Arc<dyn LogStore>,
    ) -> Self {
        Self {
            verifier,
            authorizer: RoleAuthorizer::new(directory.clone()),
            validator: FilterValidator::new(directory),
            store,
        }
    }

    /// Return the entries matching `filter`, earliest first.
    ///
    /// The first failing stage ends the request; no rows are returned
    /// alongside an error.
    pub async fn query_logs(
        &self,
        ctx: &RequestContext,
        admin_token: &str,
        filter: QueryFilter,
    ) -> Result<Vec<LogEntry>, QueryError> {
        let started = Instant::now();
        let span = tracing::info_span!("query_logs", trace_id = %ctx.trace_id);
        let result = self
            .run(ctx, admin_token, &filter)
            .instrument(span)
            .await;

        match &result {
            Ok(entries) => tracing::info!(
                trace_id = %ctx.trace_id,
                row_count = entries.len(),
                duration_ms = started.elapsed().as_millis() as u64,
                "Audit log query completed"
            ),
            Err(e) => tracing::warn!(
                trace_id = %ctx.trace_id,
                kind = %e.kind(),
                terminal_state = ?e.terminal_state(),
                error = %e,
                "Audit log query rejected"
            ),
        }

        result
    }

    /// Run only the access checks: identity verification, then role
    /// authorization.
    ///
    /// Front ends use this to decide how to answer a request whose filters
    /// could not be parsed, so a bad credential is never reported as a bad
    /// request.
    pub async fn admit(
        &self,
        ctx: &RequestContext,
        admin_token: &str,
    ) -> Result<AuthorizationContext, QueryError> {
        if !self.verifier.verify_token(ctx, admin_token).await? {
            return Err(QueryError::Unauthenticated);
        }
        trace_stage(ctx, Stage::IdentityVerified);

        let auth = self.authorizer.authorize(ctx, admin_token).await?;
        tracing::debug!(
            trace_id = %ctx.trace_id,
            user_id = auth.user_id,
            role = %auth.role,
            "Caller authorized"
        );
        trace_stage(ctx, Stage::RoleAuthorized);
        Ok(auth)
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        admin_token: &str,
        filter: &QueryFilter,
    ) -> Result<Vec<LogEntry>, QueryError> {
        trace_stage(ctx, Stage::Start);
        self.admit(ctx, admin_token).await?;

        if let Some(ids) = filter.requested_user_ids() {
            self.validator.validate_user_ids(ctx, ids).await?;
            trace_stage(ctx, Stage::FiltersValidated);
        }

        if filter.is_inverted() {
            tracing::warn!(
                trace_id = %ctx.trace_id,
                from = ?filter.from,
                to = ?filter.to,
                "Inverted time range; no entries can match"
            );
        }

        let query = LogQuery::build(filter);
        let predicate = query.predicate();
        tracing::debug!(
            trace_id = %ctx.trace_id,
            predicate = predicate.as_deref().unwrap_or("<none>"),
            params = query.params().len(),
            "Query built"
        );
        trace_stage(ctx, Stage::QueryBuilt);

        let entries = self.store.fetch(ctx, &query).await?;
        trace_stage(ctx, Stage::RowsFetched);

        let entries = order_entries(entries);
        trace_stage(ctx, Stage::Sorted);

        trace_stage(ctx, Stage::Done);
        Ok(entries)
    }
}

fn trace_stage(ctx: &RequestContext, stage: Stage) {
    tracing::trace!(trace_id = %ctx.trace_id, stage = %stage, "Pipeline stage");
}

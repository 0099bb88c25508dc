//! Two-stage authorization chain: identity verification, then role check.

use crate::directory::AccountDirectory;
use crate::error::{ForbiddenReason, QueryError};
use async_trait::async_trait;
use logwarden_biscuit::{BiscuitError, TokenVerifier};
use logwarden_core::{AccountRole, RequestContext};
use std::sync::Arc;

/// Confirms a credential is currently valid (not expired or revoked).
///
/// `Ok(false)` means the credential is invalid; `Err` is reserved for the
/// verifier itself being unavailable.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify_token(&self, ctx: &RequestContext, token: &str) -> Result<bool, QueryError>;
}

#[async_trait]
impl IdentityVerifier for TokenVerifier {
    async fn verify_token(&self, ctx: &RequestContext, token: &str) -> Result<bool, QueryError> {
        match self.verify(token) {
            Ok(_) => Ok(true),
            Err(e) => {
                let reason = match e {
                    BiscuitError::TokenExpired { .. } => "expired",
                    BiscuitError::Revoked { .. } => "revoked",
                    BiscuitError::TokenParseFailed(_) => "malformed or bad signature",
                    _ => "failed checks",
                };
                tracing::debug!(
                    trace_id = %ctx.trace_id,
                    reason,
                    error = %e,
                    "Credential rejected"
                );
                Ok(false)
            }
        }
    }
}

/// Result of a successful role check. Lives only for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationContext {
    pub user_id: i32,
    pub role: AccountRole,
}

/// Resolves a credential to an account and requires the top administrative tier.
#[derive(Clone)]
pub struct RoleAuthorizer {
    directory: Arc<dyn AccountDirectory>,
}

impl RoleAuthorizer {
    pub fn new(directory: Arc<dyn AccountDirectory>) -> Self {
        Self { directory }
    }

    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> Result<AuthorizationContext, QueryError> {
        let Some(account) = self.directory.lookup_account_by_token(ctx, token).await? else {
            tracing::warn!(trace_id = %ctx.trace_id, "No account for verified credential");
            return Err(QueryError::Forbidden {
                reason: ForbiddenReason::NoAccount,
            });
        };

        if !account.role.is_top_tier() {
            tracing::warn!(
                trace_id = %ctx.trace_id,
                user_id = account.user_id,
                role = %account.role,
                required = %AccountRole::TOP_TIER,
                "Role below required tier"
            );
            return Err(QueryError::Forbidden {
                reason: ForbiddenReason::InsufficientRole,
            });
        }

        Ok(AuthorizationContext {
            user_id: account.user_id,
            role: account.role,
        })
    }
}

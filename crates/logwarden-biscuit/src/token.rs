//! Token creation and verification.

use crate::claims::AdminClaims;
use crate::error::BiscuitError;
use crate::keys::KeyPair;
use biscuit_auth::builder::{AuthorizerBuilder, Rule};
use biscuit_auth::macros::{check, fact};
use biscuit_auth::{Authorizer, Biscuit, PublicKey};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Builder for minting admin tokens.
pub struct TokenBuilder {
    keypair: KeyPair,
}

impl TokenBuilder {
    /// Create a new token builder with the given keypair.
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Mint an admin token for the account in `claims`.
    pub fn mint_admin_token(&self, claims: &AdminClaims) -> Result<String, BiscuitError> {
        let created = |e: biscuit_auth::error::Token| BiscuitError::TokenCreationFailed(e.to_string());

        let biscuit = Biscuit::builder()
            .fact(fact!("user({user_id})", user_id = claims.user_id as i64))
            .map_err(created)?
            .fact(fact!(
                "issued_at({ts})",
                ts = claims.issued_at.timestamp()
            ))
            .map_err(created)?
            .fact(fact!(
                "expires_at({ts})",
                ts = claims.expires_at.timestamp()
            ))
            .map_err(created)?
            .check(check!(
                "check if time($time), $time < {expires_at}",
                expires_at = claims.expires_at.timestamp()
            ))
            .map_err(created)?
            .build(self.keypair.inner())
            .map_err(created)?;

        biscuit
            .to_base64()
            .map_err(|e| BiscuitError::SerializationFailed(e.to_string()))
    }
}

/// Verifier for admin tokens.
#[derive(Debug)]
pub struct TokenVerifier {
    public_key: PublicKey,
    revoked: HashSet<String>,
}

impl TokenVerifier {
    /// Create a new token verifier with the given public key.
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            public_key,
            revoked: HashSet::new(),
        }
    }

    /// Reject tokens carrying any of these hex revocation identifiers.
    pub fn with_revoked_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.revoked
            .extend(ids.into_iter().map(|id| id.as_ref().trim().to_ascii_lowercase()));
        self
    }

    /// Verify signature, revocation and expiry, and extract the user ID.
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, BiscuitError> {
        let biscuit = Biscuit::from_base64(token.trim(), self.public_key.clone())
            .map_err(|e| BiscuitError::TokenParseFailed(e.to_string()))?;

        let revocation_ids: Vec<String> = biscuit
            .revocation_identifiers()
            .iter()
            .map(|id| to_hex(id))
            .collect();
        if let Some(id) = revocation_ids.iter().find(|id| self.revoked.contains(*id)) {
            tracing::debug!(revocation_id = %id, "Rejected revoked token");
            return Err(BiscuitError::Revoked { id: id.clone() });
        }

        let now = Utc::now().timestamp();
        let mut authorizer = AuthorizerBuilder::new()
            .code(format!(
                r#"
                time({now});
                allow if true;
                "#
            ))
            .map_err(|e| BiscuitError::VerificationFailed(e.to_string()))?
            .build(&biscuit)
            .map_err(|e| BiscuitError::VerificationFailed(e.to_string()))?;

        let user_id = query_first_i64(&mut authorizer, "user")?.ok_or_else(|| {
            BiscuitError::MissingClaim {
                claim: "user".to_string(),
            }
        })?;
        let expires_at = query_first_i64(&mut authorizer, "expires_at")?
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

        if let Some(expires_at) = expires_at {
            if now >= expires_at.timestamp() {
                return Err(BiscuitError::TokenExpired {
                    expired_at: expires_at.to_rfc3339(),
                });
            }
        }

        authorizer
            .authorize()
            .map_err(|e| BiscuitError::VerificationFailed(e.to_string()))?;

        let user_id = i32::try_from(user_id).map_err(|_| {
            BiscuitError::VerificationFailed(format!("user id {} out of range", user_id))
        })?;

        Ok(VerifiedToken {
            user_id,
            expires_at,
            revocation_ids,
        })
    }
}

/// A verified token with extracted claims.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedToken {
    /// Directory account the token was issued to.
    pub user_id: i32,
    pub expires_at: Option<DateTime<Utc>>,
    /// Hex revocation identifiers, one per block.
    pub revocation_ids: Vec<String>,
}

fn query_first_i64(authorizer: &mut Authorizer, name: &str) -> Result<Option<i64>, BiscuitError> {
    let rule: Rule = format!("data($x) <- {}($x)", name)
        .parse()
        .map_err(|e: biscuit_auth::error::Token| BiscuitError::VerificationFailed(e.to_string()))?;

    let results: Vec<(i64,)> = authorizer
        .query(rule)
        .map_err(|e| BiscuitError::VerificationFailed(e.to_string()))?;

    Ok(results.into_iter().next().map(|(v,)| v))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

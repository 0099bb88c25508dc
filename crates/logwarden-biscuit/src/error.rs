//! Error types for the Biscuit crate.

use thiserror::Error;

/// Errors that can occur during Biscuit token operations.
#[derive(Debug, Error)]
pub enum BiscuitError {
    /// Failed to generate keypair.
    #[error("failed to generate keypair: {0}")]
    KeyGenerationFailed(String),

    /// Failed to parse private key.
    #[error("failed to parse private key: {0}")]
    InvalidPrivateKey(String),

    /// Failed to parse public key.
    #[error("failed to parse public key: {0}")]
    InvalidPublicKey(String),

    /// Failed to create token.
    #[error("failed to create token: {0}")]
    TokenCreationFailed(String),

    /// Failed to serialize a token.
    #[error("token serialization error: {0}")]
    SerializationFailed(String),

    /// Failed to parse token (malformed or bad signature).
    #[error("failed to parse token: {0}")]
    TokenParseFailed(String),

    /// Token checks or policies did not pass.
    #[error("token verification failed: {0}")]
    VerificationFailed(String),

    /// Token has expired.
    #[error("token has expired at {expired_at}")]
    TokenExpired { expired_at: String },

    /// Token carries a revoked identifier.
    #[error("token has been revoked ({id})")]
    Revoked { id: String },

    /// Token is missing required claim.
    #[error("token missing required claim: {claim}")]
    MissingClaim { claim: String },

    /// Invalid lifetime string.
    #[error("invalid duration '{0}'")]
    InvalidDuration(String),

    /// IO error (reading/writing keys).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

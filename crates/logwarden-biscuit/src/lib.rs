//! # logwarden-biscuit
//!
//! Admin credentials for Logwarden, backed by Biscuit tokens.
//!
//! This crate provides functionality for:
//! - Generating and loading Ed25519 keypairs
//! - Minting admin session tokens bound to a directory user ID
//! - Verifying tokens (signature, expiry, revocation) and extracting the user ID
//!
//! ## Token layout
//!
//! | Fact / check | Meaning |
//! |--------------|---------|
//! | `user(42)` | Directory account the token was issued to |
//! | `issued_at(ts)` | Unix seconds at minting |
//! | `expires_at(ts)` | Unix seconds after which the token is invalid |
//! | `check if time($t), $t < ts` | Enforced expiry |

pub mod claims;
pub mod error;
pub mod keys;
pub mod token;

pub use biscuit_auth::PublicKey;
pub use claims::{AdminClaims, parse_duration};
pub use error::BiscuitError;
pub use keys::{
    KeyPair, PRIVATE_KEY_FILE, PUBLIC_KEY_FILE, load_public_key_hex, resolve_public_key,
};
pub use token::{TokenBuilder, TokenVerifier, VerifiedToken};

//! Token management commands.
//!
//! `logwarden token mint` - Mint an admin token for a directory account.
//! `logwarden token verify` - Verify a token is currently valid.

use anyhow::Context;
use logwarden_biscuit::{
    AdminClaims, KeyPair, PublicKey, TokenBuilder, TokenVerifier, parse_duration,
    resolve_public_key,
};
use logwarden_core::BiscuitConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolve the signing key from `--key` (path or hex), falling back to the
/// configured private key.
fn signing_key(key: Option<String>, config: &BiscuitConfig) -> anyhow::Result<KeyPair> {
    if let Some(key) = key {
        return KeyPair::resolve(&key).context(
            "Failed to load private key. Expected a key file or hex-encoded Ed25519 private key",
        );
    }
    let hex = config
        .resolve_private_key()
        .context("Failed to read configured private key")?
        .context(
            "Private key not provided. Pass --key, set LOGWARDEN_PRIVATE_KEY, or configure biscuit.private_key_file",
        )?;
    Ok(KeyPair::from_private_key_hex(&hex)?)
}

/// Resolve the verification key from `--key` (path or hex), falling back to
/// the configured public key.
fn verification_key(key: Option<String>, config: &BiscuitConfig) -> anyhow::Result<PublicKey> {
    if let Some(key) = key {
        return resolve_public_key(&key).context(
            "Failed to load public key. Expected a key file or hex-encoded Ed25519 public key",
        );
    }
    let hex = config
        .resolve_public_key()
        .context("Failed to read configured public key")?
        .context(
            "Public key not provided. Pass --key, set LOGWARDEN_PUBLIC_KEY, or configure biscuit.public_key_file",
        )?;
    Ok(logwarden_biscuit::load_public_key_hex(&hex)?)
}

/// Accept a token either inline or as a path to a file containing it.
pub(crate) fn read_token(token: String) -> anyhow::Result<String> {
    if Path::new(&token).exists() {
        Ok(fs::read_to_string(&token)?.trim().to_string())
    } else {
        Ok(token)
    }
}

/// Mint an admin token for `user_id`.
pub fn mint(
    config: &BiscuitConfig,
    private_key: Option<String>,
    user_id: i32,
    expires: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let keypair = signing_key(private_key, config)?;
    let lifetime = expires.as_deref().unwrap_or(&config.default_token_lifetime);
    let claims = AdminClaims::new(user_id, parse_duration(lifetime)?);

    let token = TokenBuilder::new(keypair).mint_admin_token(&claims)?;

    if let Some(output_path) = output {
        fs::write(&output_path, &token)?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  User ID: {}", claims.user_id);
        println!("  Expires: {}", claims.expires_at.to_rfc3339());
    } else {
        println!("{}", token);
    }

    Ok(())
}

/// Verify a token against the public key and the configured revocation list.
pub fn verify(config: &BiscuitConfig, public_key: Option<String>, token: String) -> anyhow::Result<()> {
    let public_key = verification_key(public_key, config)?;
    let verifier = TokenVerifier::new(public_key).with_revoked_ids(&config.revoked_ids);
    let token = read_token(token)?;

    let verified = verifier
        .verify(&token)
        .context("✖ Token verification failed")?;

    println!("✔ Token is valid");
    println!();
    println!("Token Details:");
    println!("  User ID: {}", verified.user_id);
    if let Some(expires_at) = verified.expires_at {
        println!("  Expires: {}", expires_at.to_rfc3339());
    }
    for id in &verified.revocation_ids {
        println!("  Revocation ID: {}", id);
    }

    Ok(())
}

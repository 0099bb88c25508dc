//! Keypair management for Biscuit tokens.

use crate::error::BiscuitError;
use biscuit_auth::{Algorithm, KeyPair as BiscuitKeyPair, PrivateKey, PublicKey};
use rand::RngCore;
use std::path::{Path, PathBuf};

/// File name used for the private half when saving to a directory.
pub const PRIVATE_KEY_FILE: &str = "private.key";
/// File name used for the public half when saving to a directory.
pub const PUBLIC_KEY_FILE: &str = "public.key";

/// An Ed25519 keypair for signing and verifying admin tokens.
pub struct KeyPair {
    inner: BiscuitKeyPair,
}

impl KeyPair {
    /// Generate a new random keypair.
    pub fn generate() -> Result<Self, BiscuitError> {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);

        let private_key = PrivateKey::from_bytes(&bytes, Algorithm::Ed25519)
            .map_err(|e| BiscuitError::KeyGenerationFailed(e.to_string()))?;
        Ok(Self {
            inner: BiscuitKeyPair::from(&private_key),
        })
    }

    /// Load a keypair from a hex-encoded private key string.
    pub fn from_private_key_hex(hex: &str) -> Result<Self, BiscuitError> {
        let private_key = PrivateKey::from_bytes_hex(hex.trim(), Algorithm::Ed25519)
            .map_err(|e| BiscuitError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self {
            inner: BiscuitKeyPair::from(&private_key),
        })
    }

    /// Load a keypair from a file containing a hex-encoded private key.
    pub fn load_from_file(path: &Path) -> Result<Self, BiscuitError> {
        let hex = std::fs::read_to_string(path)?;
        Self::from_private_key_hex(&hex)
    }

    /// Accept either a path to a key file or the hex key itself.
    pub fn resolve(path_or_hex: &str) -> Result<Self, BiscuitError> {
        let path = Path::new(path_or_hex);
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Self::from_private_key_hex(path_or_hex)
        }
    }

    pub(crate) fn inner(&self) -> &BiscuitKeyPair {
        &self.inner
    }

    pub fn public_key(&self) -> PublicKey {
        self.inner.public()
    }

    pub fn private_key_hex(&self) -> String {
        self.inner.private().to_bytes_hex()
    }

    pub fn public_key_hex(&self) -> String {
        self.inner.public().to_bytes_hex()
    }

    /// Write `private.key` and `public.key` into `dir`, creating it if needed.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(PathBuf, PathBuf), BiscuitError> {
        std::fs::create_dir_all(dir)?;
        let private_path = dir.join(PRIVATE_KEY_FILE);
        let public_path = dir.join(PUBLIC_KEY_FILE);
        std::fs::write(&private_path, self.private_key_hex())?;
        std::fs::write(&public_path, self.public_key_hex())?;
        Ok((private_path, public_path))
    }
}

/// Load a public key from hex string (for verification-only scenarios).
pub fn load_public_key_hex(hex: &str) -> Result<PublicKey, BiscuitError> {
    PublicKey::from_bytes_hex(hex.trim(), Algorithm::Ed25519)
        .map_err(|e| BiscuitError::InvalidPublicKey(e.to_string()))
}

/// Accept either a path to a public key file or the hex key itself.
pub fn resolve_public_key(path_or_hex: &str) -> Result<PublicKey, BiscuitError> {
    let path = Path::new(path_or_hex);
    if path.exists() {
        let hex = std::fs::read_to_string(path)?;
        load_public_key_hex(&hex)
    } else {
        load_public_key_hex(path_or_hex)
    }
}

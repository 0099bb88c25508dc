//! Biscuit credential configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for admin credential keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiscuitConfig {
    /// Environment variable containing the public key (hex-encoded).
    #[serde(default)]
    pub public_key_env: Option<String>,

    /// Path to the public key file.
    #[serde(default)]
    pub public_key_file: Option<PathBuf>,

    /// Environment variable containing the private key (hex-encoded).
    #[serde(default)]
    pub private_key_env: Option<String>,

    /// Path to the private key file.
    #[serde(default)]
    pub private_key_file: Option<PathBuf>,

    /// Lifetime of newly minted admin tokens (e.g., "12h", "7d").
    #[serde(default = "default_token_lifetime")]
    pub default_token_lifetime: String,

    /// Hex revocation identifiers of tokens that must no longer verify.
    #[serde(default)]
    pub revoked_ids: Vec<String>,
}

impl Default for BiscuitConfig {
    fn default() -> Self {
        Self {
            public_key_env: None,
            public_key_file: None,
            private_key_env: None,
            private_key_file: None,
            default_token_lifetime: default_token_lifetime(),
            revoked_ids: Vec::new(),
        }
    }
}

impl BiscuitConfig {
    /// Resolve the public key from environment or file.
    pub fn resolve_public_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve_key(self.public_key_env.as_deref(), self.public_key_file.as_ref())
    }

    /// Resolve the private key from environment or file.
    pub fn resolve_private_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve_key(
            self.private_key_env.as_deref(),
            self.private_key_file.as_ref(),
        )
    }
}

fn resolve_key(
    env_var: Option<&str>,
    path: Option<&PathBuf>,
) -> Result<Option<String>, std::io::Error> {
    // Environment wins over file
    if let Some(env_var) = env_var {
        if let Ok(key) = std::env::var(env_var) {
            return Ok(Some(key.trim().to_string()));
        }
    }

    if let Some(path) = path {
        if path.exists() {
            let key = std::fs::read_to_string(path)?;
            return Ok(Some(key.trim().to_string()));
        }
    }

    Ok(None)
}

fn default_token_lifetime() -> String {
    "12h".to_string()
}

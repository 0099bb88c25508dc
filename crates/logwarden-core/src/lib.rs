use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// Configuration types shared across all Logwarden crates
pub mod config;

pub use config::{
    BiscuitConfig, ConfigError, LoggingConfig, LogwardenConfig, ServerConfig, UpstreamConfig,
};

/// Name of the table holding audit log rows.
pub const SYSTEM_LOG_TABLE: &str = "system_log_table";

/// Name of the table holding directory accounts.
pub const ACCOUNTS_TABLE: &str = "accounts";

/// One recorded action, as persisted by the write path.
///
/// Entries are immutable once stored; this service only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Store-assigned, monotonically increasing identifier.
    pub log_id: i32,
    /// When the action occurred.
    pub timestamp: DateTime<Utc>,
    /// Acting account. Not checked against the directory at read time.
    pub user_id: i32,
    /// Short classification (e.g. "login", "delete_user").
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Account privilege tiers, ordered lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    Viewer,
    Operator,
    Admin,
    SuperAdmin,
}

impl AccountRole {
    /// The single tier permitted to read the audit log.
    pub const TOP_TIER: AccountRole = AccountRole::SuperAdmin;

    pub fn is_top_tier(self) -> bool {
        self == Self::TOP_TIER
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Operator => "operator",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored role string is not one of the known tiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown account role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for AccountRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viewer" => Ok(Self::Viewer),
            "operator" => Ok(Self::Operator),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// A directory account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: i32,
    pub username: String,
    pub role: AccountRole,
}

/// Request-scoped context threaded through every pipeline stage.
///
/// Holds no mutable state; cloning is cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub trace_id: Uuid,
}

impl RequestContext {
    /// Create a context with a fresh trace identifier.
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::new_v4(),
        }
    }

    /// Reuse an inbound correlation id when it is a valid UUID.
    pub fn from_header(value: Option<&str>) -> Self {
        value
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map(|trace_id| Self { trace_id })
            .unwrap_or_default()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

//! Error taxonomy for the audit-log read path.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// External collaborator that failed at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collaborator {
    IdentityService,
    Directory,
    Storage,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityService => write!(f, "identity service"),
            Self::Directory => write!(f, "account directory"),
            Self::Storage => write!(f, "log storage"),
        }
    }
}

/// Why a verified caller was refused.
///
/// Both reasons render identically to the caller; the distinction is only
/// recorded in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    /// No account resolves from the token.
    NoAccount,
    /// The account exists but is below the top administrative tier.
    InsufficientRole,
}

/// Errors returned by `query_logs` and every stage behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The credential failed identity verification.
    #[error("authentication failed: credential is not valid")]
    Unauthenticated,

    /// Valid identity, but no account or insufficient role.
    #[error("access denied")]
    Forbidden { reason: ForbiddenReason },

    /// One or more requested user IDs do not resolve to an account.
    #[error("unknown user ids: {}", join_ids(.missing_ids))]
    InvalidRequest { missing_ids: Vec<i32> },

    /// A stored row does not match the log entry shape.
    #[error("failed to decode stored row: {0}")]
    Decode(String),

    /// A collaborator was unreachable or errored.
    #[error("{collaborator} unavailable: {message}")]
    Transport {
        collaborator: Collaborator,
        message: String,
    },
}

impl QueryError {
    pub fn transport(collaborator: Collaborator, message: impl fmt::Display) -> Self {
        Self::Transport {
            collaborator,
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// The pipeline state this failure ends in.
    pub fn terminal_state(&self) -> TerminalState {
        match self {
            Self::Unauthenticated | Self::Forbidden { .. } => TerminalState::AccessDenied,
            Self::InvalidRequest { .. } => TerminalState::InvalidRequest,
            Self::Decode(_)
            | Self::Transport {
                collaborator: Collaborator::Storage,
                ..
            } => TerminalState::StorageFailure,
            Self::Transport { .. } => TerminalState::Unavailable,
        }
    }
}

/// Classification of a [`QueryError`], one per error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    InvalidRequest,
    Decode,
    Transport,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::InvalidRequest => "invalid_request",
            Self::Decode => "decode_error",
            Self::Transport => "transport_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure states of the request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
    AccessDenied,
    InvalidRequest,
    StorageFailure,
    /// Identity service or directory could not be reached.
    Unavailable,
}

fn join_ids(ids: &[i32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_lists_every_id() {
        let err = QueryError::InvalidRequest {
            missing_ids: vec![9, 11],
        };
        assert_eq!(err.to_string(), "unknown user ids: 9, 11");
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(err.terminal_state(), TerminalState::InvalidRequest);
    }

    #[test]
    fn test_forbidden_reasons_render_identically() {
        let no_account = QueryError::Forbidden {
            reason: ForbiddenReason::NoAccount,
        };
        let wrong_role = QueryError::Forbidden {
            reason: ForbiddenReason::InsufficientRole,
        };
        assert_eq!(no_account.to_string(), wrong_role.to_string());
        assert_eq!(no_account.kind(), wrong_role.kind());
    }

    #[test]
    fn test_terminal_states() {
        assert_eq!(
            QueryError::Unauthenticated.terminal_state(),
            TerminalState::AccessDenied
        );
        assert_eq!(
            QueryError::Decode("bad row".into()).terminal_state(),
            TerminalState::StorageFailure
        );
        assert_eq!(
            QueryError::transport(Collaborator::Storage, "timeout").terminal_state(),
            TerminalState::StorageFailure
        );
        assert_eq!(
            QueryError::transport(Collaborator::Directory, "refused").terminal_state(),
            TerminalState::Unavailable
        );
    }

    #[test]
    fn test_transport_message() {
        let err = QueryError::transport(Collaborator::IdentityService, "connection reset");
        assert_eq!(
            err.to_string(),
            "identity service unavailable: connection reset"
        );
        assert_eq!(err.kind().as_str(), "transport_failure");
    }
}

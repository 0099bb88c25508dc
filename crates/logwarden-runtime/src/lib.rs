//! # logwarden-runtime
//!
//! The audit-log read path: who may see what, which rows come back, and in
//! what order.
//!
//! A request flows through these stages, each short-circuiting on failure:
//!
//! | Stage | Type |
//! |-------|------|
//! | Identity verification | [`auth::IdentityVerifier`] |
//! | Role authorization | [`auth::RoleAuthorizer`] |
//! | User-ID filter validation (only when IDs are given) | [`filter::FilterValidator`] |
//! | Query building | [`query::LogQuery::build`] |
//! | Row fetch | [`store::LogStore`] |
//! | Ordering | [`order::order_entries`] |
//!
//! [`orchestrator::AuditLogService`] wires them together behind a single
//! `query_logs` entry point.

pub mod auth;
pub mod directory;
pub mod error;
pub mod filter;
pub mod order;
pub mod orchestrator;
pub mod query;
pub mod store;

pub use auth::{AuthorizationContext, IdentityVerifier, RoleAuthorizer};
pub use directory::{AccountDirectory, MemoryDirectory};
pub use error::{Collaborator, ErrorKind, ForbiddenReason, QueryError, TerminalState};
pub use filter::FilterValidator;
pub use order::order_entries;
pub use orchestrator::{AuditLogService, Stage};
pub use query::{Clause, LogQuery, QueryFilter, QueryParam};
pub use store::{LogStore, MemoryLogStore};

//! Log store contract.

use crate::error::QueryError;
use crate::query::LogQuery;
use async_trait::async_trait;
use logwarden_core::{LogEntry, RequestContext};

/// Executes a built query against the audit-log table.
///
/// Returns an empty list when nothing matches. Rows that do not decode into a
/// [`LogEntry`] fail the whole fetch with [`QueryError::Decode`].
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn fetch(
        &self,
        ctx: &RequestContext,
        query: &LogQuery,
    ) -> Result<Vec<LogEntry>, QueryError>;
}

/// In-memory log store. Rows are returned in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogStore {
    entries: Vec<LogEntry>,
}

impl MemoryLogStore {
    pub fn new(entries: Vec<LogEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn fetch(
        &self,
        _ctx: &RequestContext,
        query: &LogQuery,
    ) -> Result<Vec<LogEntry>, QueryError> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect())
    }
}

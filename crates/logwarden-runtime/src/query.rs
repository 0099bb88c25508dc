//! Parameterized query construction for the audit-log table.
//!
//! [`LogQuery::build`] is a pure function of the [`QueryFilter`]: clauses are
//! emitted in a fixed order and every filter value becomes a positional bind
//! parameter. No filter value is ever written into the SQL text.

use chrono::{DateTime, Utc};
use logwarden_core::{LogEntry, SYSTEM_LOG_TABLE};
use std::collections::BTreeSet;

/// Column list selected for every log query, in decode order.
pub const LOG_COLUMNS: &str = r#"log_id, "timestamp", user_id, action, details"#;

const TIMESTAMP_COLUMN: &str = r#""timestamp""#;
const USER_ID_COLUMN: &str = "user_id";

/// Request-scoped filter. Bounds are inclusive.
///
/// `from <= to` is not enforced; an inverted range simply matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// `None` or a non-empty set.
    pub user_ids: Option<BTreeSet<i32>>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive lower bound.
    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Inclusive upper bound.
    pub fn until(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    /// Restrict to these acting users. An empty iterator leaves the filter unset.
    pub fn user_ids(mut self, ids: impl IntoIterator<Item = i32>) -> Self {
        let ids: BTreeSet<i32> = ids.into_iter().collect();
        self.user_ids = (!ids.is_empty()).then_some(ids);
        self
    }

    /// The user-ID set, if one is present and non-empty.
    pub fn requested_user_ids(&self) -> Option<&BTreeSet<i32>> {
        self.user_ids.as_ref().filter(|ids| !ids.is_empty())
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from > to)
    }
}

/// A typed bind parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Timestamp(DateTime<Utc>),
    /// Sorted, de-duplicated user IDs bound as one array parameter.
    UserIds(Vec<i32>),
}

/// One predicate clause. Positions are 1-based placeholder numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    /// `"timestamp" >= $from AND "timestamp" <= $to`
    Between { from: usize, to: usize },
    /// `"timestamp" >= $n`
    Since(usize),
    /// `"timestamp" <= $n`
    Until(usize),
    /// `user_id = ANY($n)`
    UserIn(usize),
}

impl Clause {
    pub fn render(&self) -> String {
        match self {
            Self::Between { from, to } => format!(
                "{col} >= ${from} AND {col} <= ${to}",
                col = TIMESTAMP_COLUMN
            ),
            Self::Since(n) => format!("{} >= ${}", TIMESTAMP_COLUMN, n),
            Self::Until(n) => format!("{} <= ${}", TIMESTAMP_COLUMN, n),
            Self::UserIn(n) => format!("{} = ANY(${})", USER_ID_COLUMN, n),
        }
    }
}

/// Output of the query builder: ordered clauses and their bind parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    clauses: Vec<Clause>,
    params: Vec<QueryParam>,
}

impl LogQuery {
    /// Translate a filter into clauses and positional parameters.
    ///
    /// Order is fixed: the time clause (combined range, lower bound, or upper
    /// bound) comes first, then user-ID membership.
    pub fn build(filter: &QueryFilter) -> Self {
        let time_part = match (filter.from, filter.to) {
            (Some(from), Some(to)) => Some((
                Clause::Between { from: 1, to: 2 },
                vec![QueryParam::Timestamp(from), QueryParam::Timestamp(to)],
            )),
            (Some(from), None) => Some((Clause::Since(1), vec![QueryParam::Timestamp(from)])),
            (None, Some(to)) => Some((Clause::Until(1), vec![QueryParam::Timestamp(to)])),
            (None, None) => None,
        };

        let (mut clauses, mut params) = time_part
            .map(|(clause, params)| (vec![clause], params))
            .unwrap_or_default();

        if let Some(ids) = filter.requested_user_ids() {
            params.push(QueryParam::UserIds(ids.iter().copied().collect()));
            clauses.push(Clause::UserIn(params.len()));
        }

        Self { clauses, params }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    /// Clauses joined with `AND`, or `None` when every row is a candidate.
    pub fn predicate(&self) -> Option<String> {
        if self.clauses.is_empty() {
            return None;
        }
        Some(
            self.clauses
                .iter()
                .map(Clause::render)
                .collect::<Vec<_>>()
                .join(" AND "),
        )
    }

    /// Full SELECT statement against the audit-log table.
    pub fn sql(&self) -> String {
        let base = format!("SELECT {} FROM {}", LOG_COLUMNS, SYSTEM_LOG_TABLE);
        match self.predicate() {
            Some(predicate) => format!("{} WHERE {}", base, predicate),
            None => base,
        }
    }

    /// Evaluate the clauses against an in-memory entry, as the SQL would.
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.clauses.iter().all(|clause| match *clause {
            Clause::Between { from, to } => {
                match (self.timestamp_at(from), self.timestamp_at(to)) {
                    (Some(from), Some(to)) => entry.timestamp >= from && entry.timestamp <= to,
                    _ => false,
                }
            }
            Clause::Since(n) => self
                .timestamp_at(n)
                .is_some_and(|from| entry.timestamp >= from),
            Clause::Until(n) => self
                .timestamp_at(n)
                .is_some_and(|to| entry.timestamp <= to),
            Clause::UserIn(n) => match self.params.get(n.wrapping_sub(1)) {
                Some(QueryParam::UserIds(ids)) => ids.binary_search(&entry.user_id).is_ok(),
                _ => false,
            },
        })
    }

    fn timestamp_at(&self, position: usize) -> Option<DateTime<Utc>> {
        match self.params.get(position.wrapping_sub(1)) {
            Some(QueryParam::Timestamp(ts)) => Some(*ts),
            _ => None,
        }
    }
}

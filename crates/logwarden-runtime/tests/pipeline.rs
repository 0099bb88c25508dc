//! End-to-end tests for the audit-log read path, using in-memory collaborators.
//!
//! Run with: cargo test --package logwarden-runtime --test pipeline

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use logwarden_core::{Account, AccountRole, LogEntry, RequestContext};
use logwarden_runtime::{
    AccountDirectory, AuditLogService, Collaborator, ErrorKind, ForbiddenReason,
    IdentityVerifier, LogQuery, LogStore, MemoryDirectory, MemoryLogStore, QueryError,
    QueryFilter, TerminalState,
};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const ADMIN_TOKEN: &str = "admin-token";
const OPERATOR_TOKEN: &str = "operator-token";
const ORPHAN_TOKEN: &str = "orphan-token";

/// Accepts a fixed set of tokens, or fails as if unreachable.
struct StaticVerifier {
    valid: HashSet<String>,
    unreachable: bool,
    calls: AtomicUsize,
}

impl StaticVerifier {
    fn accepting(tokens: &[&str]) -> Self {
        Self {
            valid: tokens.iter().map(|t| t.to_string()).collect(),
            unreachable: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn unreachable() -> Self {
        Self {
            valid: HashSet::new(),
            unreachable: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify_token(&self, _ctx: &RequestContext, token: &str) -> Result<bool, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(QueryError::transport(
                Collaborator::IdentityService,
                "connection refused",
            ));
        }
        Ok(self.valid.contains(token))
    }
}

/// Directory wrapper counting calls per operation; can be made unreachable
/// for token lookups, bulk lookups, or both.
struct CountingDirectory {
    inner: MemoryDirectory,
    by_token: AtomicUsize,
    by_ids: AtomicUsize,
    token_lookup_down: bool,
    bulk_lookup_down: bool,
}

fn directory_down() -> QueryError {
    QueryError::transport(Collaborator::Directory, "connection reset")
}

impl CountingDirectory {
    fn total_calls(&self) -> usize {
        self.by_token.load(Ordering::SeqCst) + self.by_ids.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountDirectory for CountingDirectory {
    async fn lookup_account_by_token(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> Result<Option<Account>, QueryError> {
        self.by_token.fetch_add(1, Ordering::SeqCst);
        if self.token_lookup_down {
            return Err(directory_down());
        }
        self.inner.lookup_account_by_token(ctx, token).await
    }

    async fn lookup_accounts_by_ids(
        &self,
        ctx: &RequestContext,
        ids: &BTreeSet<i32>,
    ) -> Result<Vec<Account>, QueryError> {
        self.by_ids.fetch_add(1, Ordering::SeqCst);
        if self.bulk_lookup_down {
            return Err(directory_down());
        }
        self.inner.lookup_accounts_by_ids(ctx, ids).await
    }
}

/// Store wrapper counting fetches; can be switched to fail.
struct CountingStore {
    inner: MemoryLogStore,
    fetches: AtomicUsize,
    failure: Option<QueryError>,
}

#[async_trait]
impl LogStore for CountingStore {
    async fn fetch(
        &self,
        ctx: &RequestContext,
        query: &LogQuery,
    ) -> Result<Vec<LogEntry>, QueryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.inner.fetch(ctx, query).await
    }
}

struct Harness {
    service: AuditLogService,
    verifier: Arc<StaticVerifier>,
    directory: Arc<CountingDirectory>,
    store: Arc<CountingStore>,
}

impl Harness {
    fn fetches(&self) -> usize {
        self.store.fetches.load(Ordering::SeqCst)
    }
}

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn entry(log_id: i32, user_id: i32, at: &str, action: &str) -> LogEntry {
    LogEntry {
        log_id,
        timestamp: ts(at),
        user_id,
        action: action.to_string(),
        details: None,
    }
}

/// Rows deliberately stored out of chronological order.
fn stored_entries() -> Vec<LogEntry> {
    vec![
        entry(1, 5, "2024-03-10T12:00:00Z", "login"),
        entry(2, 6, "2024-01-05T08:30:00Z", "create_user"),
        entry(3, 5, "2024-02-20T17:45:00Z", "update_profile"),
        entry(4, 7, "2024-02-20T17:45:00Z", "delete_user"),
        entry(5, 6, "2024-04-01T00:00:00Z", "logout"),
        entry(6, 5, "2024-01-01T00:00:00Z", "login"),
    ]
}

fn directory() -> MemoryDirectory {
    let account = |user_id: i32, role: AccountRole| Account {
        user_id,
        username: format!("user{}", user_id),
        role,
    };
    MemoryDirectory::new()
        .with_account(account(1, AccountRole::SuperAdmin))
        .with_account(account(2, AccountRole::Operator))
        .with_account(account(5, AccountRole::Viewer))
        .with_account(account(6, AccountRole::Viewer))
        .with_account(account(7, AccountRole::Admin))
        .with_token(ADMIN_TOKEN, 1)
        .with_token(OPERATOR_TOKEN, 2)
        .with_token(ORPHAN_TOKEN, 404)
}

fn harness_with(verifier: StaticVerifier, failure: Option<QueryError>) -> Harness {
    harness_full(verifier, failure, (false, false))
}

/// `outage` is (token lookup down, bulk lookup down).
fn harness_full(
    verifier: StaticVerifier,
    failure: Option<QueryError>,
    outage: (bool, bool),
) -> Harness {
    let verifier = Arc::new(verifier);
    let directory = Arc::new(CountingDirectory {
        inner: directory(),
        by_token: AtomicUsize::new(0),
        by_ids: AtomicUsize::new(0),
        token_lookup_down: outage.0,
        bulk_lookup_down: outage.1,
    });
    let store = Arc::new(CountingStore {
        inner: MemoryLogStore::new(stored_entries()),
        fetches: AtomicUsize::new(0),
        failure,
    });
    let service = AuditLogService::new(verifier.clone(), directory.clone(), store.clone());
    Harness {
        service,
        verifier,
        directory,
        store,
    }
}

fn harness() -> Harness {
    harness_with(
        StaticVerifier::accepting(&[ADMIN_TOKEN, OPERATOR_TOKEN, ORPHAN_TOKEN]),
        None,
    )
}

fn assert_chronological(entries: &[LogEntry]) {
    assert!(
        entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
        "entries not sorted: {:?}",
        entries.iter().map(|e| e.log_id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn scenario_a_no_filters_returns_everything_sorted() {
    let h = harness();
    let entries = h
        .service
        .query_logs(&RequestContext::new(), ADMIN_TOKEN, QueryFilter::new())
        .await
        .unwrap();

    assert_eq!(entries.len(), stored_entries().len());
    assert_chronological(&entries);
    // Equal timestamps keep storage order (3 before 4)
    assert_eq!(
        entries.iter().map(|e| e.log_id).collect::<Vec<_>>(),
        vec![6, 2, 3, 4, 1, 5]
    );
    // No user-ID filter means no bulk directory lookup
    assert_eq!(h.directory.by_ids.load(Ordering::SeqCst), 0);
    assert_eq!(h.fetches(), 1);
}

#[tokio::test]
async fn scenario_b_time_range_is_inclusive() {
    let h = harness();
    let filter = QueryFilter::new()
        .since(ts("2024-01-05T08:30:00Z"))
        .until(ts("2024-03-10T12:00:00Z"));

    let entries = h
        .service
        .query_logs(&RequestContext::new(), ADMIN_TOKEN, filter)
        .await
        .unwrap();

    assert_eq!(
        entries.iter().map(|e| e.log_id).collect::<Vec<_>>(),
        vec![2, 3, 4, 1]
    );
    assert_chronological(&entries);
}

#[tokio::test]
async fn scenario_c_unknown_user_id_is_rejected_before_storage() {
    let h = harness();
    let err = h
        .service
        .query_logs(
            &RequestContext::new(),
            ADMIN_TOKEN,
            QueryFilter::new().user_ids([5, 9]),
        )
        .await
        .unwrap_err();

    assert_eq!(err, QueryError::InvalidRequest { missing_ids: vec![9] });
    assert!(err.to_string().contains('9'));
    assert_eq!(h.fetches(), 0);
}

#[tokio::test]
async fn scenario_d_single_user_filter() {
    let h = harness();
    let entries = h
        .service
        .query_logs(
            &RequestContext::new(),
            ADMIN_TOKEN,
            QueryFilter::new().user_ids([5]),
        )
        .await
        .unwrap();

    assert_eq!(
        entries.iter().map(|e| e.log_id).collect::<Vec<_>>(),
        vec![6, 3, 1]
    );
    assert!(entries.iter().all(|e| e.user_id == 5));
    assert_eq!(h.directory.by_ids.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scenario_e_unverified_token_touches_nothing_else() {
    let h = harness_with(StaticVerifier::accepting(&[]), None);
    let err = h
        .service
        .query_logs(&RequestContext::new(), ADMIN_TOKEN, QueryFilter::new())
        .await
        .unwrap_err();

    assert_eq!(err, QueryError::Unauthenticated);
    assert_eq!(h.verifier.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.directory.total_calls(), 0);
    assert_eq!(h.fetches(), 0);
}

#[tokio::test]
async fn lower_role_is_forbidden_without_storage_access() {
    let h = harness();
    let err = h
        .service
        .query_logs(
            &RequestContext::new(),
            OPERATOR_TOKEN,
            QueryFilter::new().user_ids([5]),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        QueryError::Forbidden {
            reason: ForbiddenReason::InsufficientRole
        }
    );
    assert_eq!(h.directory.by_ids.load(Ordering::SeqCst), 0);
    assert_eq!(h.fetches(), 0);
}

#[tokio::test]
async fn unresolvable_account_is_forbidden() {
    let h = harness();
    let err = h
        .service
        .query_logs(&RequestContext::new(), ORPHAN_TOKEN, QueryFilter::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(h.fetches(), 0);
}

#[tokio::test]
async fn identity_service_outage_is_transport_not_unauthenticated() {
    let h = harness_with(StaticVerifier::unreachable(), None);
    let err = h
        .service
        .query_logs(&RequestContext::new(), ADMIN_TOKEN, QueryFilter::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(h.directory.total_calls(), 0);
    assert_eq!(h.fetches(), 0);
}

#[tokio::test]
async fn directory_outage_during_role_check_is_unavailable() {
    let h = harness_full(
        StaticVerifier::accepting(&[ADMIN_TOKEN]),
        None,
        (true, false),
    );
    let err = h
        .service
        .query_logs(
            &RequestContext::new(),
            ADMIN_TOKEN,
            QueryFilter::new().user_ids([5]),
        )
        .await
        .unwrap_err();

    assert_eq!(err, directory_down());
    assert_eq!(err.terminal_state(), TerminalState::Unavailable);
    assert_eq!(h.directory.by_ids.load(Ordering::SeqCst), 0);
    assert_eq!(h.fetches(), 0);
}

#[tokio::test]
async fn directory_outage_during_id_validation_is_unavailable() {
    let h = harness_full(
        StaticVerifier::accepting(&[ADMIN_TOKEN]),
        None,
        (false, true),
    );
    let err = h
        .service
        .query_logs(
            &RequestContext::new(),
            ADMIN_TOKEN,
            QueryFilter::new().user_ids([5, 6]),
        )
        .await
        .unwrap_err();

    assert_eq!(err, directory_down());
    assert_eq!(err.terminal_state(), TerminalState::Unavailable);
    assert_eq!(h.directory.by_token.load(Ordering::SeqCst), 1);
    assert_eq!(h.fetches(), 0);
}

#[tokio::test]
async fn admit_runs_access_checks_only() {
    let h = harness();
    let auth = h
        .service
        .admit(&RequestContext::new(), ADMIN_TOKEN)
        .await
        .unwrap();
    assert_eq!(auth.user_id, 1);

    let err = h
        .service
        .admit(&RequestContext::new(), OPERATOR_TOKEN)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    assert_eq!(h.directory.by_ids.load(Ordering::SeqCst), 0);
    assert_eq!(h.fetches(), 0);
}

#[tokio::test]
async fn storage_failures_keep_their_classification() {
    for failure in [
        QueryError::Decode("column \"timestamp\" is null".to_string()),
        QueryError::transport(Collaborator::Storage, "pool timed out"),
    ] {
        let h = harness_with(StaticVerifier::accepting(&[ADMIN_TOKEN]), Some(failure.clone()));
        let err = h
            .service
            .query_logs(&RequestContext::new(), ADMIN_TOKEN, QueryFilter::new())
            .await
            .unwrap_err();
        assert_eq!(err, failure);
    }
}

#[tokio::test]
async fn combined_filters_narrow_results() {
    let h = harness();
    let filter = QueryFilter::new()
        .since(ts("2024-02-01T00:00:00Z"))
        .user_ids([5, 7]);

    let entries = h
        .service
        .query_logs(&RequestContext::new(), ADMIN_TOKEN, filter)
        .await
        .unwrap();

    assert_eq!(
        entries.iter().map(|e| e.log_id).collect::<Vec<_>>(),
        vec![3, 4, 1]
    );
}

#[tokio::test]
async fn inverted_range_yields_empty_result() {
    let h = harness();
    let filter = QueryFilter::new()
        .since(ts("2024-04-01T00:00:00Z"))
        .until(ts("2024-01-01T00:00:00Z"));

    let entries = h
        .service
        .query_logs(&RequestContext::new(), ADMIN_TOKEN, filter)
        .await
        .unwrap();

    assert!(entries.is_empty());
    assert_eq!(h.fetches(), 1);
}

#[tokio::test]
async fn no_matching_rows_is_not_an_error() {
    let h = harness();
    let entries = h
        .service
        .query_logs(
            &RequestContext::new(),
            ADMIN_TOKEN,
            QueryFilter::new().since(ts("2030-01-01T00:00:00Z")),
        )
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn concurrent_requests_share_one_service() {
    let h = harness();
    let service = Arc::new(h.service.clone());

    let mut handles = Vec::new();
    for user_id in [5, 6, 7] {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .query_logs(
                    &RequestContext::new(),
                    ADMIN_TOKEN,
                    QueryFilter::new().user_ids([user_id]),
                )
                .await
                .map(|entries| (user_id, entries))
        }));
    }

    for handle in handles {
        let (user_id, entries) = handle.await.unwrap().unwrap();
        assert!(!entries.is_empty());
        assert!(entries.iter().all(|e| e.user_id == user_id));
        assert_chronological(&entries);
    }
    assert_eq!(h.fetches(), 3);
}

//! Account directory contract.

use crate::error::QueryError;
use async_trait::async_trait;
use logwarden_core::{Account, RequestContext};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Read-only view of the user directory.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Resolve the account a credential belongs to.
    async fn lookup_account_by_token(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> Result<Option<Account>, QueryError>;

    /// Resolve every account whose ID is in `ids`. Unknown IDs are simply absent.
    async fn lookup_accounts_by_ids(
        &self,
        ctx: &RequestContext,
        ids: &BTreeSet<i32>,
    ) -> Result<Vec<Account>, QueryError>;
}

/// Fixed in-memory directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    accounts: BTreeMap<i32, Account>,
    tokens: HashMap<String, i32>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.insert(account.user_id, account);
        self
    }

    /// Bind a credential to a user ID. The account itself need not exist.
    pub fn with_token(mut self, token: impl Into<String>, user_id: i32) -> Self {
        self.tokens.insert(token.into(), user_id);
        self
    }
}

#[async_trait]
impl AccountDirectory for MemoryDirectory {
    async fn lookup_account_by_token(
        &self,
        _ctx: &RequestContext,
        token: &str,
    ) -> Result<Option<Account>, QueryError> {
        Ok(self
            .tokens
            .get(token)
            .and_then(|id| self.accounts.get(id))
            .cloned())
    }

    async fn lookup_accounts_by_ids(
        &self,
        _ctx: &RequestContext,
        ids: &BTreeSet<i32>,
    ) -> Result<Vec<Account>, QueryError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.accounts.get(id))
            .cloned()
            .collect())
    }
}

//! In-memory account repository for single-node development and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use forum_core::error::AppError;
use forum_core::result::AppResult;
use forum_entity::account::{Account, NewAccount};

use super::account::AccountRepository;

#[derive(Debug, Default)]
struct InnerState {
    next_id: i64,
    rows: BTreeMap<i64, Account>,
}

/// Account repository held in process memory.
///
/// Enforces the same uniqueness rules as the PostgreSQL schema: email is
/// unique case-insensitively, `(provider, provider_id)` is unique for
/// external providers.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountRepository {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryAccountRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.state.lock().await.rows.len()
    }

    /// Whether the repository holds no accounts.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Account>> {
        Ok(self.state.lock().await.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .rows
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert(&self, data: &NewAccount) -> AppResult<Account> {
        let mut state = self.state.lock().await;

        if state
            .rows
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(AppError::conflict("Email already in use"));
        }
        if data.provider.is_external()
            && state
                .rows
                .values()
                .any(|a| a.provider == data.provider && a.provider_id == data.provider_id)
        {
            return Err(AppError::conflict(format!(
                "A {} account with this identity already exists",
                data.provider.label()
            )));
        }

        state.next_id += 1;
        let now = Utc::now();
        let account = Account {
            id: state.next_id,
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            avatar_url: data.avatar_url.clone(),
            bio: None,
            provider: data.provider,
            provider_id: data.provider_id.clone(),
            github_id: data.github_id.clone(),
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update(&self, account: &Account) -> AppResult<Account> {
        let mut state = self.state.lock().await;
        let row = state
            .rows
            .get_mut(&account.id)
            .ok_or_else(|| AppError::not_found(format!("Account {} not found", account.id)))?;

        row.username = account.username.clone();
        row.avatar_url = account.avatar_url.clone();
        row.bio = account.bio.clone();
        row.provider_id = account.provider_id.clone();
        row.github_id = account.github_id.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

//! Account repository trait and PostgreSQL implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use forum_core::error::{AppError, ErrorKind};
use forum_core::result::AppResult;
use forum_entity::account::{Account, NewAccount};

/// Persistence operations the authentication subsystem needs for accounts.
///
/// `insert` and `update` together form the insert-or-update `save`. The
/// implementation enforces email and `(provider, provider_id)` uniqueness and
/// reports a violation as a [`ErrorKind::Conflict`] error.
#[async_trait]
pub trait AccountRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find an account by primary key.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Account>>;

    /// Find an account by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Insert a new account and return the stored row.
    async fn insert(&self, data: &NewAccount) -> AppResult<Account>;

    /// Persist the mutable profile fields of an existing account.
    ///
    /// `provider` and `email` are never rewritten.
    async fn update(&self, account: &Account) -> AppResult<Account>;
}

/// PostgreSQL-backed account repository.
#[derive(Debug, Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by id", e)
            })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by email", e)
            })
    }

    async fn insert(&self, data: &NewAccount) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts (username, email, password_hash, avatar_url, provider, provider_id, github_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.avatar_url)
        .bind(data.provider)
        .bind(&data.provider_id)
        .bind(&data.github_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                match db_err.constraint() {
                    Some("accounts_provider_identity_key") => AppError::conflict(format!(
                        "A {} account with this identity already exists",
                        data.provider.label()
                    )),
                    _ => AppError::conflict("Email already in use"),
                }
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create account", e),
        })
    }

    async fn update(&self, account: &Account) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET username = $2, avatar_url = $3, bio = $4, \
                                 provider_id = $5, github_id = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.avatar_url)
        .bind(&account.bio)
        .bind(&account.provider_id)
        .bind(&account.github_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::conflict("Provider identity already bound to another account")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to update account", e),
        })?
        .ok_or_else(|| AppError::not_found(format!("Account {} not found", account.id)))
    }
}

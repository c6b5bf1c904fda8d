//! Reconciles identity provider logins with local accounts.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use forum_core::error::{AppError, ErrorKind};
use forum_database::repositories::AccountRepository;
use forum_entity::account::{Account, AuthProvider, NewAccount};

use super::profile::ProviderProfile;

/// Why a provider login could not be linked to an account.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The provider did not disclose an email address.
    #[error("Email not found from OAuth2 provider")]
    MissingEmail,
    /// The email belongs to an account created through another provider.
    #[error(
        "Looks like you're signed up with {} account. Please use your {} account to login.",
        .existing.label(),
        .existing.label()
    )]
    ProviderConflict {
        /// Provider the existing account is bound to.
        existing: AuthProvider,
    },
    /// The named provider is not supported.
    #[error("Sorry! Login with {0} is not supported yet.")]
    UnsupportedProvider(String),
    /// A concurrent login created the same account first. Retryable.
    #[error("This account was just created by another login; please try again")]
    Conflict,
    /// The account store failed.
    #[error("{0}")]
    Store(AppError),
}

impl LinkError {
    /// Whether retrying the same login may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }

    fn from_store(err: AppError) -> Self {
        if err.kind == ErrorKind::Conflict {
            Self::Conflict
        } else {
            Self::Store(err)
        }
    }
}

impl From<LinkError> for AppError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Store(e) => e,
            LinkError::Conflict => AppError::conflict(err.to_string()),
            LinkError::MissingEmail
            | LinkError::ProviderConflict { .. }
            | LinkError::UnsupportedProvider(_) => AppError::authentication(err.to_string()),
        }
    }
}

/// Resolves provider profiles into local accounts.
#[derive(Debug, Clone)]
pub struct IdentityLinker {
    accounts: Arc<dyn AccountRepository>,
}

impl IdentityLinker {
    /// Creates a linker over the given account repository.
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Finds or creates the account for a provider login.
    ///
    /// An existing account is only ever updated through the provider that
    /// created it; the email is never re-bound to another provider.
    pub async fn link(&self, profile: &ProviderProfile) -> Result<Account, LinkError> {
        let email = profile.email().ok_or(LinkError::MissingEmail)?;
        let provider = profile.provider();

        let existing = self
            .accounts
            .find_by_email(email)
            .await
            .map_err(LinkError::Store)?;

        match existing {
            Some(account) if account.provider != provider => {
                warn!(
                    account_id = account.id,
                    existing = %account.provider,
                    attempted = %provider,
                    "Provider login rejected for account bound to another provider"
                );
                Err(LinkError::ProviderConflict {
                    existing: account.provider,
                })
            }
            Some(account) => self.update_existing(account, profile).await,
            None => self.register(profile, email).await,
        }
    }

    async fn update_existing(
        &self,
        mut account: Account,
        profile: &ProviderProfile,
    ) -> Result<Account, LinkError> {
        account.username = profile.display_name().to_string();
        account.avatar_url = profile.avatar_url().map(str::to_string);
        account.provider_id = Some(profile.id());
        if account.provider == AuthProvider::Github {
            account.github_id = Some(profile.id());
        }

        let account = self
            .accounts
            .update(&account)
            .await
            .map_err(LinkError::from_store)?;
        info!(account_id = account.id, provider = %account.provider, "Updated account from provider login");
        Ok(account)
    }

    async fn register(&self, profile: &ProviderProfile, email: &str) -> Result<Account, LinkError> {
        let provider = profile.provider();
        let data = NewAccount {
            username: profile.display_name().to_string(),
            email: email.to_string(),
            password_hash: None,
            avatar_url: profile.avatar_url().map(str::to_string),
            provider,
            provider_id: Some(profile.id()),
            github_id: (provider == AuthProvider::Github).then(|| profile.id()),
        };

        let account = self
            .accounts
            .insert(&data)
            .await
            .map_err(LinkError::from_store)?;
        info!(account_id = account.id, provider = %provider, "Registered account from provider login");
        Ok(account)
    }
}

use std::sync::Arc;

use sea_orm::ConnectionTrait;

use crate::errors::InternalError;
use crate::errors::internal::{CredentialError, ValidationError};
use crate::providers::{CryptoProvider, PasswordPolicyProvider};
use crate::stores::AccountStore;
use crate::types::db::account;

/// Credentialed identities: password policy, hashing and sign-in checks
pub struct IdentityProvider {
    account_store: Arc<AccountStore>,
    crypto: Arc<CryptoProvider>,
    password_policy: Arc<PasswordPolicyProvider>,
}

impl IdentityProvider {
    pub fn new(
        account_store: Arc<AccountStore>,
        crypto: Arc<CryptoProvider>,
        password_policy: Arc<PasswordPolicyProvider>,
    ) -> Self {
        Self {
            account_store,
            crypto,
            password_policy,
        }
    }

    /// Enforce the policy and hash, before any transaction is opened
    pub fn prepare_password(&self, password: &str) -> Result<String, InternalError> {
        self.password_policy
            .validate(password)
            .map_err(ValidationError::from)?;
        self.crypto.hash_password(password)
    }

    pub async fn create_account(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
        password_hash: &str,
    ) -> Result<account::Model, InternalError> {
        self.account_store.create(conn, email, password_hash).await
    }

    /// Password sign-in. Unknown email and wrong password look the same.
    pub async fn authenticate(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
        password: &str,
    ) -> Result<account::Model, InternalError> {
        let Some(account) = self.account_store.find_by_email(conn, email).await? else {
            tracing::debug!("Sign-in attempt for unknown email");
            return Err(CredentialError::InvalidCredentials.into());
        };

        if !self.crypto.verify_password(&account.password_hash, password)? {
            return Err(CredentialError::InvalidCredentials.into());
        }

        Ok(account)
    }

    /// Replace the password after checking the current one
    pub async fn change_password(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), InternalError> {
        let account = self
            .account_store
            .find_by_id(conn, user_id)
            .await?
            .ok_or_else(|| CredentialError::AccountNotFound {
                user_id: user_id.to_owned(),
            })?;

        if !self.crypto.verify_password(&account.password_hash, current_password)? {
            return Err(CredentialError::IncorrectPassword.into());
        }

        let new_hash = self.prepare_password(new_password)?;
        self.store_password_hash(conn, user_id, &new_hash).await
    }

    pub async fn store_password_hash(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        password_hash: &str,
    ) -> Result<(), InternalError> {
        if !self
            .account_store
            .update_password_hash(conn, user_id, password_hash)
            .await?
        {
            return Err(CredentialError::AccountNotFound {
                user_id: user_id.to_owned(),
            }
            .into());
        }
        Ok(())
    }
}

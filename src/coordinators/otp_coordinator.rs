use std::sync::Arc;

use chrono::Datelike;
use sea_orm::DatabaseTransaction;

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::config::DatabaseConnections;
use crate::errors::InternalError;
use crate::errors::internal::OtpError;
use crate::providers::email_provider::render_otp_email;
use crate::providers::input_validation::normalize_email;
use crate::providers::{
    CryptoProvider, IdentityProvider, OtpProvider, PasswordPolicyProvider,
};
use crate::types::db::{VerificationType, account};
use crate::types::internal::context::RequestContext;

/// OTP email verification and password reset workflows
pub struct OtpCoordinator {
    app_data: Arc<AppData>,
    otp_provider: Arc<OtpProvider>,
    identity_provider: Arc<IdentityProvider>,
    audit_logger: Arc<AuditLogger>,
}

impl OtpCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        let crypto = Arc::new(CryptoProvider::new(app_data.secret_manager.password_pepper()));
        let otp_provider = Arc::new(OtpProvider::new(
            app_data.otp_store.clone(),
            app_data.profile_store.clone(),
            crypto.clone(),
            app_data.clock.clone(),
            app_data.settings.otp_ttl_minutes(),
            app_data.settings.otp_resend_cooldown_seconds(),
        ));
        let identity_provider = Arc::new(IdentityProvider::new(
            app_data.account_store.clone(),
            crypto,
            Arc::new(PasswordPolicyProvider::new(
                app_data.settings.password_min_length(),
            )),
        ));

        Self {
            audit_logger: app_data.audit_logger.clone(),
            app_data,
            otp_provider,
            identity_provider,
        }
    }

    /// Issue a code and email it
    ///
    /// Returns the expiry in epoch milliseconds. If the email cannot be
    /// delivered the new code is withdrawn again.
    pub async fn send_otp(
        &self,
        ctx: &RequestContext,
        email: &str,
        verification_type: VerificationType,
        user_id: Option<&str>,
    ) -> Result<i64, InternalError> {
        // Step 1: Validate email and find the account it belongs to
        let email = normalize_email(email)?;
        let account = self.find_account(&email, user_id).await?;

        // Step 2: Replace any outstanding code for the pair
        let txn = self.app_data.connections.begin_transaction().await?;
        let issued = match self
            .otp_provider
            .issue(&txn, &account.id, &email, verification_type)
            .await
        {
            Ok(issued) => issued,
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Failed to roll back OTP issue: {}", rollback_err);
                }
                return Err(e);
            }
        };
        DatabaseConnections::commit_transaction(txn).await?;

        // Step 3: Deliver
        let message = render_otp_email(
            &email,
            &issued.code,
            verification_type,
            self.otp_provider.ttl_minutes(),
            self.app_data.clock.utc().year(),
        );
        if let Err(send_err) = self.app_data.email_sender.send(message).await {
            tracing::error!(
                "Failed to deliver {} OTP to user {}: {}",
                verification_type.as_str(),
                account.id,
                send_err
            );
            if let Err(revoke_err) = self
                .otp_provider
                .revoke_unverified(&self.app_data.connections.main, &account.id, verification_type)
                .await
            {
                tracing::error!("Failed to withdraw undelivered OTP: {}", revoke_err);
            }
            return Err(send_err.into());
        }

        tracing::info!(
            "{} OTP sent to user {}",
            verification_type.as_str(),
            account.id
        );
        if let Err(audit_err) = self
            .audit_logger
            .log_otp_issued(ctx, &account.id, &email, verification_type, issued.expires_at)
            .await
        {
            tracing::error!("Failed to log OTP issue: {:?}", audit_err);
        }

        Ok(issued.expires_at)
    }

    pub async fn verify_otp(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        otp: &str,
        verification_type: VerificationType,
    ) -> Result<(), InternalError> {
        let txn = self.app_data.connections.begin_transaction().await?;
        match self
            .otp_provider
            .verify(&txn, user_id, otp, verification_type)
            .await
        {
            Ok(_) => DatabaseConnections::commit_transaction(txn).await?,
            Err(e) => {
                close_failed_verification(txn, &e).await;
                self.audit_verification_failure(ctx, user_id, verification_type, &e)
                    .await;
                return Err(e);
            }
        }

        tracing::info!(
            "{} OTP verified for user {}",
            verification_type.as_str(),
            user_id
        );
        if let Err(audit_err) = self
            .audit_logger
            .log_otp_verified(ctx, user_id, verification_type)
            .await
        {
            tracing::error!("Failed to log OTP verification: {:?}", audit_err);
        }
        Ok(())
    }

    /// Set a new password with a password-reset code
    ///
    /// The account is found by email, the same way `send_otp` found it. The
    /// code is consumed and the password replaced in the same transaction.
    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        email: &str,
        user_id: Option<&str>,
        otp: &str,
        new_password: &str,
    ) -> Result<(), InternalError> {
        // Step 1: Policy and hashing, before any storage access
        let password_hash = self.identity_provider.prepare_password(new_password)?;

        // Step 2: The account the code was sent to
        let email = normalize_email(email)?;
        let account = self.find_account(&email, user_id).await?;
        let user_id = account.id.as_str();

        // Step 3: Consume the code
        let txn = self.app_data.connections.begin_transaction().await?;
        if let Err(e) = self
            .otp_provider
            .verify(&txn, user_id, otp, VerificationType::PasswordReset)
            .await
        {
            close_failed_verification(txn, &e).await;
            self.audit_verification_failure(ctx, user_id, VerificationType::PasswordReset, &e)
                .await;
            return Err(e);
        }

        // Step 4: Replace the password
        if let Err(e) = self
            .identity_provider
            .store_password_hash(&txn, user_id, &password_hash)
            .await
        {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Failed to roll back password reset: {}", rollback_err);
            }
            return Err(e);
        }

        // Step 5: Commit
        DatabaseConnections::commit_transaction(txn).await?;

        tracing::info!("Password reset for user {}", user_id);
        if let Err(audit_err) = self
            .audit_logger
            .log_password_changed(ctx, user_id, true)
            .await
        {
            tracing::error!("Failed to log password reset: {:?}", audit_err);
        }
        Ok(())
    }

    /// The account a code is sent for. A supplied user id must belong to
    /// the supplied email.
    async fn find_account(
        &self,
        email: &str,
        user_id: Option<&str>,
    ) -> Result<account::Model, InternalError> {
        let conn = &self.app_data.connections.main;
        let account = match user_id {
            Some(user_id) => self
                .app_data
                .account_store
                .find_by_id(conn, user_id)
                .await?
                .filter(|account| account.email == email),
            None => self.app_data.account_store.find_by_email(conn, email).await?,
        };

        account.ok_or_else(|| {
            OtpError::AccountNotFound {
                email: email.to_owned(),
            }
            .into()
        })
    }

    async fn audit_verification_failure(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        verification_type: VerificationType,
        err: &InternalError,
    ) {
        tracing::warn!(
            "{} OTP verification failed for user {}: {}",
            verification_type.as_str(),
            user_id,
            err
        );
        if let Err(audit_err) = self
            .audit_logger
            .log_otp_verification_failed(ctx, user_id, verification_type, err.code())
            .await
        {
            tracing::error!("Failed to log OTP verification failure: {:?}", audit_err);
        }
    }
}

/// Wrong guesses keep their attempt count; every other failure is undone
async fn close_failed_verification(txn: DatabaseTransaction, err: &InternalError) {
    let counted = matches!(
        err,
        InternalError::Otp(OtpError::Mismatch | OtpError::TooManyAttempts)
    );
    let result = if counted {
        DatabaseConnections::commit_transaction(txn).await
    } else {
        txn.rollback()
            .await
            .map_err(|e| InternalError::database("rollback_otp_verification", e))
    };
    if let Err(close_err) = result {
        tracing::error!("Failed to close OTP verification: {}", close_err);
    }
}

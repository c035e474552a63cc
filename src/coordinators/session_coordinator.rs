use std::sync::Arc;

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::errors::InternalError;
use crate::errors::internal::{CredentialError, SessionError};
use crate::providers::input_validation::normalize_email;
use crate::providers::{
    CryptoProvider, IdentityProvider, PasswordPolicyProvider, SessionRoleResolver, TokenProvider,
};
use crate::types::internal::SessionState;
use crate::types::internal::auth::Claims;
use crate::types::internal::context::RequestContext;

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub expires_in: i64,
    pub claims: Claims,
    pub session: SessionState,
}

/// Sign-in, session resolution and password change
pub struct SessionCoordinator {
    app_data: Arc<AppData>,
    identity_provider: Arc<IdentityProvider>,
    token_provider: Arc<TokenProvider>,
    session_role_resolver: Arc<SessionRoleResolver>,
    audit_logger: Arc<AuditLogger>,
}

impl SessionCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        let identity_provider = Arc::new(IdentityProvider::new(
            app_data.account_store.clone(),
            Arc::new(CryptoProvider::new(app_data.secret_manager.password_pepper())),
            Arc::new(PasswordPolicyProvider::new(
                app_data.settings.password_min_length(),
            )),
        ));
        let token_provider = Arc::new(TokenProvider::new(
            app_data.secret_manager.clone(),
            app_data.settings.jwt_expiration_minutes(),
            app_data.clock.clone(),
        ));
        let session_role_resolver = Arc::new(SessionRoleResolver::new(
            app_data.settings.auth_mode().clone(),
            app_data.profile_store.clone(),
            app_data.role_store.clone(),
        ));

        Self {
            audit_logger: app_data.audit_logger.clone(),
            app_data,
            identity_provider,
            token_provider,
            session_role_resolver,
        }
    }

    /// Useful for the API layer, which validates bearer tokens itself
    pub fn token_provider(&self) -> Arc<TokenProvider> {
        self.token_provider.clone()
    }

    /// Password sign-in
    ///
    /// Succeeds for any valid credentials; the returned session says whether
    /// the account has an application role yet.
    pub async fn login(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, InternalError> {
        let conn = &self.app_data.connections.main;

        // Step 1: Verify credentials
        let authenticated = match normalize_email(email) {
            Ok(email) => self.identity_provider.authenticate(conn, &email, password).await,
            Err(_) => Err(CredentialError::InvalidCredentials.into()),
        };
        let account = match authenticated {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                if let Err(audit_err) = self
                    .audit_logger
                    .log_login_failure(ctx, email.trim(), e.code())
                    .await
                {
                    tracing::error!("Failed to log login failure: {:?}", audit_err);
                }
                return Err(e);
            }
        };

        // Step 2: Issue the access token
        let (access_token, claims) = self.token_provider.generate_jwt(&account.id)?;

        // Step 3: Resolve what the session may do
        let session = self
            .session_role_resolver
            .resolve(conn, Some(&account.id))
            .await?;

        tracing::info!("User {} signed in", account.id);
        if let Err(audit_err) = self
            .audit_logger
            .log_login_success(ctx, &account.id, &claims.jti)
            .await
        {
            tracing::error!("Failed to log login success: {:?}", audit_err);
        }

        Ok(LoginOutcome {
            access_token,
            expires_in: self.token_provider.expires_in_seconds(),
            claims,
            session,
        })
    }

    /// Session for the context's bearer token, anonymous without one
    pub async fn session(&self, ctx: &RequestContext) -> Result<SessionState, InternalError> {
        self.session_role_resolver
            .resolve(&self.app_data.connections.main, ctx.session_user_id())
            .await
    }

    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), InternalError> {
        let user_id = ctx.session_user_id().ok_or(SessionError::Unauthenticated)?;

        self.identity_provider
            .change_password(
                &self.app_data.connections.main,
                user_id,
                current_password,
                new_password,
            )
            .await?;

        tracing::info!("Password changed for user {}", user_id);
        if let Err(audit_err) = self
            .audit_logger
            .log_password_changed(ctx, user_id, false)
            .await
        {
            tracing::error!("Failed to log password change: {:?}", audit_err);
        }
        Ok(())
    }
}

use std::str::FromStr;
use std::sync::Arc;

use sea_orm::DatabaseTransaction;

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::config::DatabaseConnections;
use crate::errors::InternalError;
use crate::errors::internal::{RegistrationError, ValidationError};
use crate::providers::input_validation::{
    normalize_email, normalize_institution_code, validate_full_name,
};
use crate::providers::{
    CryptoProvider, IdentityProvider, InstitutionDirectory, PasswordPolicyProvider,
};
use crate::stores::NewProfile;
use crate::types::db::{ApprovalStatus, account, organization};
use crate::types::internal::StoredRole;
use crate::types::internal::context::RequestContext;

/// Registration form as submitted
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub institution_code: String,
    pub department: Option<String>,
    /// Only used when a super admin creates the institution
    pub institution_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationOutcome {
    pub user_id: String,
    pub organization_id: String,
    pub institution_created: bool,
    pub approval_status: ApprovalStatus,
}

/// Orchestrates self-service registration
///
/// Account, institution and membership records are written in one
/// transaction: either the registrant ends up pending approval with every
/// record in place, or nothing is kept.
pub struct RegistrationCoordinator {
    app_data: Arc<AppData>,
    identity_provider: Arc<IdentityProvider>,
    institution_directory: Arc<InstitutionDirectory>,
    audit_logger: Arc<AuditLogger>,
}

impl RegistrationCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        let identity_provider = Arc::new(IdentityProvider::new(
            app_data.account_store.clone(),
            Arc::new(CryptoProvider::new(app_data.secret_manager.password_pepper())),
            Arc::new(PasswordPolicyProvider::new(
                app_data.settings.password_min_length(),
            )),
        ));
        let institution_directory = Arc::new(InstitutionDirectory::new(
            app_data.organization_store.clone(),
        ));

        Self {
            audit_logger: app_data.audit_logger.clone(),
            app_data,
            identity_provider,
            institution_directory,
        }
    }

    /// Public lookup so a registration form can confirm a code
    pub async fn lookup_institution(
        &self,
        institution_code: &str,
    ) -> Result<organization::Model, InternalError> {
        self.institution_directory
            .resolve(&self.app_data.connections.main, institution_code)
            .await
    }

    pub async fn register(
        &self,
        ctx: &RequestContext,
        request: RegistrationRequest,
    ) -> Result<RegistrationOutcome, InternalError> {
        // Step 1: Input shape and password policy, before touching storage
        let full_name = validate_full_name(&request.full_name)?;
        let email = normalize_email(&request.email)?;
        let role = StoredRole::from_str(request.role.trim())
            .map_err(|e| ValidationError::UnknownRole(e.0))?;
        let institution_code = normalize_institution_code(&request.institution_code)?;
        let department = request
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned);
        let password_hash = self.identity_provider.prepare_password(&request.password)?;

        let txn = self.app_data.connections.begin_transaction().await?;

        // Step 2: Credentialed account
        let account = match self
            .identity_provider
            .create_account(&txn, &email, &password_hash)
            .await
        {
            Ok(account) => account,
            Err(e) => return self.abort(ctx, txn, &email, "account", e).await,
        };

        // Step 3: Institution, created by super admins and resolved by everyone else
        let (organization, institution_created) = match self
            .institution_for(&txn, role, &institution_code, &request, &email)
            .await
        {
            Ok(found) => found,
            Err(e) => return self.abort(ctx, txn, &email, "institution", e).await,
        };

        // Step 4: Profile, role and approval request
        if let Err(e) = self
            .create_membership(&txn, &account, &full_name, department, &organization, role)
            .await
        {
            tracing::error!(
                "Registration for user {} failed after account creation: {}; rolling back",
                account.id,
                e
            );
            return self.abort(ctx, txn, &email, "profile_setup", e).await;
        }

        // Step 5: Commit
        DatabaseConnections::commit_transaction(txn).await?;

        tracing::info!(
            "User {} registered as {} with institution '{}', pending approval",
            account.id,
            role,
            organization.institution_code
        );

        if institution_created {
            if let Err(audit_err) = self
                .audit_logger
                .log_institution_created(ctx, &organization.id, &organization.institution_code)
                .await
            {
                tracing::error!("Failed to log institution creation: {:?}", audit_err);
            }
        }
        if let Err(audit_err) = self
            .audit_logger
            .log_registration_submitted(ctx, &account.id, role.as_str(), &organization.id)
            .await
        {
            tracing::error!("Failed to log registration: {:?}", audit_err);
        }

        Ok(RegistrationOutcome {
            user_id: account.id,
            organization_id: organization.id,
            institution_created,
            approval_status: ApprovalStatus::Pending,
        })
    }

    async fn institution_for(
        &self,
        txn: &DatabaseTransaction,
        role: StoredRole,
        institution_code: &str,
        request: &RegistrationRequest,
        email: &str,
    ) -> Result<(organization::Model, bool), InternalError> {
        if role.creates_institution() {
            let name = request.institution_name.as_deref().unwrap_or_default();
            let org = self
                .institution_directory
                .create(txn, institution_code, name, email)
                .await?;
            Ok((org, true))
        } else {
            let org = self.institution_directory.resolve(txn, institution_code).await?;
            Ok((org, false))
        }
    }

    async fn create_membership(
        &self,
        txn: &DatabaseTransaction,
        account: &account::Model,
        full_name: &str,
        department: Option<String>,
        organization: &organization::Model,
        role: StoredRole,
    ) -> Result<(), InternalError> {
        self.app_data
            .profile_store
            .create(
                txn,
                NewProfile {
                    user_id: account.id.clone(),
                    full_name: full_name.to_owned(),
                    email: account.email.clone(),
                    department,
                    organization_id: Some(organization.id.clone()),
                    approval_status: ApprovalStatus::Pending,
                    is_verified: false,
                },
            )
            .await
            .map_err(setup_failed("profile"))?;

        self.app_data
            .role_store
            .assign(txn, &account.id, role.as_str())
            .await
            .map_err(setup_failed("role assignment"))?;

        self.app_data
            .approval_store
            .create(txn, &account.id, role.as_str())
            .await
            .map_err(setup_failed("approval request"))?;

        Ok(())
    }

    /// Roll back, record the failure and hand the error back
    async fn abort<T>(
        &self,
        ctx: &RequestContext,
        txn: DatabaseTransaction,
        email: &str,
        stage: &str,
        err: InternalError,
    ) -> Result<T, InternalError> {
        if let Err(rollback_err) = txn.rollback().await {
            tracing::error!("Failed to roll back registration: {}", rollback_err);
        }

        let stage = match &err {
            InternalError::Registration(RegistrationError::ProfileSetupFailed { stage, .. }) => {
                *stage
            }
            _ => stage,
        };
        if let Err(audit_err) = self
            .audit_logger
            .log_registration_failed(ctx, email, stage, err.code())
            .await
        {
            tracing::error!("Failed to log registration failure: {:?}", audit_err);
        }

        Err(err)
    }
}

fn setup_failed(stage: &'static str) -> impl Fn(InternalError) -> InternalError {
    move |source| {
        RegistrationError::ProfileSetupFailed {
            stage,
            source: Box::new(source),
        }
        .into()
    }
}

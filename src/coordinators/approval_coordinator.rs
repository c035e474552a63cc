use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseTransaction};

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::config::DatabaseConnections;
use crate::errors::InternalError;
use crate::errors::internal::{ApprovalError, SessionError};
use crate::providers::{InstitutionDirectory, SessionRoleResolver};
use crate::stores::PendingApproval;
use crate::types::db::{ApprovalStatus, approval_request};
use crate::types::internal::context::RequestContext;
use crate::types::internal::{AppUser, StoredRole};

/// Result of a recorded decision
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalDecision {
    pub request_id: String,
    pub user_id: String,
    pub status: ApprovalStatus,
}

/// Approve and reject pending registrations
///
/// `pending` moves to `approved` or `rejected` exactly once. The request and
/// the registrant's profile change together in one transaction.
pub struct ApprovalCoordinator {
    app_data: Arc<AppData>,
    session_role_resolver: Arc<SessionRoleResolver>,
    institution_directory: Arc<InstitutionDirectory>,
    audit_logger: Arc<AuditLogger>,
}

impl ApprovalCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        let session_role_resolver = Arc::new(SessionRoleResolver::new(
            app_data.settings.auth_mode().clone(),
            app_data.profile_store.clone(),
            app_data.role_store.clone(),
        ));
        let institution_directory = Arc::new(InstitutionDirectory::new(
            app_data.organization_store.clone(),
        ));

        Self {
            audit_logger: app_data.audit_logger.clone(),
            app_data,
            session_role_resolver,
            institution_directory,
        }
    }

    pub async fn approve(
        &self,
        ctx: &RequestContext,
        request_id: &str,
        user_id: &str,
    ) -> Result<ApprovalDecision, InternalError> {
        self.decide(ctx, request_id, user_id, ApprovalStatus::Approved, None)
            .await
    }

    /// Reject with remarks; blank remarks are refused before any write
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        request_id: &str,
        user_id: &str,
        remarks: &str,
    ) -> Result<ApprovalDecision, InternalError> {
        let remarks = remarks.trim();
        if remarks.is_empty() {
            return Err(ApprovalError::RemarksRequired.into());
        }
        self.decide(ctx, request_id, user_id, ApprovalStatus::Rejected, Some(remarks))
            .await
    }

    /// Pending requests in the signed-in reviewer's institution
    pub async fn list_pending(
        &self,
        ctx: &RequestContext,
        roles: Option<&[StoredRole]>,
    ) -> Result<Vec<PendingApproval>, InternalError> {
        let conn = &self.app_data.connections.main;
        let reviewer = self.session_reviewer(conn, ctx).await?;
        let organization_id = reviewer
            .organization_id
            .ok_or(ApprovalError::OutsideOrganization)?;

        self.pending_in(conn, &organization_id, roles).await
    }

    /// Pending requests for an institution code, for operators
    pub async fn list_pending_for_institution(
        &self,
        ctx: &RequestContext,
        institution_code: &str,
        roles: Option<&[StoredRole]>,
    ) -> Result<Vec<PendingApproval>, InternalError> {
        if !ctx.is_cli() {
            return self.list_pending(ctx, roles).await;
        }
        let conn = &self.app_data.connections.main;
        let organization = self
            .institution_directory
            .resolve(conn, institution_code)
            .await?;

        self.pending_in(conn, &organization.id, roles).await
    }

    async fn pending_in(
        &self,
        conn: &impl ConnectionTrait,
        organization_id: &str,
        roles: Option<&[StoredRole]>,
    ) -> Result<Vec<PendingApproval>, InternalError> {
        let roles: Option<Vec<String>> =
            roles.map(|roles| roles.iter().map(|r| r.as_str().to_owned()).collect());

        self.app_data
            .approval_store
            .list_pending(conn, organization_id, roles.as_deref())
            .await
    }

    async fn decide(
        &self,
        ctx: &RequestContext,
        request_id: &str,
        user_id: &str,
        decision: ApprovalStatus,
        remarks: Option<&str>,
    ) -> Result<ApprovalDecision, InternalError> {
        let txn = self.app_data.connections.begin_transaction().await?;

        let request = match self.checked_request(&txn, ctx, request_id, user_id).await {
            Ok(request) => request,
            Err(e) => return rollback(txn, e).await,
        };

        // Step 3: Conditional on still being pending
        let approver_id = if ctx.is_cli() {
            None
        } else {
            ctx.session_user_id()
        };
        let updated = match self
            .app_data
            .approval_store
            .decide(&txn, &request.id, decision, approver_id, remarks)
            .await
        {
            Ok(updated) => updated,
            Err(e) => return rollback(txn, e).await,
        };
        if !updated {
            let status = match self.app_data.approval_store.find_by_id(&txn, &request.id).await {
                Ok(Some(current)) => current.status,
                Ok(None) => decision,
                Err(e) => return rollback(txn, e).await,
            };
            let err = ApprovalError::AlreadyDecided {
                request_id: request.id.clone(),
                status,
            };
            return rollback(txn, err.into()).await;
        }

        // Step 4: Mirror the decision on the profile
        if let Err(e) = self
            .app_data
            .profile_store
            .set_approval_status(&txn, user_id, decision)
            .await
        {
            return rollback(txn, e).await;
        }

        // Step 5: Commit
        DatabaseConnections::commit_transaction(txn).await?;

        tracing::info!(
            "Approval request {} for user {} {} by {}",
            request.id,
            user_id,
            decision.as_str(),
            ctx.actor_id
        );
        if let Err(audit_err) = self
            .audit_logger
            .log_approval_decided(ctx, &request.id, user_id, decision, remarks)
            .await
        {
            tracing::error!("Failed to log approval decision: {:?}", audit_err);
        }

        Ok(ApprovalDecision {
            request_id: request.id,
            user_id: user_id.to_owned(),
            status: decision,
        })
    }

    /// Steps 1-2: the request exists, belongs to `user_id`, is pending, and
    /// the caller may review it
    async fn checked_request(
        &self,
        txn: &DatabaseTransaction,
        ctx: &RequestContext,
        request_id: &str,
        user_id: &str,
    ) -> Result<approval_request::Model, InternalError> {
        let request = self
            .app_data
            .approval_store
            .find_by_id(txn, request_id)
            .await?
            .ok_or_else(|| ApprovalError::RequestNotFound {
                request_id: request_id.to_owned(),
            })?;

        if request.user_id != user_id {
            return Err(ApprovalError::UserMismatch {
                request_id: request_id.to_owned(),
                user_id: user_id.to_owned(),
            }
            .into());
        }

        if request.status != ApprovalStatus::Pending {
            return Err(ApprovalError::AlreadyDecided {
                request_id: request.id,
                status: request.status,
            }
            .into());
        }

        if !ctx.is_cli() {
            let reviewer = self.session_reviewer(txn, ctx).await?;
            let registrant = self
                .app_data
                .profile_store
                .find_by_user_id(txn, user_id)
                .await?;
            let same_organization = match (&reviewer.organization_id, registrant) {
                (Some(reviewer_org), Some(profile)) => {
                    profile.organization_id.as_deref() == Some(reviewer_org.as_str())
                }
                _ => false,
            };
            if !same_organization {
                tracing::warn!(
                    "Reviewer {} tried to decide request {} outside their institution",
                    reviewer.id,
                    request_id
                );
                return Err(ApprovalError::OutsideOrganization.into());
            }
        }

        Ok(request)
    }

    /// The signed-in user, if they may review approvals
    async fn session_reviewer(
        &self,
        conn: &impl ConnectionTrait,
        ctx: &RequestContext,
    ) -> Result<AppUser, InternalError> {
        let user_id = ctx.session_user_id().ok_or(SessionError::Unauthenticated)?;
        let state = self.session_role_resolver.resolve(conn, Some(user_id)).await?;

        match state.user {
            Some(user) if user.role.can_review_approvals() => Ok(user),
            _ => {
                tracing::warn!("User {} is not allowed to review approvals", user_id);
                Err(ApprovalError::NotAuthorized.into())
            }
        }
    }
}

async fn rollback<T>(txn: DatabaseTransaction, err: InternalError) -> Result<T, InternalError> {
    if let Err(rollback_err) = txn.rollback().await {
        tracing::error!("Failed to roll back approval decision: {}", rollback_err);
    }
    Err(err)
}

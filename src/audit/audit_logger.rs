use std::sync::Arc;

use crate::audit::AuditBuilder;
use crate::errors::InternalError;
use crate::stores::AuditStore;
use crate::types::db::{ApprovalStatus, VerificationType};
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;

/// Writes audit events for workflow actions
///
/// Actor comes from the request context; the affected account, when
/// different, is recorded as the target. Callers treat failures as
/// non-fatal and log them.
pub struct AuditLogger {
    pub audit_store: Arc<AuditStore>,
}

impl AuditLogger {
    pub fn new(audit_store: Arc<AuditStore>) -> Self {
        Self { audit_store }
    }

    /// Builder for events without a dedicated method
    pub fn builder(&self, event_type: impl Into<EventType>) -> AuditBuilder {
        AuditBuilder::new(self.audit_store.clone(), event_type)
    }

    pub async fn log_cli_session_start(
        &self,
        ctx: &RequestContext,
        command_name: &str,
        args: Vec<String>,
    ) -> Result<(), InternalError> {
        self.builder(EventType::CliSessionStart)
            .with_context(ctx)
            .add_field("command_name", command_name)
            .add_field("args", args)
            .write()
            .await
    }

    pub async fn log_cli_session_end(
        &self,
        ctx: &RequestContext,
        command_name: &str,
        success: bool,
        error_message: Option<String>,
    ) -> Result<(), InternalError> {
        let mut builder = self
            .builder(EventType::CliSessionEnd)
            .with_context(ctx)
            .add_field("command_name", command_name)
            .add_field("success", success);
        if let Some(error) = error_message {
            builder = builder.add_field("error_message", error);
        }
        builder.write().await
    }

    pub async fn log_registration_submitted(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        requested_role: &str,
        organization_id: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::RegistrationSubmitted)
            .with_context(ctx)
            .target(user_id)
            .add_field("requested_role", requested_role)
            .add_field("organization_id", organization_id)
            .write()
            .await
    }

    /// Registration aborted; `stage` names the step that failed
    pub async fn log_registration_failed(
        &self,
        ctx: &RequestContext,
        email: &str,
        stage: &str,
        reason: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::RegistrationFailed)
            .with_context(ctx)
            .add_sensitive("email", email)
            .add_field("stage", stage)
            .add_field("reason", reason)
            .write()
            .await
    }

    pub async fn log_institution_created(
        &self,
        ctx: &RequestContext,
        organization_id: &str,
        institution_code: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::InstitutionCreated)
            .with_context(ctx)
            .target(organization_id)
            .add_field("institution_code", institution_code)
            .write()
            .await
    }

    pub async fn log_otp_issued(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        email: &str,
        verification_type: VerificationType,
        expires_at_ms: i64,
    ) -> Result<(), InternalError> {
        self.builder(EventType::OtpIssued)
            .with_context(ctx)
            .target(user_id)
            .add_sensitive("email", email)
            .add_field("verification_type", verification_type.as_str())
            .add_field("expires_at_ms", expires_at_ms)
            .write()
            .await
    }

    pub async fn log_otp_verified(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        verification_type: VerificationType,
    ) -> Result<(), InternalError> {
        self.builder(EventType::OtpVerified)
            .with_context(ctx)
            .target(user_id)
            .add_field("verification_type", verification_type.as_str())
            .write()
            .await
    }

    pub async fn log_otp_verification_failed(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        verification_type: VerificationType,
        reason: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::OtpVerificationFailed)
            .with_context(ctx)
            .target(user_id)
            .add_field("verification_type", verification_type.as_str())
            .add_field("reason", reason)
            .write()
            .await
    }

    pub async fn log_password_changed(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        via_reset: bool,
    ) -> Result<(), InternalError> {
        let event_type = if via_reset {
            EventType::PasswordReset
        } else {
            EventType::PasswordChanged
        };
        self.builder(event_type)
            .with_context(ctx)
            .target(user_id)
            .write()
            .await
    }

    /// Approval decision with the resulting status and any remarks
    pub async fn log_approval_decided(
        &self,
        ctx: &RequestContext,
        approval_request_id: &str,
        user_id: &str,
        decision: ApprovalStatus,
        remarks: Option<&str>,
    ) -> Result<(), InternalError> {
        let event_type = match decision {
            ApprovalStatus::Rejected => EventType::ApprovalRejected,
            _ => EventType::ApprovalGranted,
        };
        let mut builder = self
            .builder(event_type)
            .with_context(ctx)
            .target(user_id)
            .add_field("approval_request_id", approval_request_id)
            .add_field("status", decision.as_str());
        if let Some(remarks) = remarks {
            builder = builder.add_field("remarks", remarks);
        }
        builder.write().await
    }

    pub async fn log_login_success(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        jwt_id: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::LoginSuccess)
            .with_context(ctx)
            .actor(user_id)
            .target(user_id)
            .add_field("jwt_id", jwt_id)
            .write()
            .await
    }

    /// Email is hashed; failed logins often carry someone else's address
    pub async fn log_login_failure(
        &self,
        ctx: &RequestContext,
        email: &str,
        reason: &str,
    ) -> Result<(), InternalError> {
        self.builder(EventType::LoginFailure)
            .with_context(ctx)
            .add_sensitive("email", email)
            .add_field("reason", reason)
            .write()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::EntityTrait;

    use crate::test::utils::setup_audit_store;
    use crate::types::db::audit_event;

    #[tokio::test]
    async fn test_rejection_is_logged_with_remarks() {
        let (db, store) = setup_audit_store().await;
        let logger = AuditLogger::new(store);
        let ctx = RequestContext::new().with_actor_id("admin-1");

        logger
            .log_approval_decided(&ctx, "req-1", "user-1", ApprovalStatus::Rejected, Some("Incomplete documents"))
            .await
            .unwrap();

        let events = audit_event::Entity::find().all(&db).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "approval_rejected");
        assert_eq!(events[0].actor_id, "admin-1");
        assert_eq!(events[0].target_id.as_deref(), Some("user-1"));
        assert!(events[0].data.contains("Incomplete documents"));
    }

    #[tokio::test]
    async fn test_login_failure_does_not_store_plain_email() {
        let (db, store) = setup_audit_store().await;
        let logger = AuditLogger::new(store);

        logger
            .log_login_failure(&RequestContext::new(), "someone@bru.edu", "invalid_credentials")
            .await
            .unwrap();

        let events = audit_event::Entity::find().all(&db).await.unwrap();
        assert_eq!(events[0].event_type, "login_failure");
        assert!(!events[0].data.contains("someone@bru.edu"));
        assert!(events[0].data.contains("sha256:"));
    }
}

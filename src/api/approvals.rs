use std::sync::Arc;

use poem::Request;
use poem_openapi::{
    OpenApi, Tags,
    param::{Path, Query},
    payload::Json,
};

use crate::api::auth::BearerAuth;
use crate::api::helpers;
use crate::coordinators::{ApprovalCoordinator, SessionCoordinator};
use crate::errors::{AdminError, InternalError};
use crate::providers::input_validation::parse_role_filter;
use crate::types::dto::approvals::{
    ApproveRequest, DecisionResponse, PendingApprovalsResponse, RejectRequest,
};
use crate::types::internal::context::RequestContext;

/// Approval review endpoints for institution admins
pub struct ApprovalsApi {
    approval_coordinator: Arc<ApprovalCoordinator>,
    session_coordinator: Arc<SessionCoordinator>,
}

impl ApprovalsApi {
    pub fn new(
        approval_coordinator: Arc<ApprovalCoordinator>,
        session_coordinator: Arc<SessionCoordinator>,
    ) -> Self {
        Self {
            approval_coordinator,
            session_coordinator,
        }
    }

    fn context(&self, req: &Request, auth: BearerAuth) -> Result<RequestContext, InternalError> {
        helpers::create_request_context(
            req,
            Some(auth.0),
            &self.session_coordinator.token_provider(),
        )
    }
}

/// API tags for approval endpoints
#[derive(Tags)]
enum ApprovalTags {
    /// Registration approvals
    Approvals,
}

#[OpenApi(prefix_path = "/approvals")]
impl ApprovalsApi {
    /// Pending registrations in the caller's institution
    ///
    /// `role` optionally narrows the list to one or more requested roles.
    #[oai(path = "/pending", method = "get", tag = "ApprovalTags::Approvals")]
    async fn pending(
        &self,
        req: &Request,
        auth: BearerAuth,
        role: Query<Option<String>>,
    ) -> Result<Json<PendingApprovalsResponse>, AdminError> {
        let ctx = self.context(req, auth)?;
        let roles = parse_role_filter(role.0.as_deref()).map_err(InternalError::from)?;

        let pending = self
            .approval_coordinator
            .list_pending(&ctx, roles.as_deref())
            .await?;

        Ok(Json(PendingApprovalsResponse {
            requests: pending.into_iter().map(Into::into).collect(),
        }))
    }

    /// Approve a pending registration
    #[oai(path = "/:id/approve", method = "post", tag = "ApprovalTags::Approvals")]
    async fn approve(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<ApproveRequest>,
    ) -> Result<Json<DecisionResponse>, AdminError> {
        let ctx = self.context(req, auth)?;
        let decision = self
            .approval_coordinator
            .approve(&ctx, &id.0, &body.user_id)
            .await?;

        Ok(Json(decision.into()))
    }

    /// Reject a pending registration; remarks are required
    #[oai(path = "/:id/reject", method = "post", tag = "ApprovalTags::Approvals")]
    async fn reject(
        &self,
        req: &Request,
        auth: BearerAuth,
        id: Path<String>,
        body: Json<RejectRequest>,
    ) -> Result<Json<DecisionResponse>, AdminError> {
        let ctx = self.context(req, auth)?;
        let decision = self
            .approval_coordinator
            .reject(&ctx, &id.0, &body.user_id, &body.remarks)
            .await?;

        Ok(Json(decision.into()))
    }
}


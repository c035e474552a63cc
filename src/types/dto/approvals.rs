use poem_openapi::Object;

use crate::coordinators::ApprovalDecision;
use crate::stores::PendingApproval;

/// A registration waiting for review
#[derive(Object, Debug, Clone, PartialEq)]
pub struct PendingApprovalItem {
    pub request_id: String,
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub requested_role: String,
    pub department: Option<String>,

    /// Epoch milliseconds
    pub created_at: i64,
}

impl From<PendingApproval> for PendingApprovalItem {
    fn from(pending: PendingApproval) -> Self {
        Self {
            request_id: pending.request.id,
            user_id: pending.request.user_id,
            full_name: pending.full_name,
            email: pending.email,
            requested_role: pending.request.requested_role,
            department: pending.department,
            created_at: pending.request.created_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct PendingApprovalsResponse {
    pub requests: Vec<PendingApprovalItem>,
}

#[derive(Object, Debug)]
pub struct ApproveRequest {
    /// Registrant the request belongs to
    pub user_id: String,
}

#[derive(Object, Debug)]
pub struct RejectRequest {
    pub user_id: String,

    /// Reason shown to the registrant; must not be blank
    pub remarks: String,
}

#[derive(Object, Debug)]
pub struct DecisionResponse {
    pub success: bool,
    pub request_id: String,
    pub user_id: String,
    pub status: String,
}

impl From<ApprovalDecision> for DecisionResponse {
    fn from(decision: ApprovalDecision) -> Self {
        Self {
            success: true,
            request_id: decision.request_id,
            user_id: decision.user_id,
            status: decision.status.as_str().to_owned(),
        }
    }
}

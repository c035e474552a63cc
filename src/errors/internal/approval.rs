use thiserror::Error;

use crate::types::db::ApprovalStatus;

#[derive(Error, Debug)]
pub enum ApprovalError {
    #[error("Approval request not found: {request_id}")]
    RequestNotFound { request_id: String },

    #[error("Approval request {request_id} does not belong to user {user_id}")]
    UserMismatch { request_id: String, user_id: String },

    #[error("Please provide remarks for rejection")]
    RemarksRequired,

    #[error("Approval request {request_id} was already {}", .status.as_str())]
    AlreadyDecided {
        request_id: String,
        status: ApprovalStatus,
    },

    #[error("Only admins can review approval requests")]
    NotAuthorized,

    #[error("Approval request belongs to another institution")]
    OutsideOrganization,
}

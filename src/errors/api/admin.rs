use poem_openapi::{ApiResponse, payload::Json};

use super::{ErrorResponse, describe};
use crate::errors::{ErrorKind, InternalError};

/// Errors for approval review endpoints
#[derive(ApiResponse, Debug)]
pub enum AdminError {
    /// Bad input, including a rejection without remarks
    #[oai(status = 400)]
    ValidationFailed(Json<ErrorResponse>),

    /// Missing or invalid JWT
    #[oai(status = 401)]
    Unauthorized(Json<ErrorResponse>),

    /// Caller is not an approved admin of the registrant's institution
    #[oai(status = 403)]
    Forbidden(Json<ErrorResponse>),

    /// Approval request not found
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// Request already approved or rejected
    #[oai(status = 409)]
    AlreadyDecided(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

impl AdminError {
    /// Convert InternalError to AdminError
    pub fn from_internal_error(err: InternalError) -> Self {
        match err.kind() {
            ErrorKind::Validation
            | ErrorKind::Mismatch
            | ErrorKind::RemarksRequired
            | ErrorKind::Expired
            | ErrorKind::RateLimited => AdminError::ValidationFailed(Json(describe(&err, 400))),
            ErrorKind::Unauthorized => AdminError::Unauthorized(Json(describe(&err, 401))),
            ErrorKind::Forbidden => AdminError::Forbidden(Json(describe(&err, 403))),
            ErrorKind::NotFound => AdminError::NotFound(Json(describe(&err, 404))),
            ErrorKind::Conflict => AdminError::AlreadyDecided(Json(describe(&err, 409))),
            ErrorKind::Upstream | ErrorKind::PartialFailure | ErrorKind::Internal => {
                AdminError::InternalError(Json(describe(&err, 500)))
            }
        }
    }

    pub fn body(&self) -> &ErrorResponse {
        match self {
            AdminError::ValidationFailed(Json(body))
            | AdminError::Unauthorized(Json(body))
            | AdminError::Forbidden(Json(body))
            | AdminError::NotFound(Json(body))
            | AdminError::AlreadyDecided(Json(body))
            | AdminError::InternalError(Json(body)) => body,
        }
    }
}

impl From<InternalError> for AdminError {
    fn from(err: InternalError) -> Self {
        AdminError::from_internal_error(err)
    }
}

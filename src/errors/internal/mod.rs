use thiserror::Error;

pub mod approval;
pub mod audit;
pub mod credential;
pub mod database;
pub mod email;
pub mod institution;
pub mod otp;
pub mod registration;
pub mod session;
pub mod validation;

pub use approval::ApprovalError;
pub use audit::AuditError;
pub use credential::CredentialError;
pub use database::{DatabaseError, is_unique_violation};
pub use email::EmailError;
pub use institution::InstitutionError;
pub use otp::OtpError;
pub use registration::RegistrationError;
pub use session::SessionError;
pub use validation::{PasswordPolicyError, ValidationError};

use super::kind::ErrorKind;

/// Internal error type for store, provider and coordinator operations
///
/// Infrastructure errors are shared; domain errors are grouped per workflow.
/// Not exposed via API - endpoints must convert to AuthError or AdminError.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse { value_type: String, message: String },

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto { operation: String, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Institution(#[from] InstitutionError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn transaction_begin(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionBegin { source })
    }

    pub fn transaction_commit(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionCommit { source })
    }

    pub fn parse(value_type: &str, message: impl Into<String>) -> InternalError {
        InternalError::Parse {
            value_type: value_type.to_string(),
            message: message.into(),
        }
    }

    pub fn crypto(operation: &str, message: impl Into<String>) -> InternalError {
        InternalError::Crypto {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Database(_) | Self::Parse { .. } | Self::Crypto { .. } | Self::Audit(_) => {
                ErrorKind::Internal
            }
            Self::Validation(_) => ErrorKind::Validation,
            Self::Institution(InstitutionError::NotFound { .. }) => ErrorKind::NotFound,
            Self::Institution(InstitutionError::CodeTaken { .. }) => ErrorKind::Conflict,
            Self::Registration(RegistrationError::EmailAlreadyRegistered { .. }) => {
                ErrorKind::Conflict
            }
            Self::Registration(RegistrationError::ProfileSetupFailed { .. }) => {
                ErrorKind::PartialFailure
            }
            Self::Otp(err) => match err {
                OtpError::NoPendingVerification | OtpError::AccountNotFound { .. } => {
                    ErrorKind::NotFound
                }
                OtpError::Expired => ErrorKind::Expired,
                OtpError::Mismatch => ErrorKind::Mismatch,
                OtpError::ResendTooSoon { .. } | OtpError::TooManyAttempts => {
                    ErrorKind::RateLimited
                }
            },
            Self::Approval(err) => match err {
                ApprovalError::RequestNotFound { .. } | ApprovalError::UserMismatch { .. } => {
                    ErrorKind::NotFound
                }
                ApprovalError::RemarksRequired => ErrorKind::RemarksRequired,
                ApprovalError::AlreadyDecided { .. } => ErrorKind::Conflict,
                ApprovalError::NotAuthorized | ApprovalError::OutsideOrganization => {
                    ErrorKind::Forbidden
                }
            },
            Self::Credential(CredentialError::AccountNotFound { .. }) => ErrorKind::NotFound,
            Self::Credential(_) => ErrorKind::Unauthorized,
            Self::Session(SessionError::Unauthenticated) => ErrorKind::Unauthorized,
            Self::Session(SessionError::NoApplicationRole { .. }) => ErrorKind::Forbidden,
            Self::Email(_) => ErrorKind::Upstream,
        }
    }

    /// Stable snake_case identifier reported to API clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) | Self::Parse { .. } | Self::Crypto { .. } | Self::Audit(_) => {
                "internal_error"
            }
            Self::Validation(err) => match err {
                ValidationError::EmailInvalid => "email_invalid",
                ValidationError::FullName(_) => "invalid_full_name",
                ValidationError::WeakPassword(_) => "weak_password",
                ValidationError::InstitutionCode(_) => "invalid_institution_code_format",
                ValidationError::OtpFormat => "invalid_otp_format",
                ValidationError::UnknownRole(_) => "unknown_role",
            },
            Self::Institution(InstitutionError::NotFound { .. }) => "invalid_institution_code",
            Self::Institution(InstitutionError::CodeTaken { .. }) => "institution_code_taken",
            Self::Registration(RegistrationError::EmailAlreadyRegistered { .. }) => {
                "email_already_registered"
            }
            Self::Registration(RegistrationError::ProfileSetupFailed { .. }) => {
                "registration_incomplete"
            }
            Self::Otp(err) => match err {
                OtpError::NoPendingVerification => "no_pending_verification",
                OtpError::Expired => "otp_expired",
                OtpError::Mismatch => "otp_mismatch",
                OtpError::TooManyAttempts => "otp_attempts_exceeded",
                OtpError::ResendTooSoon { .. } => "otp_resend_too_soon",
                OtpError::AccountNotFound { .. } => "account_not_found",
            },
            Self::Approval(err) => match err {
                ApprovalError::RequestNotFound { .. } => "approval_request_not_found",
                ApprovalError::UserMismatch { .. } => "approval_request_not_found",
                ApprovalError::RemarksRequired => "remarks_required",
                ApprovalError::AlreadyDecided { .. } => "approval_already_decided",
                ApprovalError::NotAuthorized => "not_authorized",
                ApprovalError::OutsideOrganization => "not_authorized",
            },
            Self::Credential(err) => match err {
                CredentialError::InvalidCredentials => "invalid_credentials",
                CredentialError::IncorrectPassword => "incorrect_password",
                CredentialError::AccountNotFound { .. } => "account_not_found",
                CredentialError::InvalidToken { .. } => "invalid_token",
                CredentialError::ExpiredToken => "expired_token",
            },
            Self::Session(SessionError::Unauthenticated) => "unauthenticated",
            Self::Session(SessionError::NoApplicationRole { .. }) => "no_application_role",
            Self::Email(_) => "email_delivery_failed",
        }
    }
}

// Database entities - SeaORM models
pub mod account;
pub mod approval_request;
pub mod audit_event;
pub mod organization;
pub mod otp_verification;
pub mod profile;
pub mod user_role;

pub use approval_request::ApprovalStatus;
pub use otp_verification::VerificationType;

// Request and response bodies for the HTTP API
pub mod approvals;
pub mod auth;
pub mod common;
pub mod institutions;
pub mod otp;

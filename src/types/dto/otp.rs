use poem_openapi::{Enum, Object};

use crate::types::db::VerificationType;

/// Purpose of a one-time code
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
#[oai(rename_all = "snake_case")]
pub enum OtpType {
    Registration,
    PasswordReset,
}

impl From<OtpType> for VerificationType {
    fn from(value: OtpType) -> Self {
        match value {
            OtpType::Registration => VerificationType::Registration,
            OtpType::PasswordReset => VerificationType::PasswordReset,
        }
    }
}

#[derive(Object, Debug)]
pub struct SendOtpRequest {
    pub email: String,

    #[oai(rename = "type")]
    pub otp_type: OtpType,

    /// Account the code is for; looked up by email when omitted
    pub user_id: Option<String>,
}

#[derive(Object, Debug)]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: String,

    /// When the code stops being accepted (epoch milliseconds)
    pub expires_at: i64,
}

#[derive(Object, Debug)]
pub struct VerifyOtpRequest {
    pub user_id: String,
    pub otp: String,

    #[oai(rename = "type")]
    pub otp_type: OtpType,
}

#[derive(Object, Debug)]
pub struct ResetPasswordRequest {
    /// Address the reset code was sent to
    pub email: String,

    /// Must belong to `email` when supplied
    pub user_id: Option<String>,

    pub otp: String,
    pub new_password: String,
}

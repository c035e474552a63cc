use thiserror::Error;

#[derive(Error, Debug)]
pub enum OtpError {
    #[error("No pending verification found")]
    NoPendingVerification,

    #[error("OTP has expired. Please request a new one.")]
    Expired,

    #[error("Invalid OTP")]
    Mismatch,

    #[error("Too many incorrect attempts. Please request a new code.")]
    TooManyAttempts,

    #[error("Please wait {retry_after_seconds} seconds before requesting a new code")]
    ResendTooSoon { retry_after_seconds: i64 },

    #[error("No account exists with this email address")]
    AccountNotFound { email: String },
}

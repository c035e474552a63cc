use thiserror::Error;

/// Password strength failures, each with a human-readable reason
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {0} characters")]
    TooShort(usize),

    #[error("Password must be at most {0} characters")]
    TooLong(usize),

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one number")]
    MissingDigit,

    #[error("Password must contain at least one special character")]
    MissingSpecial,
}

/// Input rejected before any storage or network access
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid email address")]
    EmailInvalid,

    #[error("{0}")]
    FullName(String),

    #[error(transparent)]
    WeakPassword(#[from] PasswordPolicyError),

    #[error("Institution code {0}")]
    InstitutionCode(String),

    #[error("OTP must be exactly 6 digits")]
    OtpFormat,

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

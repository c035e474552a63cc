use std::collections::HashMap;
use std::fmt;

/// Event types for audit logging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    RegistrationSubmitted,
    RegistrationFailed,
    InstitutionCreated,
    OtpIssued,
    OtpVerified,
    OtpVerificationFailed,
    PasswordReset,
    PasswordChanged,
    ApprovalGranted,
    ApprovalRejected,
    LoginSuccess,
    LoginFailure,
    CliSessionStart,
    CliSessionEnd,
    Custom(String),
}

impl EventType {
    /// Convert EventType to string representation for database storage
    pub fn as_str(&self) -> &str {
        match self {
            Self::RegistrationSubmitted => "registration_submitted",
            Self::RegistrationFailed => "registration_failed",
            Self::InstitutionCreated => "institution_created",
            Self::OtpIssued => "otp_issued",
            Self::OtpVerified => "otp_verified",
            Self::OtpVerificationFailed => "otp_verification_failed",
            Self::PasswordReset => "password_reset",
            Self::PasswordChanged => "password_changed",
            Self::ApprovalGranted => "approval_granted",
            Self::ApprovalRejected => "approval_rejected",
            Self::LoginSuccess => "login_success",
            Self::LoginFailure => "login_failure",
            Self::CliSessionStart => "cli_session_start",
            Self::CliSessionEnd => "cli_session_end",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        EventType::Custom(s.to_owned())
    }
}

/// Audit event structure for building and storing audit logs
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub event_type: EventType,
    /// Who performed the action
    pub actor_id: String,
    /// Whom the action was performed on, when different from the actor
    pub target_id: Option<String>,
    pub ip_address: Option<String>,
    pub request_id: String,
    pub data: HashMap<String, serde_json::Value>,
}

impl AuditEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            actor_id: "unknown".to_owned(),
            target_id: None,
            ip_address: None,
            request_id: "none".to_owned(),
            data: HashMap::new(),
        }
    }
}

/// Coarse classification of every failure the service can report
///
/// API layers pick an HTTP status from this; logging picks a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape or strength, rejected before touching storage
    Validation,
    NotFound,
    Conflict,
    Expired,
    Mismatch,
    RemarksRequired,
    Unauthorized,
    Forbidden,
    RateLimited,
    /// Email delivery or another outbound dependency failed
    Upstream,
    /// A multi-step write failed after earlier steps succeeded
    PartialFailure,
    Internal,
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation | Self::Mismatch | Self::RemarksRequired => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Expired => 410,
            Self::RateLimited => 429,
            Self::Upstream => 502,
            Self::PartialFailure | Self::Internal => 500,
        }
    }

    /// Whether the error detail must stay out of client responses
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Internal | Self::PartialFailure | Self::Upstream)
    }
}

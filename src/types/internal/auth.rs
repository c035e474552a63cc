use serde::{Deserialize, Serialize};

/// JWT Claims structure
///
/// Carries identity only. The application role is never embedded in the
/// token; it is resolved from storage on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID for audit correlation
    pub jti: String,
}

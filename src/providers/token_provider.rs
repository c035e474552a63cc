use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use mockable::Clock;
use uuid::Uuid;

use crate::config::SecretManager;
use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::types::internal::auth::Claims;

/// Issues and validates HS256 access tokens
///
/// Tokens carry identity only. Expiry is checked against the injected clock
/// rather than by the JWT library, so it follows the same time source as the
/// rest of the service.
pub struct TokenProvider {
    secret_manager: Arc<SecretManager>,
    jwt_expiration_minutes: i64,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl TokenProvider {
    pub fn new(
        secret_manager: Arc<SecretManager>,
        jwt_expiration_minutes: i64,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            secret_manager,
            jwt_expiration_minutes,
            clock,
        }
    }

    /// Encoded token plus the claims it carries
    pub fn generate_jwt(&self, user_id: &str) -> Result<(String, Claims), InternalError> {
        let now = self.clock.utc().timestamp();
        let claims = Claims {
            sub: user_id.to_owned(),
            exp: now + self.jwt_expiration_minutes * 60,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
        )
        .map_err(|e| InternalError::crypto("jwt_generation", e.to_string()))?;

        Ok((token, claims))
    }

    pub fn validate_jwt(&self, token: &str) -> Result<Claims, InternalError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            JwtErrorKind::InvalidSignature => CredentialError::invalid_token("invalid signature"),
            _ => CredentialError::invalid_token("malformed"),
        })?
        .claims;

        if self.clock.utc().timestamp() >= claims.exp {
            return Err(CredentialError::ExpiredToken.into());
        }

        Ok(claims)
    }

    pub fn expires_in_seconds(&self) -> i64 {
        self.jwt_expiration_minutes * 60
    }
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("secret_manager", &"<redacted>")
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .finish()
    }
}

use std::fmt;
use std::sync::Arc;

use crate::config::EnvironmentProvider;
use crate::config::config_spec::ConfigSpec;
use crate::config::errors::ApplicationError;
use crate::types::internal::AuthMode;

/// Workflow settings: OTP timing, password policy, token lifetime, email
#[derive(Clone)]
pub struct ApplicationSettings {
    auth_mode: AuthMode,
    otp_ttl_minutes: i64,
    otp_resend_cooldown_seconds: i64,
    password_min_length: usize,
    jwt_expiration_minutes: i64,
    email_from: String,
    email_api_url: String,
}

impl ApplicationSettings {
    pub fn from_env_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, ApplicationError> {
        let auth_mode = ConfigSpec::new(env_provider.clone())
            .env_override("AUTH_MODE")
            .default_value("live")
            .validator(|value| match value {
                "live" | "fixture" => Ok(()),
                other => Err(format!("Expected 'live' or 'fixture', got '{}'", other)),
            })
            .load()?;
        let auth_mode = match auth_mode.as_str() {
            "fixture" => AuthMode::development_fixture(),
            _ => AuthMode::Live,
        };

        let otp_ttl_minutes = ConfigSpec::new(env_provider.clone())
            .env_override("OTP_TTL_MINUTES")
            .default_value("10")
            .validator(|value| ConfigSpec::validate_integer_range(value, 1, 60))
            .load()?;

        let otp_resend_cooldown_seconds = ConfigSpec::new(env_provider.clone())
            .env_override("OTP_RESEND_COOLDOWN_SECONDS")
            .default_value("60")
            .validator(|value| ConfigSpec::validate_integer_range(value, 0, 3600))
            .load()?;

        let password_min_length = ConfigSpec::new(env_provider.clone())
            .env_override("PASSWORD_MIN_LENGTH")
            .default_value("12")
            .validator(|value| ConfigSpec::validate_integer_range(value, 8, 128))
            .load()?;

        let jwt_expiration_minutes = ConfigSpec::new(env_provider.clone())
            .env_override("JWT_EXPIRATION_MINUTES")
            .default_value("15")
            .validator(|value| ConfigSpec::validate_integer_range(value, 1, 1440))
            .load()?;

        let email_from = ConfigSpec::new(env_provider.clone())
            .env_override("EMAIL_FROM")
            .default_value("Acadify <onboarding@resend.dev>")
            .min_length(3)
            .load()?;

        let email_api_url = ConfigSpec::new(env_provider)
            .env_override("EMAIL_API_URL")
            .default_value("https://api.resend.com/emails")
            .min_length(8)
            .load()?;

        Ok(Self {
            auth_mode,
            otp_ttl_minutes: ConfigSpec::parse_integer(&otp_ttl_minutes, "OTP_TTL_MINUTES")?,
            otp_resend_cooldown_seconds: ConfigSpec::parse_integer(
                &otp_resend_cooldown_seconds,
                "OTP_RESEND_COOLDOWN_SECONDS",
            )?,
            password_min_length: ConfigSpec::parse_integer(
                &password_min_length,
                "PASSWORD_MIN_LENGTH",
            )? as usize,
            jwt_expiration_minutes: ConfigSpec::parse_integer(
                &jwt_expiration_minutes,
                "JWT_EXPIRATION_MINUTES",
            )?,
            email_from,
            email_api_url,
        })
    }

    pub fn from_env() -> Result<Self, ApplicationError> {
        use crate::config::SystemEnvironment;
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    pub fn auth_mode(&self) -> &AuthMode {
        &self.auth_mode
    }

    pub fn otp_ttl_minutes(&self) -> i64 {
        self.otp_ttl_minutes
    }

    pub fn otp_resend_cooldown_seconds(&self) -> i64 {
        self.otp_resend_cooldown_seconds
    }

    pub fn password_min_length(&self) -> usize {
        self.password_min_length
    }

    pub fn jwt_expiration_minutes(&self) -> i64 {
        self.jwt_expiration_minutes
    }

    pub fn email_from(&self) -> &str {
        &self.email_from
    }

    pub fn email_api_url(&self) -> &str {
        &self.email_api_url
    }

    pub fn with_auth_mode(mut self, auth_mode: AuthMode) -> Self {
        self.auth_mode = auth_mode;
        self
    }

    pub fn with_otp_resend_cooldown_seconds(mut self, seconds: i64) -> Self {
        self.otp_resend_cooldown_seconds = seconds;
        self
    }
}

impl fmt::Debug for ApplicationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationSettings")
            .field("auth_mode_live", &self.auth_mode.is_live())
            .field("otp_ttl_minutes", &self.otp_ttl_minutes)
            .field("otp_resend_cooldown_seconds", &self.otp_resend_cooldown_seconds)
            .field("password_min_length", &self.password_min_length)
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .field("email_from", &self.email_from)
            .finish()
    }
}

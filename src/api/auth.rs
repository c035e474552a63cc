use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, SecurityScheme, Tags, auth::Bearer, payload::Json};

use crate::api::helpers;
use crate::coordinators::{RegistrationCoordinator, SessionCoordinator};
use crate::errors::AuthError;
use crate::types::dto::auth::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, RegisterResponse, SessionResponse,
    TokenResponse,
};
use crate::types::dto::common::MessageResponse;
use crate::types::internal::context::RequestContext;

/// Registration, sign-in and session endpoints
pub struct AuthApi {
    registration_coordinator: Arc<RegistrationCoordinator>,
    session_coordinator: Arc<SessionCoordinator>,
}

impl AuthApi {
    pub fn new(
        registration_coordinator: Arc<RegistrationCoordinator>,
        session_coordinator: Arc<SessionCoordinator>,
    ) -> Self {
        Self {
            registration_coordinator,
            session_coordinator,
        }
    }
}

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "JWT"
)]
pub struct BearerAuth(pub Bearer);

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Register a new account
    ///
    /// A super_admin creates the institution named by `institution_code`;
    /// every other role joins an existing one. The account starts pending
    /// approval and unverified.
    #[oai(path = "/register", method = "post", tag = "AuthTags::Authentication")]
    async fn register(
        &self,
        req: &Request,
        body: Json<RegisterRequest>,
    ) -> Result<Json<RegisterResponse>, AuthError> {
        let ctx = RequestContext::from_request(req);
        let outcome = self
            .registration_coordinator
            .register(&ctx, body.0.into())
            .await?;

        Ok(Json(RegisterResponse {
            success: true,
            user_id: outcome.user_id,
            approval_status: outcome.approval_status.as_str().to_string(),
        }))
    }

    /// Authenticate with email and password
    ///
    /// Returns an access token and the session it resolves to. Access tokens
    /// expire after 15 minutes by default.
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(
        &self,
        req: &Request,
        body: Json<LoginRequest>,
    ) -> Result<Json<TokenResponse>, AuthError> {
        let ctx = RequestContext::from_request(req);
        let outcome = self
            .session_coordinator
            .login(&ctx, &body.email, &body.password)
            .await?;

        Ok(Json(TokenResponse {
            access_token: outcome.access_token,
            token_type: "Bearer".to_string(),
            expires_in: outcome.expires_in,
            session: outcome.session.into(),
        }))
    }

    /// Resolve the current session
    ///
    /// Without a token both fields are null. `user` is only present for an
    /// approved account with a valid role.
    #[oai(path = "/session", method = "get", tag = "AuthTags::Authentication")]
    async fn session(&self, req: &Request) -> Result<Json<SessionResponse>, AuthError> {
        let ctx = helpers::create_request_context(
            req,
            helpers::optional_bearer(req),
            &self.session_coordinator.token_provider(),
        )?;
        let state = self.session_coordinator.session(&ctx).await?;

        Ok(Json(state.into()))
    }

    /// Change the signed-in account's password
    #[oai(path = "/change-password", method = "post", tag = "AuthTags::Authentication")]
    async fn change_password(
        &self,
        req: &Request,
        auth: BearerAuth,
        body: Json<ChangePasswordRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        let ctx = helpers::create_request_context(
            req,
            Some(auth.0),
            &self.session_coordinator.token_provider(),
        )?;
        self.session_coordinator
            .change_password(&ctx, &body.current_password, &body.new_password)
            .await?;

        Ok(Json(MessageResponse::ok("Password changed successfully")))
    }
}

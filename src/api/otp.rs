use std::sync::Arc;

use poem::Request;
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::coordinators::OtpCoordinator;
use crate::errors::AuthError;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::otp::{
    ResetPasswordRequest, SendOtpRequest, SendOtpResponse, VerifyOtpRequest,
};
use crate::types::internal::context::RequestContext;

/// One-time code endpoints for email verification and password reset
pub struct OtpApi {
    otp_coordinator: Arc<OtpCoordinator>,
}

impl OtpApi {
    pub fn new(otp_coordinator: Arc<OtpCoordinator>) -> Self {
        Self { otp_coordinator }
    }
}

#[derive(Tags)]
enum OtpTags {
    /// One-time codes
    Otp,
}

#[OpenApi(prefix_path = "/otp")]
impl OtpApi {
    /// Email a fresh 6-digit code
    ///
    /// Any earlier unverified code of the same type stops working.
    #[oai(path = "/send-otp", method = "post", tag = "OtpTags::Otp")]
    async fn send_otp(
        &self,
        req: &Request,
        body: Json<SendOtpRequest>,
    ) -> Result<Json<SendOtpResponse>, AuthError> {
        let ctx = RequestContext::from_request(req);
        let expires_at = self
            .otp_coordinator
            .send_otp(
                &ctx,
                &body.email,
                body.otp_type.into(),
                body.user_id.as_deref(),
            )
            .await?;

        Ok(Json(SendOtpResponse {
            success: true,
            message: "OTP sent successfully".to_string(),
            expires_at,
        }))
    }

    /// Check a code; registration codes also mark the profile verified
    #[oai(path = "/verify-otp", method = "post", tag = "OtpTags::Otp")]
    async fn verify_otp(
        &self,
        req: &Request,
        body: Json<VerifyOtpRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        let ctx = RequestContext::from_request(req);
        self.otp_coordinator
            .verify_otp(&ctx, &body.user_id, &body.otp, body.otp_type.into())
            .await?;

        Ok(Json(MessageResponse::ok("OTP verified successfully")))
    }

    /// Replace a forgotten password using a password_reset code
    #[oai(path = "/reset-password", method = "post", tag = "OtpTags::Otp")]
    async fn reset_password(
        &self,
        req: &Request,
        body: Json<ResetPasswordRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        let ctx = RequestContext::from_request(req);
        self.otp_coordinator
            .reset_password(
                &ctx,
                &body.email,
                body.user_id.as_deref(),
                &body.otp,
                &body.new_password,
            )
            .await?;

        Ok(Json(MessageResponse::ok("Password reset successfully")))
    }
}

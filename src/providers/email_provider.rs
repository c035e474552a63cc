use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::errors::internal::EmailError;
use crate::types::db::VerificationType;

/// One outbound transactional email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Seam for email delivery so workflows can be exercised without a provider
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Resend HTTP API client
#[derive(Debug, Clone)]
pub struct ResendEmailSender {
    http: Client,
    api_url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

impl ResendEmailSender {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let body = ResendRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected { status, body });
        }

        tracing::debug!("Email accepted by provider for delivery");
        Ok(())
    }
}

/// Used when no API key is configured; every send fails
#[derive(Debug, Clone, Default)]
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send(&self, _message: EmailMessage) -> Result<(), EmailError> {
        tracing::warn!("Email requested but RESEND_API_KEY is not configured");
        Err(EmailError::NotConfigured)
    }
}

pub fn otp_subject(verification_type: VerificationType) -> &'static str {
    match verification_type {
        VerificationType::Registration => "Verify your Acadify account",
        VerificationType::PasswordReset => "Reset your Acadify password",
    }
}

/// HTML body carrying the code and how long it stays valid
pub fn render_otp_email(
    to: &str,
    code: &str,
    verification_type: VerificationType,
    ttl_minutes: i64,
    year: i32,
) -> EmailMessage {
    let intro = match verification_type {
        VerificationType::Registration => {
            "Welcome to Acadify! Please verify your email address using the code below:"
        }
        VerificationType::PasswordReset => {
            "We received a request to reset your password. Use the code below to proceed:"
        }
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
  <body style="font-family: 'Segoe UI', Tahoma, sans-serif; background: #f4f4f5; padding: 20px;">
    <div style="max-width: 500px; margin: 0 auto; background: white; border-radius: 12px; padding: 40px;">
      <h1 style="color: #6366f1; text-align: center;">Acadify</h1>
      <p>{intro}</p>
      <p style="font-size: 36px; letter-spacing: 8px; font-weight: bold; text-align: center;">{code}</p>
      <p>This code will expire in <strong>{ttl_minutes} minutes</strong>.</p>
      <p style="background: #fef3c7; padding: 12px;">If you didn't request this, please ignore this email or contact support.</p>
      <p style="text-align: center; color: #a1a1aa; font-size: 12px;">&copy; {year} Acadify. All rights reserved.</p>
    </div>
  </body>
</html>"#
    );

    EmailMessage {
        to: to.to_owned(),
        subject: otp_subject(verification_type).to_owned(),
        html,
    }
}

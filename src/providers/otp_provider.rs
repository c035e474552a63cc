use std::sync::Arc;

use mockable::Clock;
use sea_orm::ConnectionTrait;

use crate::errors::InternalError;
use crate::errors::internal::OtpError;
use crate::providers::CryptoProvider;
use crate::providers::input_validation::validate_otp_format;
use crate::stores::{NewOtp, OtpStore, ProfileStore};
use crate::types::db::{VerificationType, otp_verification};

/// Wrong guesses a single code tolerates before it must be reissued
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// A freshly persisted code. The plain code only lives long enough to be
/// emailed.
#[derive(Debug, Clone)]
pub struct IssuedOtp {
    pub record_id: String,
    pub code: String,
    /// Epoch milliseconds
    pub expires_at: i64,
}

/// Issues and checks one-time passcodes
///
/// Both operations expect to run inside the caller's transaction so that
/// "delete older codes, insert new one" and "consume code, update profile"
/// are each atomic.
pub struct OtpProvider {
    otp_store: Arc<OtpStore>,
    profile_store: Arc<ProfileStore>,
    crypto: Arc<CryptoProvider>,
    clock: Arc<dyn Clock + Send + Sync>,
    ttl_minutes: i64,
    resend_cooldown_seconds: i64,
}

impl OtpProvider {
    pub fn new(
        otp_store: Arc<OtpStore>,
        profile_store: Arc<ProfileStore>,
        crypto: Arc<CryptoProvider>,
        clock: Arc<dyn Clock + Send + Sync>,
        ttl_minutes: i64,
        resend_cooldown_seconds: i64,
    ) -> Self {
        Self {
            otp_store,
            profile_store,
            crypto,
            clock,
            ttl_minutes,
            resend_cooldown_seconds,
        }
    }

    pub fn ttl_minutes(&self) -> i64 {
        self.ttl_minutes
    }

    /// Replace any unverified code for the pair with a new one
    pub async fn issue(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        email: &str,
        verification_type: VerificationType,
    ) -> Result<IssuedOtp, InternalError> {
        let now = self.clock.utc().timestamp_millis();

        if let Some(existing) = self
            .otp_store
            .find_unverified(conn, user_id, verification_type)
            .await?
        {
            let cooldown_ms = self.resend_cooldown_seconds * 1000;
            let elapsed_ms = now - existing.created_at;
            if elapsed_ms < cooldown_ms {
                let remaining_ms = cooldown_ms - elapsed_ms;
                let retry_after_seconds = (remaining_ms + 999) / 1000;
                tracing::warn!(
                    "OTP resend for user {} refused, retry in {}s",
                    user_id,
                    retry_after_seconds
                );
                return Err(OtpError::ResendTooSoon { retry_after_seconds }.into());
            }
        }

        let removed = self
            .otp_store
            .delete_unverified(conn, user_id, verification_type)
            .await?;
        if removed > 0 {
            tracing::debug!("Discarded {} stale OTP record(s) for user {}", removed, user_id);
        }

        let code = self.crypto.generate_otp_code();
        let expires_at = now + self.ttl_minutes * 60 * 1000;
        let record = self
            .otp_store
            .insert(
                conn,
                NewOtp {
                    user_id: user_id.to_owned(),
                    email: email.to_owned(),
                    verification_type,
                    otp_hash: self.crypto.otp_digest(&code)?,
                    otp_expiry: expires_at,
                },
            )
            .await?;

        Ok(IssuedOtp {
            record_id: record.id,
            code,
            expires_at,
        })
    }

    /// Check and consume a code
    ///
    /// A mismatch leaves the record in place but counts against it; after
    /// `MAX_FAILED_ATTEMPTS` wrong guesses the code stops being accepted. The
    /// counter is written through `conn`, so callers must commit on
    /// `Mismatch` and `TooManyAttempts`. A registration code also marks the
    /// profile verified.
    pub async fn verify(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        otp: &str,
        verification_type: VerificationType,
    ) -> Result<otp_verification::Model, InternalError> {
        let otp = otp.trim();
        validate_otp_format(otp)?;

        let record = self
            .otp_store
            .find_unverified(conn, user_id, verification_type)
            .await?
            .ok_or(OtpError::NoPendingVerification)?;

        if self.clock.utc().timestamp_millis() > record.otp_expiry {
            return Err(OtpError::Expired.into());
        }

        if record.failed_attempts >= MAX_FAILED_ATTEMPTS {
            return Err(OtpError::TooManyAttempts.into());
        }

        if !self.crypto.otp_matches(otp, &record.otp_hash)? {
            self.otp_store.record_failed_attempt(conn, &record.id).await?;
            if record.failed_attempts + 1 >= MAX_FAILED_ATTEMPTS {
                tracing::warn!("OTP {} locked after repeated wrong guesses", record.id);
                return Err(OtpError::TooManyAttempts.into());
            }
            return Err(OtpError::Mismatch.into());
        }

        // Lost race with a concurrent verification of the same code
        if !self.otp_store.mark_verified(conn, &record.id).await? {
            return Err(OtpError::NoPendingVerification.into());
        }

        if verification_type == VerificationType::Registration {
            self.profile_store.set_verified(conn, user_id).await?;
        }

        Ok(record)
    }

    /// Drop the unverified code for the pair, used when its email could not
    /// be delivered
    pub async fn revoke_unverified(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        verification_type: VerificationType,
    ) -> Result<(), InternalError> {
        self.otp_store
            .delete_unverified(conn, user_id, verification_type)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{AccountStore, NewProfile};
    use crate::test::utils::{MutableClock, setup_core_db};
    use crate::types::db::ApprovalStatus;
    use std::time::Duration;
    use sea_orm::DatabaseConnection;

    const START_MS: i64 = 1_700_000_000_000;

    struct Fixture {
        db: DatabaseConnection,
        clock: Arc<MutableClock>,
        provider: OtpProvider,
        profile_store: Arc<ProfileStore>,
        user_id: String,
    }

    async fn fixture(cooldown_seconds: i64) -> Fixture {
        let db = setup_core_db().await;
        let clock = Arc::new(MutableClock::at_epoch_ms(START_MS));
        let account = AccountStore::new(clock.clone())
            .create(&db, "ana@bru.edu", "hash")
            .await
            .unwrap();
        let profile_store = Arc::new(ProfileStore::new(clock.clone()));
        profile_store
            .create(
                &db,
                NewProfile {
                    user_id: account.id.clone(),
                    full_name: "Ana Lima".to_owned(),
                    email: "ana@bru.edu".to_owned(),
                    department: None,
                    organization_id: None,
                    approval_status: ApprovalStatus::Pending,
                    is_verified: false,
                },
            )
            .await
            .unwrap();

        let provider = OtpProvider::new(
            Arc::new(OtpStore::new(clock.clone())),
            profile_store.clone(),
            Arc::new(CryptoProvider::new("test-pepper-16-chars")),
            clock.clone(),
            10,
            cooldown_seconds,
        );

        Fixture {
            db,
            clock,
            provider,
            profile_store,
            user_id: account.id,
        }
    }

    #[tokio::test]
    async fn test_issue_sets_ten_minute_expiry() {
        let f = fixture(0).await;
        let issued = f
            .provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::Registration)
            .await
            .unwrap();

        assert_eq!(issued.code.len(), 6);
        assert_eq!(issued.expires_at, START_MS + 600_000);
    }

    #[tokio::test]
    async fn test_code_valid_until_expiry_millisecond() {
        let f = fixture(0).await;
        let issued = f
            .provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::Registration)
            .await
            .unwrap();

        f.clock.set_epoch_ms(issued.expires_at);
        f.provider
            .verify(&f.db, &f.user_id, &issued.code, VerificationType::Registration)
            .await
            .unwrap();

        let profile = f.profile_store.find_by_user_id(&f.db, &f.user_id).await.unwrap().unwrap();
        assert!(profile.is_verified);
    }

    #[tokio::test]
    async fn test_code_rejected_one_millisecond_after_expiry() {
        let f = fixture(0).await;
        let issued = f
            .provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::Registration)
            .await
            .unwrap();

        f.clock.set_epoch_ms(issued.expires_at + 1);
        let err = f
            .provider
            .verify(&f.db, &f.user_id, &issued.code, VerificationType::Registration)
            .await
            .unwrap_err();
        assert!(matches!(err, InternalError::Otp(OtpError::Expired)));
    }

    #[tokio::test]
    async fn test_mismatch_keeps_code_usable() {
        let f = fixture(0).await;
        let issued = f
            .provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::PasswordReset)
            .await
            .unwrap();
        let wrong = if issued.code == "123456" { "654321" } else { "123456" };

        let err = f
            .provider
            .verify(&f.db, &f.user_id, wrong, VerificationType::PasswordReset)
            .await
            .unwrap_err();
        assert!(matches!(err, InternalError::Otp(OtpError::Mismatch)));

        f.provider
            .verify(&f.db, &f.user_id, &issued.code, VerificationType::PasswordReset)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_code_locks_after_repeated_wrong_guesses() {
        let f = fixture(0).await;
        let issued = f
            .provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::PasswordReset)
            .await
            .unwrap();
        let wrong = if issued.code == "123456" { "654321" } else { "123456" };

        for _ in 1..MAX_FAILED_ATTEMPTS {
            let err = f
                .provider
                .verify(&f.db, &f.user_id, wrong, VerificationType::PasswordReset)
                .await
                .unwrap_err();
            assert!(matches!(err, InternalError::Otp(OtpError::Mismatch)));
        }
        let err = f
            .provider
            .verify(&f.db, &f.user_id, wrong, VerificationType::PasswordReset)
            .await
            .unwrap_err();
        assert!(matches!(err, InternalError::Otp(OtpError::TooManyAttempts)));

        // The right code no longer helps
        let err = f
            .provider
            .verify(&f.db, &f.user_id, &issued.code, VerificationType::PasswordReset)
            .await
            .unwrap_err();
        assert!(matches!(err, InternalError::Otp(OtpError::TooManyAttempts)));

        // A fresh code starts a fresh count
        let reissued = f
            .provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::PasswordReset)
            .await
            .unwrap();
        f.provider
            .verify(&f.db, &f.user_id, &reissued.code, VerificationType::PasswordReset)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let f = fixture(0).await;
        let issued = f
            .provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::Registration)
            .await
            .unwrap();

        f.provider
            .verify(&f.db, &f.user_id, &issued.code, VerificationType::Registration)
            .await
            .unwrap();
        let err = f
            .provider
            .verify(&f.db, &f.user_id, &issued.code, VerificationType::Registration)
            .await
            .unwrap_err();
        assert!(matches!(err, InternalError::Otp(OtpError::NoPendingVerification)));
    }

    #[tokio::test]
    async fn test_malformed_code_checked_before_lookup() {
        let f = fixture(0).await;
        let err = f
            .provider
            .verify(&f.db, &f.user_id, "12ab56", VerificationType::Registration)
            .await
            .unwrap_err();
        assert!(matches!(err, InternalError::Validation(_)));
    }

    #[tokio::test]
    async fn test_resend_inside_cooldown_is_refused() {
        let f = fixture(60).await;
        f.provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::Registration)
            .await
            .unwrap();

        f.clock.advance(Duration::from_secs(20));
        let err = f
            .provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::Registration)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InternalError::Otp(OtpError::ResendTooSoon { retry_after_seconds: 40 })
        ));

        f.clock.advance(Duration::from_secs(40));
        f.provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::Registration)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reissue_invalidates_previous_code() {
        let f = fixture(0).await;
        let first = f
            .provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::Registration)
            .await
            .unwrap();
        f.clock.advance(Duration::from_secs(1));
        let second = f
            .provider
            .issue(&f.db, &f.user_id, "ana@bru.edu", VerificationType::Registration)
            .await
            .unwrap();
        assert_ne!(first.record_id, second.record_id);

        if first.code != second.code {
            let err = f
                .provider
                .verify(&f.db, &f.user_id, &first.code, VerificationType::Registration)
                .await
                .unwrap_err();
            assert!(matches!(err, InternalError::Otp(OtpError::Mismatch)));
        }
        f.provider
            .verify(&f.db, &f.user_id, &second.code, VerificationType::Registration)
            .await
            .unwrap();
    }
}

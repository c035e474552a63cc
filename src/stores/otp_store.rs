use std::sync::Arc;

use mockable::Clock;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::{VerificationType, otp_verification};

#[derive(Debug, Clone)]
pub struct NewOtp {
    pub user_id: String,
    pub email: String,
    pub verification_type: VerificationType,
    pub otp_hash: String,
    /// Epoch milliseconds
    pub otp_expiry: i64,
}

pub struct OtpStore {
    clock: Arc<dyn Clock + Send + Sync>,
}

impl OtpStore {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { clock }
    }

    /// Remove every unverified record for the (user, type) pair
    pub async fn delete_unverified(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        verification_type: VerificationType,
    ) -> Result<u64, InternalError> {
        let result = otp_verification::Entity::delete_many()
            .filter(otp_verification::Column::UserId.eq(user_id))
            .filter(otp_verification::Column::VerificationType.eq(verification_type))
            .filter(otp_verification::Column::IsVerified.eq(false))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_unverified_otps", e))?;

        Ok(result.rows_affected)
    }

    pub async fn insert(
        &self,
        conn: &impl ConnectionTrait,
        new_otp: NewOtp,
    ) -> Result<otp_verification::Model, InternalError> {
        let model = otp_verification::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(new_otp.user_id),
            email: Set(new_otp.email),
            verification_type: Set(new_otp.verification_type),
            otp_hash: Set(new_otp.otp_hash),
            otp_expiry: Set(new_otp.otp_expiry),
            is_verified: Set(false),
            failed_attempts: Set(0),
            created_at: Set(self.clock.utc().timestamp_millis()),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_otp", e))
    }

    /// Most recent unverified record for the pair
    pub async fn find_unverified(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        verification_type: VerificationType,
    ) -> Result<Option<otp_verification::Model>, InternalError> {
        otp_verification::Entity::find()
            .filter(otp_verification::Column::UserId.eq(user_id))
            .filter(otp_verification::Column::VerificationType.eq(verification_type))
            .filter(otp_verification::Column::IsVerified.eq(false))
            .order_by_desc(otp_verification::Column::CreatedAt)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_unverified_otp", e))
    }

    pub async fn record_failed_attempt(
        &self,
        conn: &impl ConnectionTrait,
        otp_id: &str,
    ) -> Result<(), InternalError> {
        otp_verification::Entity::update_many()
            .col_expr(
                otp_verification::Column::FailedAttempts,
                Expr::col(otp_verification::Column::FailedAttempts).add(1),
            )
            .filter(otp_verification::Column::Id.eq(otp_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("record_failed_otp_attempt", e))?;

        Ok(())
    }

    /// Consume a record. Returns false if another request consumed it first.
    pub async fn mark_verified(
        &self,
        conn: &impl ConnectionTrait,
        otp_id: &str,
    ) -> Result<bool, InternalError> {
        let result = otp_verification::Entity::update_many()
            .col_expr(otp_verification::Column::IsVerified, Expr::value(true))
            .filter(otp_verification::Column::Id.eq(otp_id))
            .filter(otp_verification::Column::IsVerified.eq(false))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("mark_otp_verified", e))?;

        Ok(result.rows_affected == 1)
    }
}

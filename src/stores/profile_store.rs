use std::sync::Arc;

use mockable::Clock;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::errors::InternalError;
use crate::types::db::{ApprovalStatus, profile};

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub department: Option<String>,
    pub organization_id: Option<String>,
    pub approval_status: ApprovalStatus,
    pub is_verified: bool,
}

pub struct ProfileStore {
    clock: Arc<dyn Clock + Send + Sync>,
}

impl ProfileStore {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { clock }
    }

    pub async fn create(
        &self,
        conn: &impl ConnectionTrait,
        new_profile: NewProfile,
    ) -> Result<profile::Model, InternalError> {
        let now = self.clock.utc().timestamp_millis();
        let model = profile::ActiveModel {
            user_id: Set(new_profile.user_id),
            full_name: Set(new_profile.full_name),
            email: Set(new_profile.email),
            department: Set(new_profile.department),
            organization_id: Set(new_profile.organization_id),
            approval_status: Set(Some(new_profile.approval_status)),
            is_verified: Set(new_profile.is_verified),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_profile", e))
    }

    pub async fn find_by_user_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<profile::Model>, InternalError> {
        profile::Entity::find_by_id(user_id.to_owned())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_profile", e))
    }

    pub async fn set_approval_status(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        status: ApprovalStatus,
    ) -> Result<(), InternalError> {
        self.update_column(
            conn,
            user_id,
            profile::Column::ApprovalStatus,
            Expr::value(status.as_str()),
            "set_profile_approval_status",
        )
        .await
    }

    pub async fn set_verified(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<(), InternalError> {
        self.update_column(
            conn,
            user_id,
            profile::Column::IsVerified,
            Expr::value(true),
            "set_profile_verified",
        )
        .await
    }

    async fn update_column(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        column: profile::Column,
        value: sea_orm::sea_query::SimpleExpr,
        operation: &str,
    ) -> Result<(), InternalError> {
        profile::Entity::update_many()
            .col_expr(column, value)
            .col_expr(
                profile::Column::UpdatedAt,
                Expr::value(self.clock.utc().timestamp_millis()),
            )
            .filter(profile::Column::UserId.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database(operation, e))?;
        Ok(())
    }
}

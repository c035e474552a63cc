use std::collections::HashMap;
use std::sync::Arc;

use mockable::Clock;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::{ApprovalStatus, approval_request, profile};

/// Pending request joined with the requester's profile
#[derive(Debug, Clone, PartialEq)]
pub struct PendingApproval {
    pub request: approval_request::Model,
    pub full_name: String,
    pub email: String,
    pub department: Option<String>,
}

pub struct ApprovalStore {
    clock: Arc<dyn Clock + Send + Sync>,
}

impl ApprovalStore {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { clock }
    }

    pub async fn create(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        requested_role: &str,
    ) -> Result<approval_request::Model, InternalError> {
        let now = self.clock.utc().timestamp_millis();
        let model = approval_request::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_owned()),
            approver_id: Set(None),
            requested_role: Set(requested_role.to_owned()),
            status: Set(ApprovalStatus::Pending),
            remarks: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_approval_request", e))
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        request_id: &str,
    ) -> Result<Option<approval_request::Model>, InternalError> {
        approval_request::Entity::find_by_id(request_id.to_owned())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_approval_request", e))
    }

    /// Record a decision on a request that is still pending
    ///
    /// Returns false when the request was already decided (or does not
    /// exist); the caller distinguishes the two.
    pub async fn decide(
        &self,
        conn: &impl ConnectionTrait,
        request_id: &str,
        status: ApprovalStatus,
        approver_id: Option<&str>,
        remarks: Option<&str>,
    ) -> Result<bool, InternalError> {
        let result = approval_request::Entity::update_many()
            .col_expr(approval_request::Column::Status, Expr::value(status.as_str()))
            .col_expr(
                approval_request::Column::ApproverId,
                Expr::value(approver_id.map(str::to_owned)),
            )
            .col_expr(
                approval_request::Column::Remarks,
                Expr::value(remarks.map(str::to_owned)),
            )
            .col_expr(
                approval_request::Column::UpdatedAt,
                Expr::value(self.clock.utc().timestamp_millis()),
            )
            .filter(approval_request::Column::Id.eq(request_id))
            .filter(approval_request::Column::Status.eq(ApprovalStatus::Pending))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("decide_approval_request", e))?;

        Ok(result.rows_affected == 1)
    }

    /// Pending requests from members of one institution, oldest first,
    /// optionally restricted to some requested roles
    pub async fn list_pending(
        &self,
        conn: &impl ConnectionTrait,
        organization_id: &str,
        roles: Option<&[String]>,
    ) -> Result<Vec<PendingApproval>, InternalError> {
        let members: HashMap<String, profile::Model> = profile::Entity::find()
            .filter(profile::Column::OrganizationId.eq(organization_id))
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_organization_profiles", e))?
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();

        if members.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = approval_request::Entity::find()
            .filter(approval_request::Column::Status.eq(ApprovalStatus::Pending))
            .filter(approval_request::Column::UserId.is_in(members.keys().cloned()));
        if let Some(roles) = roles {
            query = query.filter(approval_request::Column::RequestedRole.is_in(roles.to_vec()));
        }

        let requests = query
            .order_by_asc(approval_request::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_pending_approvals", e))?;

        Ok(requests
            .into_iter()
            .filter_map(|request| {
                let member = members.get(&request.user_id)?;
                Some(PendingApproval {
                    full_name: member.full_name.clone(),
                    email: member.email.clone(),
                    department: member.department.clone(),
                    request,
                })
            })
            .collect())
    }
}

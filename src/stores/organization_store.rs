use std::sync::Arc;

use mockable::Clock;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::{InstitutionError, is_unique_violation};
use crate::types::db::organization;

/// Fields for a new institution. `institution_code` must already be
/// normalized.
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub email: String,
    pub institution_code: String,
}

pub struct OrganizationStore {
    clock: Arc<dyn Clock + Send + Sync>,
}

impl OrganizationStore {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { clock }
    }

    pub async fn find_by_code(
        &self,
        conn: &impl ConnectionTrait,
        institution_code: &str,
    ) -> Result<Option<organization::Model>, InternalError> {
        organization::Entity::find()
            .filter(organization::Column::InstitutionCode.eq(institution_code))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_organization_by_code", e))
    }

    /// Insert a new institution on the trial subscription
    ///
    /// Two concurrent creators of one code race on the unique index; the
    /// loser gets `CodeTaken`.
    pub async fn create(
        &self,
        conn: &impl ConnectionTrait,
        new_org: NewOrganization,
    ) -> Result<organization::Model, InternalError> {
        let now = self.clock.utc().timestamp_millis();
        let code = new_org.institution_code.clone();
        let model = organization::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(new_org.name),
            email: Set(new_org.email),
            institution_code: Set(new_org.institution_code),
            subscription_status: Set("trial".to_owned()),
            address: Set(None),
            phone: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                InstitutionError::CodeTaken { code }.into()
            } else {
                InternalError::database("insert_organization", e)
            }
        })
    }
}

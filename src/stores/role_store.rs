use std::sync::Arc;

use mockable::Clock;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::types::db::user_role;

/// Role assignments. Roles are stored verbatim and interpreted on read.
pub struct RoleStore {
    clock: Arc<dyn Clock + Send + Sync>,
}

impl RoleStore {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { clock }
    }

    pub async fn assign(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        role: &str,
    ) -> Result<user_role::Model, InternalError> {
        let model = user_role::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_owned()),
            role: Set(role.to_owned()),
            created_at: Set(self.clock.utc().timestamp_millis()),
        };

        model
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("insert_user_role", e))
    }

    /// The earliest assignment wins when an account has several
    pub async fn primary_role(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<String>, InternalError> {
        let role = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .order_by_asc(user_role::Column::CreatedAt)
            .order_by_asc(user_role::Column::Id)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_primary_role", e))?;

        Ok(role.map(|r| r.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::AccountStore;
    use crate::test::utils::{MutableClock, fixed_clock, setup_core_db};
    use std::time::Duration;

    #[tokio::test]
    async fn test_primary_role_is_earliest_assignment() {
        let db = setup_core_db().await;
        let account = AccountStore::new(fixed_clock())
            .create(&db, "ana@bru.edu", "hash")
            .await
            .unwrap();
        let clock = Arc::new(MutableClock::at_epoch_ms(1_700_000_000_000));
        let store = RoleStore::new(clock.clone());

        assert_eq!(store.primary_role(&db, &account.id).await.unwrap(), None);

        store.assign(&db, &account.id, "staff").await.unwrap();
        clock.advance(Duration::from_secs(5));
        store.assign(&db, &account.id, "admin").await.unwrap();

        assert_eq!(
            store.primary_role(&db, &account.id).await.unwrap().as_deref(),
            Some("staff")
        );
    }
}

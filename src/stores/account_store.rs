use std::sync::Arc;

use mockable::Clock;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::{RegistrationError, is_unique_violation};
use crate::types::db::account;

/// Credentialed identities. Emails are stored normalized by the caller.
pub struct AccountStore {
    clock: Arc<dyn Clock + Send + Sync>,
}

impl AccountStore {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { clock }
    }

    /// Insert a new account
    ///
    /// The unique index on `email` decides duplicates; a violation comes back
    /// as `EmailAlreadyRegistered`.
    pub async fn create(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
        password_hash: &str,
    ) -> Result<account::Model, InternalError> {
        let now = self.clock.utc().timestamp_millis();
        let model = account::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            email: Set(email.to_owned()),
            password_hash: Set(password_hash.to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                RegistrationError::EmailAlreadyRegistered {
                    email: email.to_owned(),
                }
                .into()
            } else {
                InternalError::database("insert_account", e)
            }
        })
    }

    pub async fn find_by_email(
        &self,
        conn: &impl ConnectionTrait,
        email: &str,
    ) -> Result<Option<account::Model>, InternalError> {
        account::Entity::find()
            .filter(account::Column::Email.eq(email))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_account_by_email", e))
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<account::Model>, InternalError> {
        account::Entity::find_by_id(user_id.to_owned())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_account_by_id", e))
    }

    /// Returns false when no account has this id
    pub async fn update_password_hash(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, InternalError> {
        let result = account::Entity::update_many()
            .col_expr(
                account::Column::PasswordHash,
                sea_orm::sea_query::Expr::value(password_hash),
            )
            .col_expr(
                account::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(self.clock.utc().timestamp_millis()),
            )
            .filter(account::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("update_password_hash", e))?;

        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{fixed_clock, setup_core_db};

    #[tokio::test]
    async fn test_create_and_find_account() {
        let db = setup_core_db().await;
        let store = AccountStore::new(fixed_clock());

        let created = store.create(&db, "ana@bru.edu", "$argon2id$hash").await.unwrap();
        let by_email = store.find_by_email(&db, "ana@bru.edu").await.unwrap().unwrap();
        let by_id = store.find_by_id(&db, &created.id).await.unwrap().unwrap();

        assert_eq!(by_email, created);
        assert_eq!(by_id, created);
        assert!(store.find_by_email(&db, "nobody@bru.edu").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let db = setup_core_db().await;
        let store = AccountStore::new(fixed_clock());

        store.create(&db, "ana@bru.edu", "h1").await.unwrap();
        match store.create(&db, "ana@bru.edu", "h2").await {
            Err(InternalError::Registration(RegistrationError::EmailAlreadyRegistered { email })) => {
                assert_eq!(email, "ana@bru.edu")
            }
            other => panic!("Expected EmailAlreadyRegistered, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_password_hash() {
        let db = setup_core_db().await;
        let store = AccountStore::new(fixed_clock());
        let account = store.create(&db, "ana@bru.edu", "old").await.unwrap();

        assert!(store.update_password_hash(&db, &account.id, "new").await.unwrap());
        assert!(!store.update_password_hash(&db, "missing", "new").await.unwrap());

        let reloaded = store.find_by_id(&db, &account.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "new");
    }
}

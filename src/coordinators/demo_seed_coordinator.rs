use std::sync::Arc;

use crate::app_data::AppData;
use crate::config::DatabaseConnections;
use crate::errors::InternalError;
use crate::errors::internal::InstitutionError;
use crate::providers::{CryptoProvider, InstitutionDirectory};
use crate::stores::NewProfile;
use crate::types::db::{ApprovalStatus, organization};
use crate::types::internal::StoredRole;
use crate::types::internal::context::RequestContext;

const DEMO_ACCOUNTS: [(StoredRole, &str, &str, Option<&str>); 6] = [
    (StoredRole::SuperAdmin, "superadmin@demo.com", "Super Admin Demo", None),
    (StoredRole::Admin, "admin@demo.com", "Admin Demo", None),
    (StoredRole::Staff, "staff@demo.com", "Staff Demo", Some("CSE")),
    (StoredRole::Student, "student@demo.com", "Student Demo", Some("CSE")),
    (StoredRole::Parent, "parent@demo.com", "Parent Demo", None),
    (StoredRole::Support, "support@demo.com", "Support Demo", None),
];

/// One demo account. `password` is only present when the account was
/// created by this run.
#[derive(Debug, Clone)]
pub struct SeededAccount {
    pub role: StoredRole,
    pub email: String,
    pub password: Option<String>,
}

/// Populates an institution with one approved account per role
pub struct DemoSeedCoordinator {
    app_data: Arc<AppData>,
    crypto: Arc<CryptoProvider>,
    institution_directory: Arc<InstitutionDirectory>,
}

impl DemoSeedCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        let crypto = Arc::new(CryptoProvider::new(app_data.secret_manager.password_pepper()));
        let institution_directory = Arc::new(InstitutionDirectory::new(
            app_data.organization_store.clone(),
        ));

        Self {
            app_data,
            crypto,
            institution_directory,
        }
    }

    pub async fn seed(
        &self,
        ctx: &RequestContext,
        institution_code: &str,
    ) -> Result<Vec<SeededAccount>, InternalError> {
        // Step 1: Institution, reused if it already exists
        let organization = self.demo_institution(ctx, institution_code).await?;

        // Step 2: Accounts, each in its own transaction
        let mut seeded = Vec::with_capacity(DEMO_ACCOUNTS.len());
        for (role, email, full_name, department) in DEMO_ACCOUNTS {
            let existing = self
                .app_data
                .account_store
                .find_by_email(&self.app_data.connections.main, email)
                .await?;
            if existing.is_some() {
                tracing::info!("Demo account {} already exists, skipping", email);
                seeded.push(SeededAccount {
                    role,
                    email: email.to_owned(),
                    password: None,
                });
                continue;
            }

            let password = self.crypto.generate_secure_password();
            self.create_demo_account(&organization, role, email, full_name, department, &password)
                .await?;
            tracing::info!("Demo {} account {} created", role, email);
            seeded.push(SeededAccount {
                role,
                email: email.to_owned(),
                password: Some(password),
            });
        }

        Ok(seeded)
    }

    async fn demo_institution(
        &self,
        ctx: &RequestContext,
        institution_code: &str,
    ) -> Result<organization::Model, InternalError> {
        let conn = &self.app_data.connections.main;
        match self.institution_directory.resolve(conn, institution_code).await {
            Ok(org) => Ok(org),
            Err(InternalError::Institution(InstitutionError::NotFound { .. })) => {
                let org = self
                    .institution_directory
                    .create(conn, institution_code, "Demo College", "superadmin@demo.com")
                    .await?;
                if let Err(audit_err) = self
                    .app_data
                    .audit_logger
                    .log_institution_created(ctx, &org.id, &org.institution_code)
                    .await
                {
                    tracing::error!("Failed to log institution creation: {:?}", audit_err);
                }
                Ok(org)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_demo_account(
        &self,
        organization: &organization::Model,
        role: StoredRole,
        email: &str,
        full_name: &str,
        department: Option<&str>,
        password: &str,
    ) -> Result<(), InternalError> {
        let password_hash = self.crypto.hash_password(password)?;
        let txn = self.app_data.connections.begin_transaction().await?;

        let account = self
            .app_data
            .account_store
            .create(&txn, email, &password_hash)
            .await?;
        self.app_data
            .profile_store
            .create(
                &txn,
                NewProfile {
                    user_id: account.id.clone(),
                    full_name: full_name.to_owned(),
                    email: email.to_owned(),
                    department: department.map(str::to_owned),
                    organization_id: Some(organization.id.clone()),
                    approval_status: ApprovalStatus::Approved,
                    is_verified: true,
                },
            )
            .await?;
        self.app_data
            .role_store
            .assign(&txn, &account.id, role.as_str())
            .await?;

        DatabaseConnections::commit_transaction(txn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinators::SessionCoordinator;
    use crate::test::utils::setup_app_data;
    use crate::types::internal::DisplayRole;

    #[tokio::test]
    async fn test_seed_creates_one_approved_account_per_role() {
        let app = setup_app_data().await;
        let seeder = DemoSeedCoordinator::new(app.app_data.clone());
        let ctx = RequestContext::for_cli("seed-demo");

        let seeded = seeder.seed(&ctx, "DEMO").await.unwrap();
        assert_eq!(seeded.len(), 6);
        assert!(seeded.iter().all(|account| account.password.is_some()));

        let staff = seeded
            .iter()
            .find(|account| account.role == StoredRole::Staff)
            .unwrap();
        let outcome = SessionCoordinator::new(app.app_data.clone())
            .login(&ctx, &staff.email, staff.password.as_deref().unwrap())
            .await
            .unwrap();
        let user = outcome.session.user.unwrap();
        assert_eq!(user.role, DisplayRole::Faculty);
        assert_eq!(user.department.as_deref(), Some("CSE"));
    }

    #[tokio::test]
    async fn test_seed_skips_existing_accounts() {
        let app = setup_app_data().await;
        let seeder = DemoSeedCoordinator::new(app.app_data.clone());
        let ctx = RequestContext::for_cli("seed-demo");

        seeder.seed(&ctx, "demo").await.unwrap();
        let second = seeder.seed(&ctx, "demo").await.unwrap();

        assert_eq!(second.len(), 6);
        assert!(second.iter().all(|account| account.password.is_none()));
    }
}

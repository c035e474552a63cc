use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::audit::AuditLogger;
use crate::config::{ApplicationSettings, DatabaseConnections, SecretManager};
use crate::errors::InternalError;
use crate::providers::{DisabledEmailSender, EmailSender, ResendEmailSender};
use crate::stores::{
    AccountStore, ApprovalStore, AuditStore, OrganizationStore, OtpStore, ProfileStore, RoleStore,
};

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once at startup and shared across
/// coordinators.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init(connections, settings)
///   ↓ creates once
///   ├─ connections (main + audit DatabaseConnection)
///   ├─ settings / secret_manager / clock / email_sender
///   ├─ account, organization, profile, role, approval, otp stores
///   └─ audit_store + audit_logger
///   ↓ wrapped in Arc<AppData>
///   ├─ RegistrationCoordinator::new(app_data)
///   ├─ OtpCoordinator::new(app_data)
///   ├─ ApprovalCoordinator::new(app_data)
///   └─ SessionCoordinator::new(app_data)
/// ```
pub struct AppData {
    pub connections: DatabaseConnections,
    pub settings: ApplicationSettings,
    pub secret_manager: Arc<SecretManager>,
    pub clock: Arc<dyn Clock + Send + Sync>,
    pub email_sender: Arc<dyn EmailSender>,
    pub audit_store: Arc<AuditStore>,
    pub audit_logger: Arc<AuditLogger>,
    pub account_store: Arc<AccountStore>,
    pub organization_store: Arc<OrganizationStore>,
    pub profile_store: Arc<ProfileStore>,
    pub role_store: Arc<RoleStore>,
    pub approval_store: Arc<ApprovalStore>,
    pub otp_store: Arc<OtpStore>,
}

impl AppData {
    /// Initialize all application data from the process environment
    ///
    /// Database connections should be initialized and migrated before
    /// calling this.
    pub async fn init(
        connections: DatabaseConnections,
        settings: ApplicationSettings,
    ) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        tracing::debug!("Initializing secret manager...");
        let secret_manager = Arc::new(SecretManager::init().map_err(|e| {
            InternalError::parse("secret_manager", format!("Secret manager init failed: {}", e))
        })?);

        let email_sender: Arc<dyn EmailSender> = match secret_manager.email_api_key() {
            Some(api_key) => Arc::new(ResendEmailSender::new(
                settings.email_api_url(),
                api_key,
                settings.email_from(),
            )),
            None => {
                tracing::warn!("RESEND_API_KEY is not set; OTP emails cannot be delivered");
                Arc::new(DisabledEmailSender)
            }
        };

        let app_data = Self::new(
            connections,
            settings,
            secret_manager,
            email_sender,
            Arc::new(DefaultClock),
        );

        tracing::info!("AppData initialization complete");
        Ok(app_data)
    }

    /// Assemble from already-built parts
    pub fn new(
        connections: DatabaseConnections,
        settings: ApplicationSettings,
        secret_manager: Arc<SecretManager>,
        email_sender: Arc<dyn EmailSender>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let audit_store = Arc::new(AuditStore::new(connections.audit.clone(), clock.clone()));
        let audit_logger = Arc::new(AuditLogger::new(audit_store.clone()));

        Self {
            account_store: Arc::new(AccountStore::new(clock.clone())),
            organization_store: Arc::new(OrganizationStore::new(clock.clone())),
            profile_store: Arc::new(ProfileStore::new(clock.clone())),
            role_store: Arc::new(RoleStore::new(clock.clone())),
            approval_store: Arc::new(ApprovalStore::new(clock.clone())),
            otp_store: Arc::new(OtpStore::new(clock.clone())),
            connections,
            settings,
            secret_manager,
            clock,
            email_sender,
            audit_store,
            audit_logger,
        }
    }
}

use migration::{AuditMigrator, CoreMigrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::config::BootstrapSettings;
use crate::errors::InternalError;

/// Main and audit database connections
///
/// Audit events live in their own database so that a rolled-back workflow
/// transaction never takes its audit trail with it.
#[derive(Clone)]
pub struct DatabaseConnections {
    pub main: DatabaseConnection,
    pub audit: DatabaseConnection,
}

impl DatabaseConnections {
    /// Connect both databases. Does NOT run migrations.
    pub async fn init(bootstrap_settings: &BootstrapSettings) -> Result<Self, InternalError> {
        let main = Self::connect(bootstrap_settings.database_url(), "connect_database").await?;
        let audit =
            Self::connect(bootstrap_settings.audit_database_url(), "connect_audit_database")
                .await?;

        Ok(Self { main, audit })
    }

    pub fn from_connections(main: DatabaseConnection, audit: DatabaseConnection) -> Self {
        Self { main, audit }
    }

    async fn connect(url: &str, operation: &str) -> Result<DatabaseConnection, InternalError> {
        let db = Database::connect(url)
            .await
            .map_err(|e| InternalError::database(operation, e))?;

        tracing::debug!("Connected to database: {}", url);
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<(), InternalError> {
        migrate_core_database(&self.main).await?;
        migrate_audit_database(&self.audit).await?;
        Ok(())
    }

    pub async fn begin_transaction(&self) -> Result<DatabaseTransaction, InternalError> {
        self.main.begin().await.map_err(InternalError::transaction_begin)
    }

    pub async fn commit_transaction(txn: DatabaseTransaction) -> Result<(), InternalError> {
        txn.commit().await.map_err(InternalError::transaction_commit)
    }
}

/// Run pending migrations on the main database
pub async fn migrate_core_database(db: &DatabaseConnection) -> Result<(), InternalError> {
    CoreMigrator::up(db, None)
        .await
        .map_err(|e| InternalError::database("run_migrations", e))?;

    tracing::debug!("Core database migrations completed");
    Ok(())
}

/// Run pending migrations on the audit database
pub async fn migrate_audit_database(audit_db: &DatabaseConnection) -> Result<(), InternalError> {
    AuditMigrator::up(audit_db, None)
        .await
        .map_err(|e| InternalError::database("run_audit_migrations", e))?;

    tracing::debug!("Audit database migrations completed");
    Ok(())
}

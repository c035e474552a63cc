use crate::config::{BootstrapSettings, DatabaseConnections};

/// Run database migrations for the main and audit databases
///
/// Connects and migrates without building `AppData`, so it works before
/// secrets are configured.
pub async fn run_migrations(
    bootstrap_settings: &BootstrapSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Running database migrations...");

    let connections = DatabaseConnections::init(bootstrap_settings).await?;
    connections.migrate().await?;

    tracing::info!("All migrations completed successfully");
    Ok(())
}

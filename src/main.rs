use std::sync::Arc;

use clap::Parser;
use poem::{Server, listener::TcpListener};

use acadify_backend::api::build_routes;
use acadify_backend::cli::{self, Cli, Commands};
use acadify_backend::config::{
    ApplicationSettings, BootstrapSettings, DatabaseConnections, init_logging,
};
use acadify_backend::AppData;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging()?;

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    let bootstrap_settings = BootstrapSettings::from_env()?;
    tracing::debug!("Bootstrap settings: {:?}", bootstrap_settings);

    if command == Commands::Migrate {
        return cli::migrate::run_migrations(&bootstrap_settings).await;
    }

    let settings = ApplicationSettings::from_env()?;
    if !settings.auth_mode().is_live() {
        tracing::warn!("AUTH_MODE=fixture: every session resolves to the development fixture user");
    }

    // Connect and migrate before building AppData
    let connections = DatabaseConnections::init(&bootstrap_settings).await?;
    connections.migrate().await?;
    tracing::info!("Database migrations completed");

    let app_data = Arc::new(AppData::init(connections, settings).await?);

    match command {
        Commands::Serve => serve(app_data, &bootstrap_settings).await,
        other => cli::execute_command(other, app_data).await,
    }
}

async fn serve(
    app_data: Arc<AppData>,
    bootstrap_settings: &BootstrapSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let address = bootstrap_settings.server_address();
    let public_url = format!("http://localhost:{}", bootstrap_settings.server_port());
    let app = build_routes(app_data, &public_url);

    tracing::info!("Starting server on http://{}", address);
    tracing::info!("Swagger UI available at {}/swagger", public_url);
    tracing::info!("API endpoints available at {}/api", public_url);

    Server::new(TcpListener::bind(address)).run(app).await?;
    Ok(())
}

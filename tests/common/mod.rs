// Common test utilities for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockable::DefaultClock;
use sea_orm::{Database, DatabaseConnection};

use acadify_backend::AppData;
use acadify_backend::config::{
    ApplicationSettings, DatabaseConnections, EnvironmentProvider, SecretManager,
    migrate_audit_database, migrate_core_database,
};
use acadify_backend::errors::internal::EmailError;
use acadify_backend::providers::{EmailMessage, EmailSender};

pub const TEST_PASSWORD: &str = "Correct-Horse-42";

/// Creates a test main database with migrations applied
pub async fn setup_test_core_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    migrate_core_database(&db)
        .await
        .expect("Failed to run core migrations");
    db
}

/// Creates a test audit database with migrations applied
pub async fn setup_test_audit_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");
    migrate_audit_database(&db)
        .await
        .expect("Failed to run audit migrations");
    db
}

/// Environment backed by a map instead of the process environment
#[derive(Default)]
pub struct TestEnvironment {
    vars: HashMap<String, String>,
}

impl TestEnvironment {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl EnvironmentProvider for TestEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Email sender that keeps every message instead of delivering it
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingEmailSender {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// The six-digit code in the most recent email
    pub fn last_code(&self) -> String {
        let sent = self.sent();
        let html = &sent.last().expect("no email sent").html;
        html.split(|c: char| !c.is_ascii_digit())
            .find(|run| run.len() == 6)
            .expect("no OTP code in email body")
            .to_string()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// AppData over in-memory databases and a recording email sender
pub async fn setup_app_data() -> (Arc<AppData>, Arc<RecordingEmailSender>) {
    let env = Arc::new(
        TestEnvironment::default()
            .with_var("JWT_SECRET", "integration-secret-key-with-32-characters")
            .with_var("PASSWORD_PEPPER", "integration-pepper")
            .with_var("OTP_RESEND_COOLDOWN_SECONDS", "0"),
    );
    let settings =
        ApplicationSettings::from_env_provider(env.clone()).expect("Failed to load settings");
    let secrets = Arc::new(SecretManager::from_env_provider(env).expect("Failed to load secrets"));
    let connections = DatabaseConnections::from_connections(
        setup_test_core_db().await,
        setup_test_audit_db().await,
    );
    let emails = Arc::new(RecordingEmailSender::default());

    let app_data = Arc::new(AppData::new(
        connections,
        settings,
        secrets,
        emails.clone(),
        Arc::new(DefaultClock),
    ));
    (app_data, emails)
}

/// Helper to manage environment variables in tests
///
/// Cleans up specified environment variables on creation and drop,
/// ensuring test isolation when dealing with global environment state.
pub struct EnvGuard {
    vars: Vec<String>,
}

impl EnvGuard {
    pub fn new(vars: Vec<&str>) -> Self {
        for var in &vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
        Self {
            vars: vars.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in &self.vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }
}

/// Global mutex for tests that modify environment variables
///
/// Environment variables are process-global, so tests that modify them
/// must run serially to avoid race conditions.
pub static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

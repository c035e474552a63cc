// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use sea_orm::{Database, DatabaseConnection};

use crate::app_data::AppData;
use crate::config::{
    ApplicationSettings, DatabaseConnections, MockEnvironment, SecretManager,
    migrate_audit_database, migrate_core_database,
};
use crate::errors::internal::EmailError;
use crate::providers::{EmailMessage, EmailSender};
use crate::stores::AuditStore;

pub const TEST_JWT_SECRET: &str = "test-secret-key-minimum-32-characters-long";
pub const TEST_PASSWORD_PEPPER: &str = "test-pepper-16-chars";

/// 2023-11-14T22:13:20Z
pub const TEST_EPOCH_MS: i64 = 1_700_000_000_000;

/// Clock that only moves when told to
pub struct MutableClock {
    now: Mutex<DateTime<Utc>>,
}

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn at_epoch_ms(epoch_ms: i64) -> Self {
        Self::new(Self::from_epoch_ms(epoch_ms))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn set_epoch_ms(&self, epoch_ms: i64) {
        self.set(Self::from_epoch_ms(epoch_ms));
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }

    fn from_epoch_ms(epoch_ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(epoch_ms).unwrap()
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(MutableClock::at_epoch_ms(TEST_EPOCH_MS))
}

/// In-memory main database with migrations applied
pub async fn setup_core_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    migrate_core_database(&db)
        .await
        .expect("Failed to run core migrations");
    db
}

/// In-memory audit database with migrations applied
pub async fn setup_audit_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create audit database");
    migrate_audit_database(&db)
        .await
        .expect("Failed to run audit migrations");
    db
}

/// Returns (audit_db, audit_store)
pub async fn setup_audit_store() -> (DatabaseConnection, Arc<AuditStore>) {
    let audit_db = setup_audit_db().await;
    let store = Arc::new(AuditStore::new(audit_db.clone(), fixed_clock()));
    (audit_db, store)
}

pub fn test_secrets() -> Arc<SecretManager> {
    let env = MockEnvironment::empty()
        .with_var("JWT_SECRET", TEST_JWT_SECRET)
        .with_var("PASSWORD_PEPPER", TEST_PASSWORD_PEPPER);
    Arc::new(SecretManager::from_env_provider(Arc::new(env)).expect("Failed to load test secrets"))
}

/// Defaults plus no resend cooldown, so tests can reissue codes freely
pub fn test_settings() -> ApplicationSettings {
    ApplicationSettings::from_env_provider(Arc::new(MockEnvironment::empty()))
        .expect("Failed to load test settings")
        .with_otp_resend_cooldown_seconds(0)
}

/// Email sender that keeps every message instead of delivering it
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingEmailSender {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::Transport("connection refused".to_owned()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Everything a coordinator test needs, wired to in-memory databases
pub struct TestApp {
    pub app_data: Arc<AppData>,
    pub clock: Arc<MutableClock>,
    pub emails: Arc<RecordingEmailSender>,
}

pub async fn setup_app_data() -> TestApp {
    setup_app_data_with(test_settings(), Arc::new(RecordingEmailSender::default())).await
}

pub async fn setup_app_data_with(
    settings: ApplicationSettings,
    emails: Arc<RecordingEmailSender>,
) -> TestApp {
    let connections =
        DatabaseConnections::from_connections(setup_core_db().await, setup_audit_db().await);
    let clock = Arc::new(MutableClock::at_epoch_ms(TEST_EPOCH_MS));

    let app_data = Arc::new(AppData::new(
        connections,
        settings,
        test_secrets(),
        emails.clone(),
        clock.clone(),
    ));

    TestApp {
        app_data,
        clock,
        emails,
    }
}

/// The six-digit code inside a rendered OTP email
pub fn extract_otp(html: &str) -> String {
    let chars: Vec<char> = html.chars().collect();
    let mut run = String::new();
    for (i, c) in chars.iter().enumerate() {
        if c.is_ascii_digit() {
            run.push(*c);
            let next_is_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if run.len() == 6 && !next_is_digit {
                return run;
            }
        } else {
            run.clear();
        }
    }
    panic!("no OTP code in email body");
}

pub const TEST_PASSWORD: &str = "Correct-Horse-42";

/// Register `email` with `role` at `institution_code`
pub async fn register_user(
    app: &TestApp,
    role: &str,
    institution_code: &str,
    email: &str,
) -> crate::coordinators::RegistrationOutcome {
    crate::coordinators::RegistrationCoordinator::new(app.app_data.clone())
        .register(
            &crate::types::internal::RequestContext::new(),
            crate::coordinators::RegistrationRequest {
                full_name: "Test User".to_owned(),
                email: email.to_owned(),
                password: TEST_PASSWORD.to_owned(),
                role: role.to_owned(),
                institution_code: institution_code.to_owned(),
                department: None,
                institution_name: None,
            },
        )
        .await
        .expect("Failed to register test user")
}

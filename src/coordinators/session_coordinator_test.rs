use std::sync::Arc;
use std::time::Duration;

use super::session_coordinator::SessionCoordinator;
use crate::errors::internal::{CredentialError, SessionError};
use crate::errors::{ErrorKind, InternalError};
use crate::test::utils::{
    RecordingEmailSender, TEST_PASSWORD, register_user, setup_app_data, setup_app_data_with,
    test_settings,
};
use crate::types::db::ApprovalStatus;
use crate::types::internal::context::RequestContext;
use crate::types::internal::{AuthMode, DisplayRole, SessionDenial, SessionState};

#[tokio::test]
async fn test_login_returns_token_and_pending_session() {
    let app = setup_app_data().await;
    let user = register_user(&app, "super_admin", "bru4j", "dean@bru.edu").await;
    let sessions = SessionCoordinator::new(app.app_data.clone());

    let outcome = sessions
        .login(&RequestContext::new(), "  DEAN@bru.edu ", TEST_PASSWORD)
        .await
        .unwrap();

    assert_eq!(outcome.claims.sub, user.user_id);
    assert_eq!(outcome.expires_in, 15 * 60);
    assert!(outcome.session.user.is_none());
    assert_eq!(outcome.session.approval_status, Some(ApprovalStatus::Pending));
    assert_eq!(outcome.session.denial, Some(SessionDenial::PendingApproval));

    let claims = sessions
        .token_provider()
        .validate_jwt(&outcome.access_token)
        .unwrap();
    assert_eq!(claims, outcome.claims);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let app = setup_app_data().await;
    register_user(&app, "super_admin", "bru4j", "dean@bru.edu").await;
    let sessions = SessionCoordinator::new(app.app_data.clone());
    let ctx = RequestContext::new();

    for (email, password) in [
        ("dean@bru.edu", "Wrong-Password-1"),
        ("nobody@bru.edu", TEST_PASSWORD),
        ("not-an-email", TEST_PASSWORD),
    ] {
        let err = sessions.login(&ctx, email, password).await.unwrap_err();
        assert!(matches!(err, InternalError::Credential(CredentialError::InvalidCredentials)));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}

#[tokio::test]
async fn test_session_without_token_is_anonymous() {
    let app = setup_app_data().await;
    let sessions = SessionCoordinator::new(app.app_data.clone());

    let state = sessions.session(&RequestContext::new()).await.unwrap();
    assert_eq!(state, SessionState::anonymous());
}

#[tokio::test]
async fn test_token_expires_with_clock() {
    let app = setup_app_data().await;
    register_user(&app, "super_admin", "bru4j", "dean@bru.edu").await;
    let sessions = SessionCoordinator::new(app.app_data.clone());
    let outcome = sessions
        .login(&RequestContext::new(), "dean@bru.edu", TEST_PASSWORD)
        .await
        .unwrap();

    app.clock.advance(Duration::from_secs(15 * 60));
    let err = sessions
        .token_provider()
        .validate_jwt(&outcome.access_token)
        .unwrap_err();
    assert!(matches!(err, InternalError::Credential(CredentialError::ExpiredToken)));
}

#[tokio::test]
async fn test_change_password_requires_session_and_current_password() {
    let app = setup_app_data().await;
    register_user(&app, "super_admin", "bru4j", "dean@bru.edu").await;
    let sessions = SessionCoordinator::new(app.app_data.clone());

    let err = sessions
        .change_password(&RequestContext::new(), TEST_PASSWORD, "Brand-New-Pass-99")
        .await
        .unwrap_err();
    assert!(matches!(err, InternalError::Session(SessionError::Unauthenticated)));

    let outcome = sessions
        .login(&RequestContext::new(), "dean@bru.edu", TEST_PASSWORD)
        .await
        .unwrap();
    let ctx = RequestContext::new().with_auth(outcome.claims);

    let err = sessions
        .change_password(&ctx, "Wrong-Password-1", "Brand-New-Pass-99")
        .await
        .unwrap_err();
    assert!(matches!(err, InternalError::Credential(CredentialError::IncorrectPassword)));

    sessions
        .change_password(&ctx, TEST_PASSWORD, "Brand-New-Pass-99")
        .await
        .unwrap();
    sessions
        .login(&RequestContext::new(), "dean@bru.edu", "Brand-New-Pass-99")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_fixture_mode_grants_configured_user() {
    let app = setup_app_data_with(
        test_settings().with_auth_mode(AuthMode::development_fixture()),
        Arc::new(RecordingEmailSender::default()),
    )
    .await;
    register_user(&app, "super_admin", "bru4j", "dean@bru.edu").await;
    let sessions = SessionCoordinator::new(app.app_data.clone());

    let outcome = sessions
        .login(&RequestContext::new(), "dean@bru.edu", TEST_PASSWORD)
        .await
        .unwrap();

    let user = outcome.session.user.unwrap();
    assert_eq!(user.role, DisplayRole::Admin);
    assert_eq!(user.email, "admin@demo.com");
}

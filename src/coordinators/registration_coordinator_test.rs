use sea_orm::{ConnectionTrait, EntityTrait};

use super::registration_coordinator::{RegistrationCoordinator, RegistrationRequest};
use crate::errors::ErrorKind;
use crate::errors::InternalError;
use crate::errors::internal::{InstitutionError, RegistrationError, ValidationError};
use crate::test::utils::{TestApp, setup_app_data};
use crate::types::db::{ApprovalStatus, account, approval_request, profile, user_role};
use crate::types::internal::context::RequestContext;

const PASSWORD: &str = "Correct-Horse-42";

fn request(role: &str, code: &str, email: &str) -> RegistrationRequest {
    RegistrationRequest {
        full_name: "Ana Lima".to_owned(),
        email: email.to_owned(),
        password: PASSWORD.to_owned(),
        role: role.to_owned(),
        institution_code: code.to_owned(),
        department: Some("CSE".to_owned()),
        institution_name: None,
    }
}

async fn account_count(app: &TestApp) -> usize {
    account::Entity::find()
        .all(&app.app_data.connections.main)
        .await
        .unwrap()
        .len()
}

/// No registration record of any kind exists
async fn assert_no_registration_records(app: &TestApp) {
    let db = &app.app_data.connections.main;
    assert_eq!(account_count(app).await, 0);
    assert!(profile::Entity::find().all(db).await.unwrap().is_empty());
    assert!(user_role::Entity::find().all(db).await.unwrap().is_empty());
    assert!(approval_request::Entity::find().all(db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_super_admin_creates_institution() {
    let app = setup_app_data().await;
    let coordinator = RegistrationCoordinator::new(app.app_data.clone());

    let outcome = coordinator
        .register(
            &RequestContext::new(),
            RegistrationRequest {
                institution_name: Some("Bangalore Rural University".to_owned()),
                ..request("super_admin", "BRU4J", "dean@bru.edu")
            },
        )
        .await
        .unwrap();

    assert!(outcome.institution_created);
    assert_eq!(outcome.approval_status, ApprovalStatus::Pending);

    let db = &app.app_data.connections.main;
    let profile = profile::Entity::find_by_id(outcome.user_id.clone())
        .one(db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.organization_id.as_deref(), Some(outcome.organization_id.as_str()));
    assert_eq!(profile.approval_status, Some(ApprovalStatus::Pending));
    assert!(!profile.is_verified);
}

#[tokio::test]
async fn test_student_joins_existing_institution_case_insensitively() {
    let app = setup_app_data().await;
    let coordinator = RegistrationCoordinator::new(app.app_data.clone());
    let ctx = RequestContext::new();

    let admin = coordinator
        .register(&ctx, request("super_admin", "bru4j", "dean@bru.edu"))
        .await
        .unwrap();
    let student = coordinator
        .register(&ctx, request("student", "BRU4J", "Student@BRU.edu"))
        .await
        .unwrap();

    assert!(!student.institution_created);
    assert_eq!(student.organization_id, admin.organization_id);

    let db = &app.app_data.connections.main;
    let roles = user_role::Entity::find().all(db).await.unwrap();
    assert!(roles.iter().any(|r| r.user_id == student.user_id && r.role == "student"));

    let requests = approval_request::Entity::find().all(db).await.unwrap();
    let student_request = requests
        .iter()
        .find(|r| r.user_id == student.user_id)
        .unwrap();
    assert_eq!(student_request.status, ApprovalStatus::Pending);
    assert_eq!(student_request.requested_role, "student");

    let stored = account::Entity::find_by_id(student.user_id.clone())
        .one(db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.email, "student@bru.edu");
}

#[tokio::test]
async fn test_taken_code_is_a_conflict_and_keeps_no_account() {
    let app = setup_app_data().await;
    let coordinator = RegistrationCoordinator::new(app.app_data.clone());
    let ctx = RequestContext::new();
    coordinator
        .register(&ctx, request("super_admin", "xyz", "first@xyz.edu"))
        .await
        .unwrap();

    let err = coordinator
        .register(&ctx, request("super_admin", "XYZ", "second@xyz.edu"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InternalError::Institution(InstitutionError::CodeTaken { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(account_count(&app).await, 1);
}

#[tokio::test]
async fn test_unknown_code_leaves_no_account_behind() {
    let app = setup_app_data().await;
    let coordinator = RegistrationCoordinator::new(app.app_data.clone());

    let err = coordinator
        .register(&RequestContext::new(), request("staff", "nowhere", "ana@bru.edu"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InternalError::Institution(InstitutionError::NotFound { .. })
    ));
    assert_no_registration_records(&app).await;
}

#[tokio::test]
async fn test_duplicate_email_is_a_conflict() {
    let app = setup_app_data().await;
    let coordinator = RegistrationCoordinator::new(app.app_data.clone());
    let ctx = RequestContext::new();
    coordinator
        .register(&ctx, request("super_admin", "bru4j", "dean@bru.edu"))
        .await
        .unwrap();

    let err = coordinator
        .register(&ctx, request("admin", "bru4j", "DEAN@bru.edu"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InternalError::Registration(RegistrationError::EmailAlreadyRegistered { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_weak_password_rejected_before_storage() {
    let app = setup_app_data().await;
    let coordinator = RegistrationCoordinator::new(app.app_data.clone());

    let err = coordinator
        .register(
            &RequestContext::new(),
            RegistrationRequest {
                password: "alllowercase".to_owned(),
                ..request("super_admin", "bru4j", "dean@bru.edu")
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        InternalError::Validation(ValidationError::WeakPassword(_))
    ));
    assert_no_registration_records(&app).await;
}

#[tokio::test]
async fn test_unknown_role_rejected() {
    let app = setup_app_data().await;
    let coordinator = RegistrationCoordinator::new(app.app_data.clone());

    let err = coordinator
        .register(&RequestContext::new(), request("janitor", "bru4j", "ana@bru.edu"))
        .await
        .unwrap_err();

    assert!(matches!(err, InternalError::Validation(ValidationError::UnknownRole(_))));
}

#[tokio::test]
async fn test_membership_failure_is_partial_failure_and_rolls_back() {
    let app = setup_app_data().await;
    let coordinator = RegistrationCoordinator::new(app.app_data.clone());
    let db = &app.app_data.connections.main;
    db.execute_unprepared("DROP TABLE approval_requests")
        .await
        .unwrap();

    let err = coordinator
        .register(&RequestContext::new(), request("super_admin", "bru4j", "dean@bru.edu"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PartialFailure);
    assert!(matches!(
        err,
        InternalError::Registration(RegistrationError::ProfileSetupFailed {
            stage: "approval request",
            ..
        })
    ));
    assert_eq!(account_count(&app).await, 0);
    assert!(profile::Entity::find().all(db).await.unwrap().is_empty());
    assert!(user_role::Entity::find().all(db).await.unwrap().is_empty());
}

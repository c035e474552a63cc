mod common;

use poem::http::StatusCode;
use poem::test::TestClient;
use serde_json::json;

use acadify_backend::api::build_routes;
use acadify_backend::coordinators::ApprovalCoordinator;
use acadify_backend::types::internal::context::RequestContext;

use common::{TEST_PASSWORD, setup_app_data};

fn registration(role: &str, email: &str) -> serde_json::Value {
    json!({
        "full_name": "Ana Lima",
        "email": email,
        "password": TEST_PASSWORD,
        "role": role,
        "institution_code": "BRU4J",
        "institution_name": "Bangalore Rural University",
    })
}

#[tokio::test]
async fn test_health_and_institution_lookup() {
    let (app_data, _emails) = setup_app_data().await;
    let cli = TestClient::new(build_routes(app_data, "http://localhost:3000"));

    let resp = cli.get("/api/health").send().await;
    resp.assert_status_is_ok();
    resp.json().await.value().object().get("status").assert_string("healthy");

    let resp = cli.get("/api/institutions/bru4j").send().await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let json = resp.json().await;
    let body = json.value().object();
    body.get("error").assert_string("invalid_institution_code");
    body.get("message").assert_string("Invalid institution code");
    body.get("status_code").assert_i64(404);

    cli.post("/api/auth/register")
        .body_json(&registration("super_admin", "dean@bru.edu"))
        .send()
        .await
        .assert_status_is_ok();

    let resp = cli.get("/api/institutions/BRU4J").send().await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("name").assert_string("Bangalore Rural University");
    body.get("institution_code").assert_string("bru4j");
}

#[tokio::test]
async fn test_registration_errors() {
    let (app_data, _emails) = setup_app_data().await;
    let cli = TestClient::new(build_routes(app_data, "http://localhost:3000"));

    cli.post("/api/auth/register")
        .body_json(&registration("super_admin", "dean@bru.edu"))
        .send()
        .await
        .assert_status_is_ok();

    let resp = cli
        .post("/api/auth/register")
        .body_json(&registration("student", "DEAN@bru.edu"))
        .send()
        .await;
    resp.assert_status(StatusCode::CONFLICT);
    resp.json()
        .await
        .value()
        .object()
        .get("error")
        .assert_string("email_already_registered");

    let mut weak = registration("student", "student@bru.edu");
    weak["password"] = json!("short");
    let resp = cli.post("/api/auth/register").body_json(&weak).send().await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.json()
        .await
        .value()
        .object()
        .get("error")
        .assert_string("weak_password");
}

#[tokio::test]
async fn test_register_verify_approve_and_sign_in() {
    let (app_data, emails) = setup_app_data().await;
    let cli = TestClient::new(build_routes(app_data.clone(), "http://localhost:3000"));

    // Register the institution's first admin and a student
    let resp = cli
        .post("/api/auth/register")
        .body_json(&registration("super_admin", "dean@bru.edu"))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    body.get("success").assert_bool(true);
    body.get("approval_status").assert_string("pending");
    let dean_id = body.get("user_id").string().to_string();

    cli.post("/api/auth/register")
        .body_json(&registration("student", "student@bru.edu"))
        .send()
        .await
        .assert_status_is_ok();

    // Verify the dean's email
    let resp = cli
        .post("/api/otp/send-otp")
        .body_json(&json!({"email": "dean@bru.edu", "type": "registration"}))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.json()
        .await
        .value()
        .object()
        .get("message")
        .assert_string("OTP sent successfully");

    let resp = cli
        .post("/api/otp/verify-otp")
        .body_json(&json!({"user_id": dean_id, "otp": "12345", "type": "registration"}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = cli
        .post("/api/otp/verify-otp")
        .body_json(&json!({
            "user_id": dean_id,
            "otp": emails.last_code(),
            "type": "registration",
        }))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.json()
        .await
        .value()
        .object()
        .get("message")
        .assert_string("OTP verified successfully");

    // Pending accounts sign in but get no application user
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({"email": "dean@bru.edu", "password": TEST_PASSWORD}))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let session = json.value().object().get("session").object();
    session.get("user").assert_null();
    session.get("approval_status").assert_string("pending");

    // An operator approves the dean
    let cli_ctx = RequestContext::for_cli("approvals_approve");
    let approvals = ApprovalCoordinator::new(app_data.clone());
    let pending = approvals
        .list_pending_for_institution(&cli_ctx, "bru4j", None)
        .await
        .unwrap();
    let dean_request = pending
        .iter()
        .find(|item| item.request.user_id == dean_id)
        .unwrap();
    approvals
        .approve(&cli_ctx, &dean_request.request.id, &dean_id)
        .await
        .unwrap();

    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({"email": "dean@bru.edu", "password": TEST_PASSWORD}))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let body = json.value().object();
    let dean_token = body.get("access_token").string().to_string();
    let user = body.get("session").object().get("user").object();
    user.get("role").assert_string("SuperAdmin");
    user.get("is_verified").assert_bool(true);

    // The dean reviews the student's request
    cli.get("/api/approvals/pending")
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let resp = cli
        .get("/api/approvals/pending")
        .header("Authorization", format!("Bearer {}", dean_token))
        .query("role", &"student")
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let requests = json.value().object().get("requests").object_array();
    assert_eq!(requests.len(), 1);
    requests[0].get("email").assert_string("student@bru.edu");
    let request_id = requests[0].get("request_id").string().to_string();
    let student_id = requests[0].get("user_id").string().to_string();

    let resp = cli
        .post(format!("/api/approvals/{}/reject", request_id))
        .header("Authorization", format!("Bearer {}", dean_token))
        .body_json(&json!({"user_id": student_id, "remarks": "  "}))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.json()
        .await
        .value()
        .object()
        .get("error")
        .assert_string("remarks_required");

    let resp = cli
        .post(format!("/api/approvals/{}/approve", request_id))
        .header("Authorization", format!("Bearer {}", dean_token))
        .body_json(&json!({"user_id": student_id}))
        .send()
        .await;
    resp.assert_status_is_ok();
    resp.json()
        .await
        .value()
        .object()
        .get("status")
        .assert_string("approved");

    let resp = cli
        .post(format!("/api/approvals/{}/approve", request_id))
        .header("Authorization", format!("Bearer {}", dean_token))
        .body_json(&json!({"user_id": student_id}))
        .send()
        .await;
    resp.assert_status(StatusCode::CONFLICT);

    // The student now resolves to an application user but cannot review
    let resp = cli
        .post("/api/auth/login")
        .body_json(&json!({"email": "student@bru.edu", "password": TEST_PASSWORD}))
        .send()
        .await;
    resp.assert_status_is_ok();
    let student_token = resp
        .json()
        .await
        .value()
        .object()
        .get("access_token")
        .string()
        .to_string();

    let resp = cli
        .get("/api/auth/session")
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let session = json.value().object();
    session.get("approval_status").assert_string("approved");
    session.get("user").object().get("role").assert_string("Student");

    cli.get("/api/approvals/pending")
        .header("Authorization", format!("Bearer {}", student_token))
        .send()
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_session_without_token_is_empty() {
    let (app_data, _emails) = setup_app_data().await;
    let cli = TestClient::new(build_routes(app_data, "http://localhost:3000"));

    let resp = cli.get("/api/auth/session").send().await;
    resp.assert_status_is_ok();
    let json = resp.json().await;
    let session = json.value().object();
    session.get("user").assert_null();
    session.get("approval_status").assert_null();

    cli.get("/api/auth/session")
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_by_email_only() {
    let (app_data, emails) = setup_app_data().await;
    let cli = TestClient::new(build_routes(app_data, "http://localhost:3000"));

    cli.post("/api/auth/register")
        .body_json(&registration("super_admin", "dean@bru.edu"))
        .send()
        .await
        .assert_status_is_ok();

    cli.post("/api/otp/send-otp")
        .body_json(&json!({"email": "dean@bru.edu", "type": "password_reset"}))
        .send()
        .await
        .assert_status_is_ok();
    assert_eq!(emails.sent()[0].subject, "Reset your Acadify password");
    let code = emails.last_code();
    let wrong = if code == "123456" { "654321" } else { "123456" };

    let resp = cli
        .post("/api/otp/reset-password")
        .body_json(&json!({
            "email": "dean@bru.edu",
            "otp": wrong,
            "new_password": "Brand-New-Pass-99",
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    resp.json()
        .await
        .value()
        .object()
        .get("error")
        .assert_string("otp_mismatch");

    cli.post("/api/otp/reset-password")
        .body_json(&json!({
            "email": "Dean@BRU.edu",
            "otp": code,
            "new_password": "Brand-New-Pass-99",
        }))
        .send()
        .await
        .assert_status_is_ok();

    cli.post("/api/auth/login")
        .body_json(&json!({"email": "dean@bru.edu", "password": TEST_PASSWORD}))
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    cli.post("/api/auth/login")
        .body_json(&json!({"email": "dean@bru.edu", "password": "Brand-New-Pass-99"}))
        .send()
        .await
        .assert_status_is_ok();

    cli.post("/api/otp/reset-password")
        .body_json(&json!({
            "email": "nobody@bru.edu",
            "otp": "123456",
            "new_password": "Brand-New-Pass-99",
        }))
        .send()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

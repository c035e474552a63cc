use std::sync::Arc;
use std::time::Duration;

use poem::Request;
use poem_openapi::auth::Bearer;

use super::helpers::{create_request_context, optional_bearer};
use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::providers::TokenProvider;
use crate::test::utils::{MutableClock, TEST_EPOCH_MS, test_secrets};

fn token_provider() -> (Arc<MutableClock>, TokenProvider) {
    let clock = Arc::new(MutableClock::at_epoch_ms(TEST_EPOCH_MS));
    let provider = TokenProvider::new(test_secrets(), 15, clock.clone());
    (clock, provider)
}

#[test]
fn test_optional_bearer_reads_header() {
    let req = Request::builder()
        .header("Authorization", "Bearer abc.def.ghi")
        .finish();
    assert_eq!(optional_bearer(&req).map(|b| b.token), Some("abc.def.ghi".to_string()));

    let req = Request::builder().header("Authorization", "Basic Zm9v").finish();
    assert!(optional_bearer(&req).is_none());

    assert!(optional_bearer(&Request::builder().finish()).is_none());
}

#[test]
fn test_context_without_token_is_anonymous() {
    let (_clock, provider) = token_provider();
    let req = Request::builder()
        .header("X-Forwarded-For", "192.168.1.1, 10.0.0.1")
        .finish();

    let ctx = create_request_context(&req, None, &provider).unwrap();
    assert!(!ctx.authenticated);
    assert_eq!(ctx.session_user_id(), None);
    assert_eq!(ctx.ip_address, Some("192.168.1.1".parse().unwrap()));
}

#[test]
fn test_context_with_valid_token_carries_claims() {
    let (_clock, provider) = token_provider();
    let (token, claims) = provider.generate_jwt("user-1").unwrap();

    let ctx = create_request_context(&Request::builder().finish(), Some(Bearer { token }), &provider)
        .unwrap();
    assert!(ctx.authenticated);
    assert_eq!(ctx.actor_id, "user-1");
    assert_eq!(ctx.claims, Some(claims));
}

#[test]
fn test_context_rejects_bad_or_expired_token() {
    let (clock, provider) = token_provider();
    let req = Request::builder().finish();

    let err = create_request_context(
        &req,
        Some(Bearer {
            token: "not-a-jwt".to_string(),
        }),
        &provider,
    )
    .unwrap_err();
    assert!(matches!(err, InternalError::Credential(CredentialError::InvalidToken { .. })));

    let (token, _) = provider.generate_jwt("user-1").unwrap();
    clock.advance(Duration::from_secs(16 * 60));
    let err = create_request_context(&req, Some(Bearer { token }), &provider).unwrap_err();
    assert!(matches!(err, InternalError::Credential(CredentialError::ExpiredToken)));
}

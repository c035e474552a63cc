use poem::Request;
use poem_openapi::auth::Bearer;

use crate::errors::InternalError;
use crate::providers::TokenProvider;
use crate::types::internal::context::RequestContext;

/// Bearer token from the Authorization header, when there is one
///
/// poem-openapi has no optional security scheme, so endpoints that also serve
/// anonymous callers read the header themselves.
pub fn optional_bearer(req: &Request) -> Option<Bearer> {
    req.header("Authorization")
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| Bearer {
            token: token.trim().to_string(),
        })
}

/// Build the context for an API call
///
/// A missing token yields an anonymous context. A token that is present but
/// invalid or expired is an error rather than silently anonymous.
pub fn create_request_context(
    req: &Request,
    auth: Option<Bearer>,
    token_provider: &TokenProvider,
) -> Result<RequestContext, InternalError> {
    let ctx = RequestContext::from_request(req);

    match auth {
        Some(bearer) => {
            let claims = token_provider.validate_jwt(&bearer.token).inspect_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
            })?;
            Ok(ctx.with_auth(claims))
        }
        None => Ok(ctx),
    }
}

//! Middleware for resolving the caller's identity on every request.
//!
//! The gate never rejects a request for lacking credentials. It attaches an
//! `AuthContext` to the request extensions and only short-circuits when a
//! revoked token is presented. Handlers that need a caller use the
//! `RequireIdentity` extractor.

use crate::api::common::ApiError;
use crate::auth::models::{AuthContext, Identity};
use crate::errors::ServiceError;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication gate middleware
pub async fn authentication_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if state.config.public_paths.is_public(request.uri().path()) {
        request.extensions_mut().insert(AuthContext::Anonymous);
        return next.run(request).await;
    }

    let token = bearer_token(request.headers()).map(str::to_owned);
    let context = match state.auth_service().authenticate(token.as_deref()).await {
        Ok(context) => context,
        Err(error) => return ApiError(error).into_response(),
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

/// Extractor for handlers that need an authenticated caller.
///
/// Rejects with 401 "Authentication required" when the gate left the request
/// anonymous.
#[derive(Debug, Clone)]
pub struct RequireIdentity(pub Identity);

impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthContext>() {
            Some(AuthContext::Authenticated(identity)) => Ok(RequireIdentity(identity.clone())),
            _ => Err(ApiError(ServiceError::Unauthenticated)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}

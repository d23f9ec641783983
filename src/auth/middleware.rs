// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication gate middleware for Axum.
//!
//! The gate runs in front of every handler of the router it is layered on:
//!
//! 1. Exempt paths (exact match) pass through untouched
//! 2. Otherwise the configured [`Authenticator`] produces [`Claims`] or an
//!    [`AuthError`]
//! 3. Claims are inserted into the request extensions and the handler runs;
//!    any error ends the request with an empty `401`
//!
//! ## Usage
//!
//! ```rust,ignore
//! let gate = AuthGate::builder()
//!     .ignore_path("/users/signup")
//!     .ignore_path("/users/login")
//!     .build(JwtAuthenticator::new(codec));
//!
//! let app = Router::new()
//!     .route("/users/profile", get(profile))
//!     .layer(axum::middleware::from_fn_with_state(
//!         gate,
//!         auth_gate::<JwtAuthenticator>,
//!     ));
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::codec::TokenCodec;
use super::exempt::ExemptPaths;
use super::{AuthError, Claims};

/// A way of turning request headers into a verified identity.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(
        &self,
        headers: &HeaderMap,
    ) -> impl Future<Output = Result<Claims, AuthError>> + Send;
}

/// Split an Authorization header value into `<scheme> <token>`.
///
/// The value must split on single spaces into exactly two parts, so leading,
/// trailing or doubled spaces are rejected. The scheme word itself is not
/// inspected.
pub fn split_credential(header_value: &str) -> Result<(&str, &str), AuthError> {
    let mut parts = header_value.split(' ');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if !scheme.is_empty() && !token.is_empty() => {
            Ok((scheme, token))
        }
        _ => Err(AuthError::MalformedCredential),
    }
}

/// Authenticates requests by bearer token.
#[derive(Clone)]
pub struct JwtAuthenticator {
    codec: Arc<TokenCodec>,
}

impl JwtAuthenticator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    fn verify_headers(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingCredential)?;

        if header.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let value = header
            .to_str()
            .map_err(|_| AuthError::MalformedCredential)?;

        let (_scheme, token) = split_credential(value)?;

        Ok(self.codec.verify(token)?)
    }
}

impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        self.verify_headers(headers)
    }
}

/// Mutable configuration phase of the gate.
#[derive(Debug, Default)]
pub struct AuthGateBuilder {
    exempt: ExemptPaths,
}

impl AuthGateBuilder {
    /// Let requests to exactly `path` through without a credential.
    pub fn ignore_path(mut self, path: impl Into<String>) -> Self {
        self.exempt = self.exempt.add(path);
        self
    }

    pub fn ignore_paths<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        paths.into_iter().fold(self, Self::ignore_path)
    }

    /// Freeze the configuration into a gate.
    pub fn build<A: Authenticator>(self, authenticator: A) -> AuthGate<A> {
        AuthGate {
            exempt: Arc::new(self.exempt),
            authenticator: Arc::new(authenticator),
        }
    }
}

/// Immutable, shareable auth gate. Used as middleware state.
pub struct AuthGate<A> {
    exempt: Arc<ExemptPaths>,
    authenticator: Arc<A>,
}

impl AuthGate<()> {
    pub fn builder() -> AuthGateBuilder {
        AuthGateBuilder::default()
    }
}

impl<A: Authenticator> AuthGate<A> {
    pub fn exempt_paths(&self) -> &ExemptPaths {
        &self.exempt
    }

    /// Decide a request: `Ok(None)` when exempt, `Ok(Some(claims))` when
    /// authenticated.
    pub async fn check(&self, path: &str, headers: &HeaderMap) -> Result<Option<Claims>, AuthError> {
        if self.exempt.contains(path) {
            return Ok(None);
        }

        self.authenticator.authenticate(headers).await.map(Some)
    }
}

impl<A> Clone for AuthGate<A> {
    fn clone(&self) -> Self {
        Self {
            exempt: Arc::clone(&self.exempt),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

/// Authentication gate middleware function.
pub async fn auth_gate<A: Authenticator>(
    State(gate): State<AuthGate<A>>,
    mut request: Request,
    next: Next,
) -> Response {
    let decision = {
        let path = request.uri().path();
        let headers = request.headers();
        gate.check(path, headers).await
    };

    match decision {
        Ok(None) => next.run(request).await,
        Ok(Some(claims)) => {
            tracing::debug!(user_id = claims.user_id, "request authenticated");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            match &e {
                AuthError::SessionStore(reason) => tracing::warn!(
                    path = %request.uri().path(),
                    %reason,
                    "session lookup failed, rejecting request"
                ),
                _ => tracing::debug!(
                    path = %request.uri().path(),
                    error_code = e.error_code(),
                    "request rejected by auth gate"
                ),
            }
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenError;
    use axum::{
        body::{to_bytes, Body},
        http::{Request as HttpRequest, StatusCode},
        routing::get,
        Extension, Router,
    };
    use chrono::Duration;
    use tower::ServiceExt;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new("AllYourBase").unwrap())
    }

    async fn whoami(claims: Option<Extension<Claims>>) -> String {
        match claims {
            Some(Extension(claims)) => format!("user:{}", claims.user_id),
            None => "anonymous".to_string(),
        }
    }

    fn app(codec: Arc<TokenCodec>) -> Router {
        let gate = AuthGate::builder()
            .ignore_path("/users/signup")
            .ignore_path("/users/login")
            .build(JwtAuthenticator::new(codec));

        Router::new()
            .route("/users/login", get(whoami))
            .route("/users/signup", get(whoami))
            .route("/users/profile", get(whoami))
            .layer(axum::middleware::from_fn_with_state(
                gate,
                auth_gate::<JwtAuthenticator>,
            ))
    }

    async fn send(app: Router, path: &str, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = HttpRequest::builder().uri(path);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn split_credential_requires_two_parts() {
        assert_eq!(split_credential("Bearer abc"), Ok(("Bearer", "abc")));
        assert_eq!(split_credential("Bearer  abc"), Err(AuthError::MalformedCredential));
        assert_eq!(split_credential(" Bearer abc"), Err(AuthError::MalformedCredential));
        assert_eq!(split_credential("Bearer abc "), Err(AuthError::MalformedCredential));
        assert_eq!(split_credential("Bearer\tabc"), Err(AuthError::MalformedCredential));
        assert_eq!(split_credential("Bearer "), Err(AuthError::MalformedCredential));
        assert_eq!(split_credential("Token abc"), Ok(("Token", "abc")));
        assert_eq!(split_credential("abc"), Err(AuthError::MalformedCredential));
        assert_eq!(split_credential("Bearer a b"), Err(AuthError::MalformedCredential));
        assert_eq!(split_credential(""), Err(AuthError::MalformedCredential));
    }

    #[tokio::test]
    async fn valid_token_attaches_claims() {
        let codec = codec();
        let token = codec.issue(42, Duration::hours(2)).unwrap();

        let (status, body) = send(app(codec), "/users/profile", Some(&format!("Bearer {token}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "user:42");
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let (status, body) = send(app(codec()), "/users/profile", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn malformed_token_is_rejected_without_claims() {
        let (status, body) = send(app(codec()), "/users/profile", Some("Bearer not.a.token")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn wrong_shape_header_is_rejected() {
        let codec = codec();
        let token = codec.issue(42, Duration::hours(2)).unwrap();

        let (status, _) = send(app(codec.clone()), "/users/profile", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            app(codec),
            "/users/profile",
            Some(&format!("Bearer {token} extra")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn zero_identity_token_is_rejected() {
        let codec = codec();
        let token = codec.issue(0, Duration::hours(2)).unwrap();

        let (status, _) = send(app(codec), "/users/profile", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn exempt_path_skips_checks() {
        let (status, body) = send(app(codec()), "/users/login", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");

        let (status, body) = send(app(codec()), "/users/signup", Some("Bearer garbage")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn exempt_path_does_not_attach_claims_even_with_valid_token() {
        let codec = codec();
        let token = codec.issue(42, Duration::hours(2)).unwrap();

        let (status, body) = send(app(codec), "/users/login", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn check_reports_codec_errors() {
        let issuer = TokenCodec::new("SomeOtherSecret").unwrap();
        let token = issuer.issue(42, Duration::hours(2)).unwrap();

        let gate = AuthGate::builder().build(JwtAuthenticator::new(codec()));
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());

        let result = gate.check("/users/profile", &headers).await;
        assert_eq!(result, Err(AuthError::InvalidToken(TokenError::InvalidSignature)));
    }

    #[test]
    fn builder_accumulates_paths() {
        let gate = AuthGate::builder()
            .ignore_paths(["/a", "/b"])
            .ignore_path("/c")
            .build(JwtAuthenticator::new(codec()));

        assert_eq!(gate.exempt_paths().iter().collect::<Vec<_>>(), ["/a", "/b", "/c"]);
    }
}

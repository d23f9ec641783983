// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the identity attached by the auth gate.
//!
//! ```rust,ignore
//! async fn profile(CurrentUser(claims): CurrentUser) -> impl IntoResponse {
//!     // claims.user_id is the verified caller
//! }
//! ```

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};

use super::{AuthError, Claims};

/// Claims of the authenticated caller.
///
/// Only the auth gate puts claims into the request extensions, so a handler
/// behind the gate always gets them. A handler reached without the gate
/// (for example an exempt path) is rejected with `401`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::MissingCredential)
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for CurrentUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Claims>().cloned().map(CurrentUser))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts() -> Parts {
        Request::builder().uri("/test").body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn reads_claims_from_extensions() {
        let mut parts = parts();
        parts.extensions.insert(Claims {
            user_id: 42,
            exp: 9_999_999_999,
            iat: 0,
        });

        let CurrentUser(claims) = <CurrentUser as FromRequestParts<()>>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(claims.user_id, 42);
    }

    #[tokio::test]
    async fn rejects_without_claims() {
        let mut parts = parts();

        let result = <CurrentUser as FromRequestParts<()>>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }

    #[tokio::test]
    async fn optional_returns_none_without_claims() {
        let mut parts = parts();

        let result =
            <CurrentUser as OptionalFromRequestParts<()>>::from_request_parts(&mut parts, &())
                .await
                .unwrap();
        assert!(result.is_none());
    }
}

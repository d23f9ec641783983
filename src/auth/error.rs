// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::codec::TokenError;

/// Reasons the auth gate rejects a request.
///
/// Callers never see which one occurred: every variant renders as a bare
/// `401 Unauthorized` with an empty body. The distinction exists for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No credential (Authorization header or session cookie) present
    #[error("credential is missing")]
    MissingCredential,
    /// Authorization header is not of the form `<scheme> <token>`
    #[error("credential is malformed (expected '<scheme> <token>')")]
    MalformedCredential,
    /// Token failed verification
    #[error(transparent)]
    InvalidToken(#[from] TokenError),
    /// Session ID does not resolve in the session store
    #[error("session not found")]
    SessionNotFound,
    /// Session store lookup failed
    #[error("session store error: {0}")]
    SessionStore(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedCredential => "malformed_credential",
            AuthError::InvalidToken(e) => e.error_code(),
            AuthError::SessionNotFound => "session_not_found",
            AuthError::SessionStore(_) => "session_store_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.status_code().into_response()
    }
}

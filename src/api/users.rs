// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.
//!
//! Signup and both login routes are exempt from the auth gate by default;
//! profile routes read the caller from [`CurrentUser`].

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use chrono::{Datelike, NaiveDate};
use tracing::info;

use crate::auth::session::{new_session_id, session_cookie};
use crate::auth::{CurrentUser, Session, SessionStore};
use crate::error::ApiError;
use crate::models::{
    EditProfileRequest, LoginRequest, LoginResponse, SessionLoginResponse, SignUpRequest,
    SignUpResponse, UserProfile,
};
use crate::state::AppState;

/// Response header that mirrors the issued token.
pub const X_JWT_TOKEN: &str = "x-jwt-token";

/// Longest accepted nickname, in characters.
pub const MAX_NICKNAME_CHARS: usize = 20;

/// Longest accepted self-description, in characters.
pub const MAX_DESCRIBE_CHARS: usize = 100;

/// Validate a profile edit before it reaches the store.
fn validate_profile_edit(request: &EditProfileRequest) -> Result<(), ApiError> {
    if request.nick_name.chars().count() > MAX_NICKNAME_CHARS {
        return Err(ApiError::bad_request(
            "nickname must be at most 20 characters",
        ));
    }
    if request.describe.chars().count() > MAX_DESCRIBE_CHARS {
        return Err(ApiError::bad_request(
            "describe must be at most 100 characters",
        ));
    }
    if !is_valid_birthday(&request.birth_day) {
        return Err(ApiError::bad_request("birthday must be a YYYY-MM-DD date"));
    }
    Ok(())
}

/// Zero-padded `YYYY-MM-DD` in the years 1900 through 2099.
fn is_valid_birthday(value: &str) -> bool {
    if value.len() != 10 || !value.is_ascii() {
        return false;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| (1900..=2099).contains(&date.year()))
        .unwrap_or(false)
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/users/signup",
    tag = "Users",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User created", body = SignUpResponse),
        (status = 400, description = "Passwords do not match"),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    if request.password != request.confirm_password {
        return Err(ApiError::bad_request("passwords do not match"));
    }

    let id = state
        .users
        .write()
        .await
        .sign_up(&request.email, &request.password)?;

    info!(user_id = id, "user signed up");
    Ok((StatusCode::CREATED, Json(SignUpResponse { id })))
}

/// Log in and receive a bearer token.
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid email or password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = state
        .users
        .read()
        .await
        .verify_credentials(&request.email, &request.password)?;

    let ttl = state.auth.token_ttl;
    let token = state.codec.issue(user_id, ttl)?;

    info!(user_id, "issued token");
    Ok((
        [(X_JWT_TOKEN, token.clone())],
        Json(LoginResponse {
            token,
            expires_in: ttl.num_seconds(),
        }),
    ))
}

/// Log in with a server-side session (legacy).
#[utoipa::path(
    post,
    path = "/users/login/session",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session created; ID set in cookie", body = SessionLoginResponse),
        (status = 401, description = "Invalid email or password"),
    )
)]
pub async fn login_session(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = state
        .users
        .read()
        .await
        .verify_credentials(&request.email, &request.password)?;

    let ttl = state.auth.session_ttl;
    let session = Session::new(user_id, state.clock.now(), ttl)
        .ok_or_else(|| ApiError::internal("failed to create session"))?;
    let expires_at = session.expires_at;
    let session_id = new_session_id();

    state
        .sessions
        .put(session_id.clone(), session)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to store session");
            ApiError::internal("failed to create session")
        })?;

    info!(user_id, "created session");
    Ok((
        AppendHeaders([(
            SET_COOKIE,
            session_cookie(&state.auth.session_cookie, &session_id, ttl),
        )]),
        Json(SessionLoginResponse {
            user_id,
            expires_at,
        }),
    ))
}

/// Get the authenticated caller's profile.
#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = UserProfile),
        (status = 401, description = "Unauthorized - invalid or missing credential"),
        (status = 404, description = "User no longer exists"),
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state.users.read().await.profile(claims.user_id)?;
    Ok(Json(profile))
}

/// Update the authenticated caller's profile.
#[utoipa::path(
    post,
    path = "/users/edit",
    tag = "Users",
    security(("bearer" = [])),
    request_body = EditProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Nickname, describe or birthday rejected"),
        (status = 401, description = "Unauthorized - invalid or missing credential"),
        (status = 404, description = "User no longer exists"),
    )
)]
pub async fn edit(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(request): Json<EditProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    validate_profile_edit(&request)?;

    let profile = state
        .users
        .write()
        .await
        .edit_profile(claims.user_id, request)?;

    info!(user_id = claims.user_id, "profile updated");
    Ok(Json(profile))
}

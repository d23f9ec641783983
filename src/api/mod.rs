// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        request::Parts,
        HeaderName, HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        auth_gate, AuthGate, InMemorySessionStore, JwtAuthenticator, SessionAuthenticator,
    },
    config::AuthMode,
    models::{
        EditProfileRequest, LoginRequest, LoginResponse, SessionLoginResponse, SignUpRequest,
        SignUpResponse, UserProfile,
    },
    state::AppState,
};

pub mod health;
pub mod users;

/// CORS preflight cache lifetime.
const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Build the application router.
///
/// User routes sit behind the auth gate selected by `state.auth.mode`;
/// health and API docs do not.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let user_routes = Router::new()
        .route("/users/signup", post(users::sign_up))
        .route("/users/login", post(users::login))
        .route("/users/login/session", post(users::login_session))
        .route("/users/profile", get(users::profile))
        .route("/users/edit", post(users::edit));

    let gate = AuthGate::builder().ignore_paths(state.auth.exempt_paths.iter().cloned());

    let user_routes = match state.auth.mode {
        AuthMode::Jwt => {
            let gate = gate.build(JwtAuthenticator::new(state.codec.clone()));
            user_routes.layer(from_fn_with_state(gate, auth_gate::<JwtAuthenticator>))
        }
        AuthMode::Session => {
            let gate = gate.build(SessionAuthenticator::new(
                state.sessions.clone(),
                state.auth.session_cookie.clone(),
                state.clock.clone(),
            ));
            user_routes.layer(from_fn_with_state(
                gate,
                auth_gate::<SessionAuthenticator<InMemorySessionStore>>,
            ))
        }
    };

    Router::new()
        .route("/health", get(health::health))
        .merge(user_routes.with_state(state))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Credentialed CORS for local development origins plus configured extras.
fn cors_layer(extra_origins: &[String]) -> CorsLayer {
    let extra_origins = extra_origins.to_vec();

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(users::X_JWT_TOKEN)])
        .allow_credentials(true)
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _: &Parts| {
                origin.to_str().is_ok_and(|origin| {
                    origin.starts_with("http://localhost")
                        || extra_origins.iter().any(|allowed| allowed == origin)
                })
            },
        ))
        .max_age(CORS_MAX_AGE)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::sign_up,
        users::login,
        users::login_session,
        users::profile,
        users::edit
    ),
    components(
        schemas(
            health::HealthResponse,
            SignUpRequest,
            SignUpResponse,
            LoginRequest,
            LoginResponse,
            SessionLoginResponse,
            EditProfileRequest,
            UserProfile
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Users", description = "Signup, login and profile")
    )
)]
struct ApiDoc;

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Request authentication for the Webook API.
//!
//! ## Auth Flow
//!
//! 1. `POST /users/login` verifies credentials and returns an HS256 JWT
//! 2. Client sends `Authorization: Bearer <token>` on later requests
//! 3. The auth gate:
//!    - Lets exempt paths (exact match) through untouched
//!    - Verifies signature and expiry, rejects a zero user ID
//!    - Attaches [`Claims`] to the request extensions
//!
//! Any failure ends the request with an empty `401`. The gate only decides
//! *who* is calling; it does not scope permissions.
//!
//! ## Legacy Sessions
//!
//! [`SessionAuthenticator`] resolves a session cookie against a
//! [`SessionStore`] instead of verifying a token. Both implement
//! [`Authenticator`], so either plugs into the same [`AuthGate`].

pub mod claims;
pub mod clock;
pub mod codec;
pub mod error;
pub mod exempt;
pub mod extractor;
pub mod middleware;
pub mod session;

pub use claims::Claims;
pub use clock::{Clock, SystemClock};
pub use codec::{TokenCodec, TokenError};
pub use error::AuthError;
pub use exempt::ExemptPaths;
pub use extractor::CurrentUser;
pub use middleware::{auth_gate, AuthGate, AuthGateBuilder, Authenticator, JwtAuthenticator};
pub use session::{InMemorySessionStore, Session, SessionAuthenticator, SessionStore};

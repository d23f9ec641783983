// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Webook - user service with a request-authentication gate
//!
//! Every request to a non-exempt route is authenticated before it reaches a
//! handler: by HS256 bearer token, or by legacy session cookie. The verified
//! identity is attached to the request for handlers to read.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Token codec, auth gate, exemptions, legacy sessions
//! - `config` - Environment configuration
//! - `store` - In-memory user store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;

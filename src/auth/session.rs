// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Legacy session-cookie authentication.
//!
//! Before stateless tokens, a login created a server-side session and the
//! client carried its ID in a cookie. This module keeps that path working
//! behind the same [`Authenticator`] contract as the JWT gate:
//!
//! 1. Read the session ID from the configured cookie
//! 2. Resolve it in a [`SessionStore`]
//! 3. Reject unknown, expired or identity-less sessions
//!
//! The store is the one piece of shared mutable state in the auth path. The
//! gate never holds a lock of its own while waiting on it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::http::{header::COOKIE, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::clock::Clock;
use super::codec::TokenError;
use super::middleware::Authenticator;
use super::{AuthError, Claims};

/// Default cookie carrying the session ID.
pub const DEFAULT_SESSION_COOKIE: &str = "webook_session";

/// Server-side session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// `None` if `now + ttl` falls outside the representable range.
    pub fn new(user_id: i64, now: DateTime<Utc>, ttl: Duration) -> Option<Self> {
        Some(Self {
            user_id,
            created_at: now,
            expires_at: now.checked_add_signed(ttl)?,
        })
    }

    fn into_claims(self) -> Claims {
        Claims::new(self.user_id, self.created_at, self.expires_at)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store of sessions keyed by session ID.
///
/// Writes are last-writer-wins; no ordering between concurrent requests is
/// guaranteed.
pub trait SessionStore: Send + Sync + 'static {
    fn get(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Option<Session>, SessionStoreError>> + Send;

    fn put(
        &self,
        session_id: String,
        session: Session,
    ) -> impl Future<Output = Result<(), SessionStoreError>> + Send;

    fn remove(&self, session_id: &str) -> impl Future<Output = Result<(), SessionStoreError>> + Send;
}

/// Process-local session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every session that expired at or before `now`.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }
}

impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn put(&self, session_id: String, session: Session) -> Result<(), SessionStoreError> {
        self.sessions.write().await.insert(session_id, session);
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<(), SessionStoreError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}

/// Generate a fresh, unguessable session ID.
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Find the value of `cookie_name` in a `Cookie` header value.
pub fn cookie_value<'a>(cookie_header: &'a str, cookie_name: &str) -> Option<&'a str> {
    cookie_header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name.trim() == cookie_name {
            Some(value.trim())
        } else {
            None
        }
    })
}

/// Build the `Set-Cookie` value that hands a session ID to the client.
pub fn session_cookie(cookie_name: &str, session_id: &str, ttl: Duration) -> String {
    format!(
        "{cookie_name}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.num_seconds()
    )
}

/// Authenticates requests by session cookie.
pub struct SessionAuthenticator<S> {
    store: S,
    cookie_name: String,
    clock: Arc<dyn Clock>,
}

impl<S: SessionStore> SessionAuthenticator<S> {
    pub fn new(store: S, cookie_name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            cookie_name: cookie_name.into(),
            clock,
        }
    }

    fn session_id<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|value| cookie_value(value, &self.cookie_name))
            .filter(|id| !id.is_empty())
    }
}

impl<S: SessionStore> Authenticator for SessionAuthenticator<S> {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let session_id = self
            .session_id(headers)
            .ok_or(AuthError::MissingCredential)?;

        let session = self
            .store
            .get(session_id)
            .await
            .map_err(|e| AuthError::SessionStore(e.to_string()))?
            .ok_or(AuthError::SessionNotFound)?;

        if session.expires_at <= self.clock.now() {
            return Err(TokenError::Expired.into());
        }

        if session.user_id == 0 {
            return Err(TokenError::EmptyIdentity.into());
        }

        Ok(session.into_claims())
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{Clock, InMemorySessionStore, SystemClock, TokenCodec};
use crate::config::{AuthSettings, ConfigError};
use crate::store::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<RwLock<UserStore>>,
    pub codec: Arc<TokenCodec>,
    pub sessions: InMemorySessionStore,
    pub clock: Arc<dyn Clock>,
    pub auth: Arc<AuthSettings>,
}

impl AppState {
    pub fn new(auth: AuthSettings) -> Result<Self, ConfigError> {
        Self::with_clock(auth, Arc::new(SystemClock))
    }

    /// Build state around an explicit time source.
    pub fn with_clock(auth: AuthSettings, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        let codec = TokenCodec::with_clock(&auth.jwt_secret, Arc::clone(&clock))?;

        Ok(Self {
            users: Arc::new(RwLock::new(UserStore::new())),
            codec: Arc::new(codec),
            sessions: InMemorySessionStore::new(),
            clock,
            auth: Arc::new(auth),
        })
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity claims carried by tokens and attached to requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Verified identity of the caller.
///
/// Built at login, signed into a token, and reconstructed on every request
/// by the auth gate. Handlers read it from the request extensions (see
/// [`CurrentUser`](super::CurrentUser)); it is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Authenticated user ID. Zero means "no identity".
    #[serde(rename = "uid")]
    pub user_id: i64,

    /// Expiration (Unix timestamp, seconds)
    pub exp: i64,

    /// Issued at (Unix timestamp, seconds)
    #[serde(default)]
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        }
    }

    /// A zero user ID never identifies anyone, even under a valid signature.
    pub fn has_identity(&self) -> bool {
        self.user_id != 0
    }

    /// Expiry must be strictly after `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

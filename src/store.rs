// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory user store.
//!
//! Backs the signup, login and profile endpoints. Emails are NFKC-normalized
//! and lowercased before they are used as keys, and passwords are kept only
//! as salted HMAC-SHA256 digests.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{EditProfileRequest, UserProfile};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone)]
struct User {
    id: i64,
    email: String,
    salt: String,
    password_digest: Vec<u8>,
    nick_name: String,
    birth_day: String,
    describe: String,
}

impl User {
    fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            nick_name: self.nick_name.clone(),
            birth_day: self.birth_day.clone(),
            describe: self.describe.clone(),
        }
    }
}

pub struct UserStore {
    users: HashMap<i64, User>,
    by_email: HashMap<String, i64>,
    next_id: i64,
}

impl Default for UserStore {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            by_email: HashMap::new(),
            // IDs start at 1; 0 is reserved for "no identity".
            next_id: 1,
        }
    }
}

/// Canonical form of an email used for lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

fn digest(salt: &str, password: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    mac
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Register a user, returning the new ID.
    pub fn sign_up(&mut self, email: &str, password: &str) -> Result<i64, ApiError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ApiError::bad_request("email is required"));
        }
        if self.by_email.contains_key(&email) {
            return Err(ApiError::conflict("email already registered"));
        }

        let id = self.next_id;
        self.next_id += 1;

        let salt = Uuid::new_v4().simple().to_string();
        let password_digest = digest(&salt, password).finalize().into_bytes().to_vec();

        self.by_email.insert(email.clone(), id);
        self.users.insert(
            id,
            User {
                id,
                email,
                salt,
                password_digest,
                nick_name: String::new(),
                birth_day: String::new(),
                describe: String::new(),
            },
        );

        Ok(id)
    }

    /// Check an email/password pair, returning the user ID on success.
    ///
    /// Unknown email and wrong password produce the same error.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<i64, ApiError> {
        let invalid = || ApiError::unauthorized("invalid email or password");

        let user = self
            .by_email
            .get(&normalize_email(email))
            .and_then(|id| self.users.get(id))
            .ok_or_else(invalid)?;

        digest(&user.salt, password)
            .verify_slice(&user.password_digest)
            .map_err(|_| invalid())?;

        Ok(user.id)
    }

    pub fn profile(&self, user_id: i64) -> Result<UserProfile, ApiError> {
        self.users
            .get(&user_id)
            .map(User::profile)
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub fn edit_profile(
        &mut self,
        user_id: i64,
        request: EditProfileRequest,
    ) -> Result<UserProfile, ApiError> {
        let user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        user.nick_name = request.nick_name;
        user.birth_day = request.birth_day;
        user.describe = request.describe;

        Ok(user.profile())
    }
}

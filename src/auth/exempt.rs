// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Paths that bypass authentication.

/// Ordered list of request paths the auth gate lets through unchecked.
///
/// Matching is exact string equality on the request path: `/users/login`
/// does not exempt `/users/login/` or `/users/login/extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExemptPaths {
    paths: Vec<String>,
}

impl ExemptPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a path.
    pub fn add(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed-in identity model.

use serde::{Deserialize, Serialize};

/// Identity of the signed-in user for the lifetime of one sign-in.
///
/// Holds no credentials: bearer tokens are always requested from the
/// identity provider at call time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

/// Current-user state as seen by views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The provider has not reported yet ("still checking").
    #[default]
    Unknown,
    /// Confirmed signed out.
    SignedOut,
    SignedIn(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::SignedIn(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SessionState::Unknown)
    }
}

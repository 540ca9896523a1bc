// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for calls against the bikes API.

use crate::services::identity::IdentityError;

/// Outcome classes of an authenticated API call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No session when one is required. A signed-in user should never see this.
    #[error("Authentication required")]
    Unauthenticated,

    /// HTTP 404: the resource is absent.
    #[error("Resource not found")]
    NotFound,

    /// Any other non-2xx response.
    #[error("Request failed with status {status}")]
    RequestFailed {
        status: u16,
        /// Server-supplied `{ "error": ... }` message, if any
        message: Option<String>,
    },

    /// Transport-level failure (connect, timeout, TLS...).
    #[error("Network error: {0}")]
    Network(String),

    /// 2xx response whose body did not match the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Message shown in a view's error banner.
    ///
    /// Server-supplied messages win; `fallback` covers failures without one.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ApiError::RequestFailed {
                message: Some(msg), ..
            } => msg.clone(),
            ApiError::RequestFailed { message: None, .. } => fallback.to_string(),
            ApiError::Unauthenticated => "You must be logged in.".to_string(),
            ApiError::NotFound => "Not found.".to_string(),
            ApiError::Network(msg) | ApiError::InvalidResponse(msg) => {
                if msg.is_empty() {
                    fallback.to_string()
                } else {
                    msg.clone()
                }
            }
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Transport(msg) => ApiError::Network(msg),
            IdentityError::NoSession
            | IdentityError::Rejected(_)
            | IdentityError::InvalidToken(_) => ApiError::Unauthenticated,
        }
    }
}

/// Result type alias for API calls
pub type Result<T> = std::result::Result<T, ApiError>;

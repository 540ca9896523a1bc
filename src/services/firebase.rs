// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Authentication over its REST API.
//!
//! Handles:
//! - Email/password sign-in (Identity Toolkit)
//! - Sign-in from a stored refresh token (Secure Token)
//! - ID token renewal shortly before expiry
//! - Session-change notifications for the watcher

use crate::config::Config;
use crate::models::Session;
use crate::services::identity::{
    lock, IdentityError, IdentityProvider, Listener, ListenerHandle, ListenerRegistry,
    SessionEvent,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Mutex;

/// Margin before ID token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Lifetime assumed when the provider omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// How to sign in.
#[derive(Debug, Clone)]
pub enum FirebaseCredentials {
    EmailPassword { email: String, password: String },
    RefreshToken(String),
}

/// Tokens held for the signed-in user.
struct Tokens {
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

struct SignedIn {
    session: Session,
    tokens: Tokens,
}

/// Firebase Authentication client.
pub struct FirebaseAuth {
    http: reqwest::Client,
    api_key: String,
    identity_toolkit_url: String,
    secure_token_url: String,
    state: Mutex<Option<SignedIn>>,
    registry: ListenerRegistry,
    /// Serializes token refreshes so concurrent callers share one round trip.
    refresh_lock: tokio::sync::Mutex<()>,
}

impl FirebaseAuth {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            api_key: config.firebase_api_key.clone(),
            identity_toolkit_url: config.identity_toolkit_url.clone(),
            secure_token_url: config.secure_token_url.clone(),
            state: Mutex::new(None),
            registry: ListenerRegistry::new(),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Current refresh token, e.g. to persist for the next run.
    pub fn refresh_token(&self) -> Option<String> {
        lock(&self.state)
            .as_ref()
            .map(|s| s.tokens.refresh_token.clone())
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Cached token if still comfortably valid, `None` if it needs a refresh.
    fn cached_token(&self, session: &Session) -> Result<Option<String>, IdentityError> {
        let state = lock(&self.state);
        let signed_in = current_for(&state, session)?;

        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);
        if Utc::now() + margin < signed_in.tokens.expires_at {
            return Ok(Some(signed_in.tokens.id_token.clone()));
        }
        Ok(None)
    }

    fn current_refresh_token(&self, session: &Session) -> Result<String, IdentityError> {
        let state = lock(&self.state);
        Ok(current_for(&state, session)?.tokens.refresh_token.clone())
    }

    /// Store renewed tokens, unless the user signed out meanwhile.
    fn store_refreshed(&self, session: &Session, grant: TokenGrant) -> Result<String, IdentityError> {
        let mut state = lock(&self.state);
        let signed_in = match state.as_mut() {
            Some(s) if s.session.uid == session.uid => s,
            _ => return Err(IdentityError::NoSession),
        };

        let id_token = grant.id_token.clone();
        signed_in.tokens = grant.into_tokens();
        self.registry
            .emit(&SessionEvent::TokenRefreshed(signed_in.session.clone()));
        Ok(id_token)
    }

    // ─── REST calls ──────────────────────────────────────────────────────────

    async fn password_sign_in(&self, email: &str, password: &str) -> Result<TokenGrant, IdentityError> {
        let url = format!("{}/accounts:signInWithPassword", self.identity_toolkit_url);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let body: PasswordSignInResponse = check_response_json(response).await?;
        Ok(TokenGrant {
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_in: body.expires_in,
        })
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, IdentityError> {
        let url = format!("{}/token", self.secure_token_url);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| IdentityError::Transport(format!("Token refresh request failed: {}", e)))?;

        let body: SecureTokenResponse = check_response_json(response).await?;
        Ok(TokenGrant {
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_in: body.expires_in,
        })
    }
}

fn current_for<'a>(
    state: &'a Option<SignedIn>,
    session: &Session,
) -> Result<&'a SignedIn, IdentityError> {
    match state {
        Some(s) if s.session.uid == session.uid => Ok(s),
        _ => Err(IdentityError::NoSession),
    }
}

impl IdentityProvider for FirebaseAuth {
    type Credentials = FirebaseCredentials;

    async fn sign_in(&self, credentials: FirebaseCredentials) -> Result<Session, IdentityError> {
        let grant = match credentials {
            FirebaseCredentials::EmailPassword { email, password } => {
                self.password_sign_in(&email, &password).await?
            }
            FirebaseCredentials::RefreshToken(token) => self.exchange_refresh_token(&token).await?,
        };

        let session = session_from_id_token(&grant.id_token)?;
        tracing::info!(uid = %session.uid, "Signed in");

        let mut state = lock(&self.state);
        *state = Some(SignedIn {
            session: session.clone(),
            tokens: grant.into_tokens(),
        });
        self.registry.emit(&SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let mut state = lock(&self.state);
        if let Some(previous) = state.take() {
            tracing::info!(uid = %previous.session.uid, "Signed out");
            self.registry.emit(&SessionEvent::SignedOut);
        }
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        lock(&self.state).as_ref().map(|s| s.session.clone())
    }

    fn on_session_change(&self, listener: Listener) -> ListenerHandle {
        let state = lock(&self.state);
        let initial = match state.as_ref() {
            Some(s) => SessionEvent::SignedIn(s.session.clone()),
            None => SessionEvent::SignedOut,
        };
        self.registry.register(listener, &initial)
    }

    /// Get a valid ID token for `session`.
    ///
    /// 1. Serve the cached token if it outlives the refresh margin
    /// 2. Otherwise take the refresh lock and re-check (another caller may have refreshed)
    /// 3. Exchange the refresh token and store the result
    async fn id_token(&self, session: &Session) -> Result<String, IdentityError> {
        if let Some(token) = self.cached_token(session)? {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;

        if let Some(token) = self.cached_token(session)? {
            return Ok(token);
        }

        tracing::debug!(uid = %session.uid, "ID token expiring, refreshing");
        let refresh_token = self.current_refresh_token(session)?;
        let grant = self.exchange_refresh_token(&refresh_token).await?;
        self.store_refreshed(session, grant)
    }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

struct TokenGrant {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

impl TokenGrant {
    fn into_tokens(self) -> Tokens {
        let lifetime = self
            .expires_in
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        Tokens {
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignInResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SecureTokenResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

/// Claims of a Firebase ID token that make up a [`Session`].
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Read the session identity out of an ID token.
///
/// The signature is not checked here; the API server verifies every token
/// it receives.
fn session_from_id_token(id_token: &str) -> Result<Session, IdentityError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<IdTokenClaims>(id_token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

    let claims = token_data.claims;
    Ok(Session {
        uid: claims.user_id.unwrap_or(claims.sub),
        display_name: claims.name,
        email: claims.email,
        photo_url: claims.picture,
    })
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, IdentityError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {}", status));

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), message = %message, "Identity provider error");
            return Err(IdentityError::Transport(message));
        }
        return Err(IdentityError::Rejected(message));
    }

    response
        .json()
        .await
        .map_err(|e| IdentityError::Transport(format!("JSON parse error: {}", e)))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bikes API client.
//!
//! Every call:
//! - fails fast with `Unauthenticated` when there is no session
//! - asks the identity provider for a bearer token (never reuses one)
//! - classifies the response (404, other non-2xx, transport, body)
//!
//! No retries and no caching: each call is a fresh round trip.

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::bike::{BikeEnvelope, BikeList};
use crate::models::profile::ProfileEnvelope;
use crate::models::{Bike, Profile, Session};
use crate::services::identity::IdentityProvider;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Authenticated client for the bikes API.
pub struct ApiClient<P> {
    http: reqwest::Client,
    base_url: String,
    identity: Arc<P>,
}

impl<P> Clone for ApiClient<P> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            identity: self.identity.clone(),
        }
    }
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

impl<P: IdentityProvider> ApiClient<P> {
    pub fn new(config: &Config, http: reqwest::Client, identity: Arc<P>) -> Self {
        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            identity,
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issue an authenticated request and return the classified response.
    async fn execute(
        &self,
        session: Option<&Session>,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let Some(session) = session else {
            tracing::warn!(path, "Authenticated request attempted without a session");
            return Err(ApiError::Unauthenticated);
        };

        // Fresh token per call; the provider decides whether it can reuse one.
        let token = self.identity.id_token(session).await?;

        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        tracing::debug!(%method, path, status = response.status().as_u16(), "API response");
        check_response(response).await
    }

    /// Authenticated request with a JSON response body.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        session: Option<&Session>,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        let response = self.execute(session, method, path, body).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON parse error: {}", e)))
    }

    /// `GET /api/bikes`. A body without `bikes` counts as an empty catalog.
    pub async fn list_bikes(&self, session: Option<&Session>) -> Result<Vec<Bike>> {
        let body: BikeList = self.fetch(session, Method::GET, "/api/bikes", None).await?;
        Ok(body.bikes.unwrap_or_default())
    }

    /// `GET /api/bikes/:id`. `None` when the bike does not exist.
    pub async fn get_bike(&self, session: Option<&Session>, id: &str) -> Result<Option<Bike>> {
        let path = format!("/api/bikes/{}", urlencoding::encode(id));
        match self.fetch::<BikeEnvelope>(session, Method::GET, &path, None).await {
            Ok(body) => Ok(body.bike),
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `GET /api/user/profile`. `None` when the user has no profile yet.
    pub async fn get_profile(&self, session: Option<&Session>) -> Result<Option<Profile>> {
        let body: ProfileEnvelope = self
            .fetch(session, Method::GET, "/api/user/profile", None)
            .await?;
        Ok(body.profile)
    }

    /// `POST /api/user/profile`. The response body is not used.
    pub async fn save_profile(&self, session: Option<&Session>, profile: &Profile) -> Result<()> {
        let body = serde_json::to_value(profile)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to encode profile: {}", e)))?;
        self.execute(session, Method::POST, "/api/user/profile", Some(&body))
            .await?;
        Ok(())
    }
}

/// Check response status and map failures onto [`ApiError`].
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|e| e.error)
        .filter(|m| !m.trim().is_empty());

    tracing::warn!(status = status.as_u16(), message = ?message, "API request failed");
    Err(ApiError::RequestFailed {
        status: status.as_u16(),
        message,
    })
}

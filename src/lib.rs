// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Bikers: browse the bike catalog and keep a rider profile.
//!
//! This crate provides the client side of the Bikers app: an identity
//! session watcher, an authenticated API client and the views that are
//! gated on the rider having a profile.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod views;

use config::{Config, ConfigError};
use services::{ApiClient, IdentityProvider, ResourceLoader, SessionWatcher};
use std::sync::Arc;

/// Shared client state, built once and handed to every view.
pub struct AppContext<P> {
    pub config: Config,
    pub identity: Arc<P>,
    pub api: ApiClient<P>,
    pub watcher: SessionWatcher,
}

impl<P: IdentityProvider> AppContext<P> {
    /// Build the context and mount the session watcher.
    pub fn new(config: Config, identity: Arc<P>) -> Result<Self, ConfigError> {
        let http = config.http_client()?;
        Ok(Self::with_http(config, http, identity))
    }

    pub fn with_http(config: Config, http: reqwest::Client, identity: Arc<P>) -> Self {
        let api = ApiClient::new(&config, http, identity.clone());
        let watcher = SessionWatcher::mount(identity.as_ref());
        Self {
            config,
            identity,
            api,
            watcher,
        }
    }

    pub fn loader(&self) -> ResourceLoader<'_, P> {
        ResourceLoader::new(&self.api, &self.watcher)
    }
}

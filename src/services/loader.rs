// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated resource loader.
//!
//! The one place that sequences "session present? → fetch → is the result
//! still wanted?". Views describe what to fetch; the loader supplies the
//! session, runs the round trips and discards results that arrive after the
//! session changed or the watcher was unmounted.

use crate::error::Result;
use crate::models::{Session, SessionState};
use crate::services::api::ApiClient;
use crate::services::identity::IdentityProvider;
use crate::services::session_watcher::SessionWatcher;
use std::future::Future;

/// Result of a guarded load.
#[derive(Debug)]
pub enum Loaded<T> {
    /// The provider has not reported a session state yet.
    Pending,
    SignedOut,
    /// The session changed while the fetch was in flight; result dropped.
    Stale,
    Done(Result<T>),
}

/// Runs fetches on behalf of a view, gated on the current session.
pub struct ResourceLoader<'a, P> {
    api: &'a ApiClient<P>,
    watcher: &'a SessionWatcher,
}

impl<'a, P: IdentityProvider> ResourceLoader<'a, P> {
    pub fn new(api: &'a ApiClient<P>, watcher: &'a SessionWatcher) -> Self {
        Self { api, watcher }
    }

    /// Run `fetch` for the current session.
    ///
    /// `fetch` may chain several calls; the liveness check runs once, after
    /// the whole chain.
    pub async fn load<T, F, Fut>(&self, fetch: F) -> Loaded<T>
    where
        F: FnOnce(ApiClient<P>, Session) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let snapshot = self.watcher.snapshot();
        let session = match snapshot.state {
            SessionState::Unknown => return Loaded::Pending,
            SessionState::SignedOut => return Loaded::SignedOut,
            SessionState::SignedIn(session) => session,
        };

        let result = fetch(self.api.clone(), session).await;

        if !self.watcher.is_current(snapshot.generation) {
            tracing::debug!(
                generation = snapshot.generation,
                "Discarding result fetched for a previous session"
            );
            return Loaded::Stale;
        }

        Loaded::Done(result)
    }
}

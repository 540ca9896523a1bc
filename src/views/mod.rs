// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Views: per-screen state machines with a text rendering.
//!
//! Each view owns a [`ProfileGate`] and its own data; nothing is shared or
//! cached between views. All post-await updates go through the resource
//! loader, so results that belong to a previous session are never shown.

pub mod catalog;
pub mod detail;
pub mod navigator;
pub mod profile;
pub mod route;
pub mod setup;

pub use catalog::CatalogView;
pub use detail::BikeDetailView;
pub use navigator::{Navigation, Navigator};
pub use profile::ProfileEditor;
pub use route::AppRoute;
pub use setup::ProfileSetupView;

use crate::error::Result;
use crate::models::{Profile, Session, SessionState};
use crate::services::{ApiClient, GateOutcome, IdentityProvider, Loaded, ProfileGate};
use crate::AppContext;
use std::future::Future;

/// What a view is showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// Session state not known yet.
    CheckingSession,
    SignedOut,
    Loading,
    Ready(T),
    NotFound,
    /// Error banner text.
    Failed(String),
    /// Navigated elsewhere; nothing to render.
    Redirecting(AppRoute),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::CheckingSession
    }
}

impl<T> ViewState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::CheckingSession | Self::Loading)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            Self::Ready(value) => ViewState::Ready(f(value)),
            Self::CheckingSession => ViewState::CheckingSession,
            Self::SignedOut => ViewState::SignedOut,
            Self::Loading => ViewState::Loading,
            Self::NotFound => ViewState::NotFound,
            Self::Failed(msg) => ViewState::Failed(msg),
            Self::Redirecting(route) => ViewState::Redirecting(route),
        }
    }

    /// State for a view that has nothing loaded for `session`.
    pub(crate) fn idle(session: &SessionState) -> Self {
        match session {
            SessionState::Unknown => Self::CheckingSession,
            SessionState::SignedOut => Self::SignedOut,
            SessionState::SignedIn(_) => Self::Loading,
        }
    }
}

impl<T> ViewState<Option<T>> {
    /// A missing value is a not-found state.
    pub fn flatten(self) -> ViewState<T> {
        match self {
            Self::Ready(Some(value)) => ViewState::Ready(value),
            Self::Ready(None) | Self::NotFound => ViewState::NotFound,
            Self::CheckingSession => ViewState::CheckingSession,
            Self::SignedOut => ViewState::SignedOut,
            Self::Loading => ViewState::Loading,
            Self::Failed(msg) => ViewState::Failed(msg),
            Self::Redirecting(route) => ViewState::Redirecting(route),
        }
    }
}

/// Pass the profile gate, then run `fetch` for the gated profile.
///
/// When the session changes while `fetch` is in flight the result is
/// dropped and the sequence starts over against the new session state.
pub(crate) async fn load_gated<P, T, F, Fut>(
    gate: &mut ProfileGate,
    ctx: &AppContext<P>,
    navigator: &mut Navigator,
    fallback: &str,
    fetch: F,
) -> ViewState<(Profile, T)>
where
    P: IdentityProvider,
    F: Fn(ApiClient<P>, Session, Profile) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    loop {
        let profile = match gate.check(ctx, navigator).await {
            GateOutcome::Ready(profile) => profile,
            GateOutcome::Pending => return ViewState::CheckingSession,
            GateOutcome::SignedOut => return ViewState::SignedOut,
            GateOutcome::Redirected => return ViewState::Redirecting(AppRoute::ProfileSetup),
            GateOutcome::Failed(msg) => return ViewState::Failed(msg),
        };

        let loaded = ctx
            .loader()
            .load(|api, session| fetch(api, session, profile.clone()))
            .await;

        match loaded {
            Loaded::Done(Ok(value)) => return ViewState::Ready((profile, value)),
            Loaded::Done(Err(e)) => {
                tracing::warn!(error = %e, "Load failed");
                return ViewState::Failed(e.display_message(fallback));
            }
            Loaded::Pending | Loaded::SignedOut => return ViewState::idle(&ctx.watcher.state()),
            // Session changed mid-flight.
            Loaded::Stale => {}
        }
    }
}

/// Error banner line, when there is one.
pub(crate) fn banner(f: &mut std::fmt::Formatter<'_>, error: Option<&str>) -> std::fmt::Result {
    match error {
        Some(msg) if !msg.is_empty() => writeln!(f, "[!] {}", msg),
        _ => Ok(()),
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile gate: no dependent view renders until the user has a profile.
//!
//! Per session generation the gate moves `Unknown → Checking` and settles in
//! `HasProfile`, `NoProfile` (one redirect to setup) or `CheckFailed`
//! (error surfaced, `retry` available). It checks once per generation and
//! never polls.

use crate::models::{Profile, SessionState};
use crate::services::identity::IdentityProvider;
use crate::services::loader::Loaded;
use crate::views::navigator::Navigator;
use crate::views::route::AppRoute;
use crate::AppContext;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Unknown,
    Checking,
    HasProfile(Profile),
    NoProfile,
    CheckFailed(String),
}

/// What the gate tells the view it guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Session not reported yet.
    Pending,
    SignedOut,
    Ready(Profile),
    /// Sent to profile setup; render nothing.
    Redirected,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct ProfileGate {
    state: GateState,
    /// Session generation the current state belongs to.
    generation: Option<u64>,
}

impl ProfileGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    fn reset(&mut self) {
        self.state = GateState::Unknown;
        self.generation = None;
    }

    fn settled(&self) -> Option<GateOutcome> {
        match &self.state {
            GateState::HasProfile(profile) => Some(GateOutcome::Ready(profile.clone())),
            GateState::NoProfile => Some(GateOutcome::Redirected),
            GateState::CheckFailed(msg) => Some(GateOutcome::Failed(msg.clone())),
            GateState::Unknown | GateState::Checking => None,
        }
    }

    /// Bring the gate up to date with the current session.
    pub async fn check<P: IdentityProvider>(
        &mut self,
        ctx: &AppContext<P>,
        navigator: &mut Navigator,
    ) -> GateOutcome {
        loop {
            let snapshot = ctx.watcher.snapshot();
            match snapshot.state {
                SessionState::Unknown => {
                    self.reset();
                    return GateOutcome::Pending;
                }
                SessionState::SignedOut => {
                    self.reset();
                    return GateOutcome::SignedOut;
                }
                SessionState::SignedIn(_) => {}
            }

            if self.generation == Some(snapshot.generation) {
                if let Some(outcome) = self.settled() {
                    return outcome;
                }
            }

            self.generation = Some(snapshot.generation);
            self.state = GateState::Checking;
            tracing::debug!(generation = snapshot.generation, "Checking for a profile");

            let loaded = ctx
                .loader()
                .load(|api, session| async move { api.get_profile(Some(&session)).await })
                .await;

            match loaded {
                Loaded::Done(Ok(Some(profile))) => {
                    self.state = GateState::HasProfile(profile.clone());
                    return GateOutcome::Ready(profile);
                }
                Loaded::Done(Ok(None)) => {
                    tracing::info!("No profile yet, redirecting to setup");
                    self.state = GateState::NoProfile;
                    navigator.redirect(AppRoute::ProfileSetup);
                    return GateOutcome::Redirected;
                }
                Loaded::Done(Err(e)) => {
                    let msg = e.display_message("Failed to fetch profile");
                    tracing::warn!(error = %e, "Profile check failed");
                    self.state = GateState::CheckFailed(msg.clone());
                    return GateOutcome::Failed(msg);
                }
                // Session moved on mid-check: start over from the new state.
                Loaded::Stale | Loaded::Pending | Loaded::SignedOut => self.reset(),
            }
        }
    }

    /// Re-run a failed check for the same session.
    pub async fn retry<P: IdentityProvider>(
        &mut self,
        ctx: &AppContext<P>,
        navigator: &mut Navigator,
    ) -> GateOutcome {
        if matches!(self.state, GateState::CheckFailed(_)) {
            self.reset();
        }
        self.check(ctx, navigator).await
    }

    /// Adopt a profile the view just saved for the current generation.
    pub fn accept(&mut self, profile: Profile) {
        if self.generation.is_some() {
            self.state = GateState::HasProfile(profile);
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! First-run profile setup (`/profile/setup`).
//!
//! Reached through the profile gate's redirect. Needs a session but no
//! profile; the vehicle is entered as free text.

use crate::models::{ProfileForm, SessionState, VehicleKind};
use crate::services::{IdentityProvider, Loaded};
use crate::views::{banner, AppRoute, Navigator, ViewState};
use crate::AppContext;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupForm {
    pub name: String,
    pub bike_name: String,
    pub saving: bool,
}

#[derive(Debug, Default)]
pub struct ProfileSetupView {
    state: ViewState<SetupForm>,
    error: Option<String>,
}

impl ProfileSetupView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState<SetupForm> {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Show the form once a session is present.
    pub async fn load<P: IdentityProvider>(&mut self, ctx: &AppContext<P>) -> &ViewState<SetupForm> {
        self.state = match ctx.watcher.resolved().await {
            SessionState::SignedIn(_) => match &self.state {
                ViewState::Ready(form) => ViewState::Ready(form.clone()),
                _ => ViewState::Ready(SetupForm::default()),
            },
            other => ViewState::idle(&other),
        };
        &self.state
    }

    pub fn set_name(&mut self, name: &str) {
        if let ViewState::Ready(form) = &mut self.state {
            form.name = name.to_string();
        }
    }

    pub fn set_bike_name(&mut self, bike_name: &str) {
        if let ViewState::Ready(form) = &mut self.state {
            form.bike_name = bike_name.to_string();
        }
    }

    /// Save the profile and move on to `/profile`.
    pub async fn submit<P: IdentityProvider>(
        &mut self,
        ctx: &AppContext<P>,
        navigator: &mut Navigator,
    ) -> bool {
        let ViewState::Ready(form) = &mut self.state else {
            return false;
        };

        let Ok(profile) =
            ProfileForm::new(&form.name, &form.bike_name, VehicleKind::FreeText).to_profile()
        else {
            self.error = Some("Both name and bike name are required.".to_string());
            return false;
        };

        form.saving = true;
        self.error = None;

        let loaded = ctx
            .loader()
            .load(|api, session| async move { api.save_profile(Some(&session), &profile).await })
            .await;

        match loaded {
            Loaded::Done(Ok(())) => {
                tracing::info!("Profile created");
                self.state = ViewState::Redirecting(AppRoute::Profile);
                navigator.push(AppRoute::Profile);
                true
            }
            Loaded::Done(Err(e)) => {
                tracing::warn!(error = %e, "Profile setup failed");
                self.error = Some(e.display_message("Failed to save profile"));
                if let ViewState::Ready(form) = &mut self.state {
                    form.saving = false;
                }
                false
            }
            Loaded::Pending | Loaded::SignedOut | Loaded::Stale => {
                self.error = None;
                self.state = ViewState::idle(&ctx.watcher.state());
                false
            }
        }
    }
}

impl fmt::Display for ProfileSetupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            ViewState::CheckingSession | ViewState::Loading => {
                writeln!(f, "Checking login status...")
            }
            ViewState::SignedOut => writeln!(f, "You must be logged in to set up your profile."),
            ViewState::Redirecting(route) => writeln!(f, "Redirecting to {}...", route),
            ViewState::NotFound | ViewState::Failed(_) => banner(f, self.state.error()),
            ViewState::Ready(form) => {
                writeln!(f, "Welcome!")?;
                writeln!(f, "Tell us your name and the bike you ride.")?;
                banner(f, self.error.as_deref())?;
                writeln!(f, "Your Name: {}", form.name)?;
                writeln!(f, "Bike Name: {}", form.bike_name)?;
                if form.saving {
                    writeln!(f, "Saving...")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs_ignored_before_form_is_shown() {
        let mut view = ProfileSetupView::new();
        view.set_name("Asha");
        assert_eq!(view.state(), &ViewState::CheckingSession);
        assert_eq!(view.to_string(), "Checking login status...\n");
    }
}

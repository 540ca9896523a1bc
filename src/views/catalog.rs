// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog dashboard (`/`).

use crate::models::{Bike, Profile, Session};
use crate::services::{IdentityProvider, ProfileGate};
use crate::views::{banner, load_gated, Navigator, ViewState};
use crate::AppContext;
use std::fmt;

/// Loaded dashboard content.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub profile: Profile,
    pub bikes: Vec<Bike>,
}

#[derive(Debug, Default)]
pub struct CatalogView {
    gate: ProfileGate,
    state: ViewState<Catalog>,
    session: Option<Session>,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState<Catalog> {
        &self.state
    }

    pub fn bikes(&self) -> &[Bike] {
        self.state.ready().map(|c| c.bikes.as_slice()).unwrap_or_default()
    }

    /// Load the catalog for the current session.
    pub async fn load<P: IdentityProvider>(
        &mut self,
        ctx: &AppContext<P>,
        navigator: &mut Navigator,
    ) -> &ViewState<Catalog> {
        self.state = ViewState::Loading;
        self.state = load_gated(
            &mut self.gate,
            ctx,
            navigator,
            "Failed to fetch bikes",
            |api, session, _profile| async move { api.list_bikes(Some(&session)).await },
        )
        .await
        .map(|(profile, bikes)| Catalog { profile, bikes });
        self.session = ctx.watcher.session();

        if let Some(catalog) = self.state.ready() {
            tracing::info!(count = catalog.bikes.len(), "Catalog loaded");
        }
        &self.state
    }

    /// Re-fetch the list. A profile check is repeated only if it failed.
    pub async fn refresh<P: IdentityProvider>(
        &mut self,
        ctx: &AppContext<P>,
        navigator: &mut Navigator,
    ) -> &ViewState<Catalog> {
        self.gate.retry(ctx, navigator).await;
        self.load(ctx, navigator).await
    }
}

impl fmt::Display for CatalogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bikers App")?;
        if let Some(session) = &self.session {
            let name = session.display_name.as_deref().unwrap_or("Rider");
            match &session.email {
                Some(email) => writeln!(f, "Signed in as {} <{}>", name, email)?,
                None => writeln!(f, "Signed in as {}", name)?,
            }
        }
        writeln!(f)?;

        match &self.state {
            ViewState::CheckingSession => writeln!(f, "Checking login status..."),
            ViewState::SignedOut => {
                writeln!(f, "Please sign in with Google to see the bike list.")
            }
            ViewState::Loading => writeln!(f, "Loading bikes..."),
            ViewState::Redirecting(route) => writeln!(f, "Redirecting to {}...", route),
            ViewState::NotFound => writeln!(f, "No bikes found."),
            ViewState::Failed(msg) => banner(f, Some(msg)),
            ViewState::Ready(catalog) => {
                writeln!(f, "Hello, {}! Select a bike to know more about it.", catalog.profile.name)?;
                writeln!(f)?;
                writeln!(f, "Available Bikes")?;
                if catalog.bikes.is_empty() {
                    return writeln!(f, "No bikes found.");
                }
                for bike in &catalog.bikes {
                    write!(f, "- {}", bike.name)?;
                    let subtitle = bike.subtitle();
                    if !subtitle.is_empty() {
                        write!(f, " ({})", subtitle)?;
                    }
                    if let Some(price) = bike.price_label() {
                        write!(f, "  {}", price)?;
                    }
                    if let Some(speed) = &bike.top_speed {
                        write!(f, "  Top Speed: {} km/h", speed)?;
                    }
                    writeln!(f, "  [/bikes/{}]", urlencoding::encode(&bike.id))?;
                }
                Ok(())
            }
        }
    }
}

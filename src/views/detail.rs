// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bike detail (`/bikes/:id`).

use crate::models::Bike;
use crate::services::{IdentityProvider, ProfileGate};
use crate::views::{banner, load_gated, Navigator, ViewState};
use crate::AppContext;
use std::fmt;

#[derive(Debug)]
pub struct BikeDetailView {
    bike_id: String,
    gate: ProfileGate,
    state: ViewState<Bike>,
}

impl BikeDetailView {
    pub fn new(bike_id: impl Into<String>) -> Self {
        Self {
            bike_id: bike_id.into(),
            gate: ProfileGate::new(),
            state: ViewState::default(),
        }
    }

    pub fn bike_id(&self) -> &str {
        &self.bike_id
    }

    pub fn state(&self) -> &ViewState<Bike> {
        &self.state
    }

    pub fn bike(&self) -> Option<&Bike> {
        self.state.ready()
    }

    pub async fn load<P: IdentityProvider>(
        &mut self,
        ctx: &AppContext<P>,
        navigator: &mut Navigator,
    ) -> &ViewState<Bike> {
        self.state = ViewState::Loading;
        let id = self.bike_id.clone();
        let loaded = load_gated(
            &mut self.gate,
            ctx,
            navigator,
            "Failed to fetch bike",
            move |api, session, _profile| {
                let id = id.clone();
                async move { api.get_bike(Some(&session), &id).await }
            },
        )
        .await;

        self.state = loaded.map(|(_, bike)| bike).flatten();
        if matches!(self.state, ViewState::NotFound) {
            tracing::info!(bike_id = %self.bike_id, "Bike not found");
        }
        &self.state
    }

    /// Load again after a failure, re-running a failed profile check.
    pub async fn retry<P: IdentityProvider>(
        &mut self,
        ctx: &AppContext<P>,
        navigator: &mut Navigator,
    ) -> &ViewState<Bike> {
        self.gate.retry(ctx, navigator).await;
        self.load(ctx, navigator).await
    }
}

impl fmt::Display for BikeDetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            ViewState::CheckingSession => writeln!(f, "Checking login status..."),
            ViewState::SignedOut => {
                writeln!(f, "You must be logged in to view bike details.")?;
                writeln!(f, "Back to home: /")
            }
            ViewState::Loading => writeln!(f, "Loading bike details..."),
            ViewState::Redirecting(route) => writeln!(f, "Redirecting to {}...", route),
            // 404 is not an error: no banner.
            ViewState::NotFound => {
                writeln!(f, "Bike not found.")?;
                writeln!(f, "Back to home: /")
            }
            ViewState::Failed(msg) => {
                banner(f, Some(msg))?;
                writeln!(f, "Back to home: /")
            }
            ViewState::Ready(bike) => {
                writeln!(f, "{}", bike.name)?;
                let subtitle = bike.subtitle();
                if !subtitle.is_empty() {
                    writeln!(f, "{}", subtitle)?;
                }
                if let Some(description) = bike.description.as_deref().filter(|d| !d.is_empty()) {
                    writeln!(f, "{}", description)?;
                }
                if let Some(engine) = bike.engine.as_deref().filter(|e| !e.is_empty()) {
                    writeln!(f, "Engine: {}", engine)?;
                }
                if let Some(speed) = &bike.top_speed {
                    writeln!(f, "Top Speed: {} km/h", speed)?;
                }
                if let Some(price) = bike.price_label() {
                    writeln!(f, "Price: {}", price)?;
                }
                writeln!(f, "Back to home: /")
            }
        }
    }
}

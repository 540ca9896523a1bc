// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile editor (`/profile`).
//!
//! Shows the saved profile and, for catalog vehicles, the referenced bike.
//! Edits are validated locally, posted, and then applied to local state from
//! the submitted values without re-reading the profile.

use crate::error::ApiError;
use crate::models::{Bike, Profile, ProfileForm, Session, Vehicle, VehicleKind};
use crate::services::{IdentityProvider, Loaded, ProfileGate};
use crate::views::{banner, load_gated, Navigator, ViewState};
use crate::AppContext;
use std::fmt;

/// Saved profile plus the bike it references, when that resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub profile: Profile,
    pub bike: Option<Bike>,
}

/// In-progress edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditForm {
    pub name: String,
    /// Bike id or bike name, depending on `kind`
    pub vehicle: String,
    pub kind: VehicleKind,
    /// Catalog choices for reference vehicles.
    pub choices: ViewState<Vec<Bike>>,
    pub saving: bool,
}

impl EditForm {
    fn seeded(profile: &Profile) -> Self {
        let (vehicle, kind) = match &profile.vehicle {
            Some(Vehicle::Reference { id }) => (id.clone(), VehicleKind::Reference),
            Some(Vehicle::FreeText { name }) => (name.clone(), VehicleKind::FreeText),
            None => (String::new(), VehicleKind::Reference),
        };

        let choices = match kind {
            VehicleKind::Reference => ViewState::Loading,
            VehicleKind::FreeText => ViewState::Ready(Vec::new()),
        };

        Self {
            name: profile.name.clone(),
            vehicle,
            kind,
            choices,
            saving: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct ProfileEditor {
    gate: ProfileGate,
    state: ViewState<ProfileSummary>,
    session: Option<Session>,
    form: Option<EditForm>,
    error: Option<String>,
}

impl ProfileEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState<ProfileSummary> {
        &self.state
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.state.ready().map(|s| &s.profile)
    }

    pub fn bike(&self) -> Option<&Bike> {
        self.state.ready().and_then(|s| s.bike.as_ref())
    }

    pub fn form(&self) -> Option<&EditForm> {
        self.form.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.form.is_some()
    }

    /// Banner text from the last failed action.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().or_else(|| self.state.error())
    }

    /// Load the profile and resolve its bike.
    pub async fn load<P: IdentityProvider>(
        &mut self,
        ctx: &AppContext<P>,
        navigator: &mut Navigator,
    ) -> &ViewState<ProfileSummary> {
        self.state = ViewState::Loading;
        self.form = None;
        self.error = None;

        self.state = load_gated(
            &mut self.gate,
            ctx,
            navigator,
            "Failed to fetch profile",
            |api, session, profile| async move {
                let Some(id) = profile.bike_id() else {
                    return Ok(None);
                };
                // An unresolvable bike just shows as no bike.
                match api.get_bike(Some(&session), id).await {
                    Ok(bike) => Ok(bike),
                    Err(e) => {
                        tracing::debug!(bike_id = %id, error = %e, "Could not resolve profile bike");
                        Ok(None)
                    }
                }
            },
        )
        .await
        .map(|(profile, bike)| ProfileSummary { profile, bike });
        self.session = ctx.watcher.session();
        &self.state
    }

    pub async fn retry<P: IdentityProvider>(
        &mut self,
        ctx: &AppContext<P>,
        navigator: &mut Navigator,
    ) -> &ViewState<ProfileSummary> {
        self.gate.retry(ctx, navigator).await;
        self.load(ctx, navigator).await
    }

    /// Open the edit form, loading catalog choices for reference vehicles.
    pub async fn begin_edit<P: IdentityProvider>(&mut self, ctx: &AppContext<P>) {
        let Some(summary) = self.state.ready() else {
            return;
        };
        let mut form = EditForm::seeded(&summary.profile);
        self.error = None;

        if form.kind == VehicleKind::Reference {
            let loaded = ctx
                .loader()
                .load(|api, session| async move { api.list_bikes(Some(&session)).await })
                .await;

            match loaded {
                Loaded::Done(Ok(bikes)) => form.choices = ViewState::Ready(bikes),
                Loaded::Done(Err(e)) => {
                    let msg = e.display_message("Failed to fetch bikes");
                    form.choices = ViewState::Failed(msg.clone());
                    self.error = Some(msg);
                }
                Loaded::Pending | Loaded::SignedOut | Loaded::Stale => {
                    self.leave(ctx);
                    return;
                }
            }
        }

        self.form = Some(form);
    }

    pub fn set_name(&mut self, name: &str) {
        if let Some(form) = &mut self.form {
            form.name = name.to_string();
        }
    }

    /// Choose a catalog bike.
    pub fn select_bike(&mut self, bike_id: &str) {
        if let Some(form) = &mut self.form {
            form.kind = VehicleKind::Reference;
            form.vehicle = bike_id.to_string();
        }
    }

    /// Type a bike name instead of choosing one.
    pub fn set_bike_name(&mut self, bike_name: &str) {
        if let Some(form) = &mut self.form {
            form.kind = VehicleKind::FreeText;
            form.vehicle = bike_name.to_string();
        }
    }

    /// Validate and save the form. Returns whether the save went through.
    pub async fn save<P: IdentityProvider>(&mut self, ctx: &AppContext<P>) -> bool {
        let Some(form) = &mut self.form else {
            return false;
        };

        let profile = match ProfileForm::new(&form.name, &form.vehicle, form.kind).to_profile() {
            Ok(profile) => profile,
            Err(e) => {
                self.error = Some(e.to_string());
                return false;
            }
        };

        form.saving = true;
        self.error = None;

        let submitted = profile.clone();
        let loaded = ctx
            .loader()
            .load(|api, session| async move {
                api.save_profile(Some(&session), &submitted).await?;
                let Some(id) = submitted.bike_id() else {
                    return Ok(None);
                };
                Ok::<_, ApiError>(api.get_bike(Some(&session), id).await.ok().flatten())
            })
            .await;

        match loaded {
            Loaded::Done(Ok(bike)) => {
                tracing::info!("Profile saved");
                self.gate.accept(profile.clone());
                self.state = ViewState::Ready(ProfileSummary { profile, bike });
                self.form = None;
                true
            }
            Loaded::Done(Err(e)) => {
                tracing::warn!(error = %e, "Profile save failed");
                self.error = Some(e.display_message("Failed to save profile"));
                if let Some(form) = &mut self.form {
                    form.saving = false;
                }
                false
            }
            Loaded::Pending | Loaded::SignedOut | Loaded::Stale => {
                self.leave(ctx);
                false
            }
        }
    }

    /// Discard edits and show the saved profile again.
    pub fn cancel(&mut self) {
        self.form = None;
        self.error = None;
    }

    /// The session went away under an action: drop everything shown.
    fn leave<P: IdentityProvider>(&mut self, ctx: &AppContext<P>) {
        self.form = None;
        self.error = None;
        self.session = ctx.watcher.session();
        self.state = ViewState::idle(&ctx.watcher.state());
    }
}

impl fmt::Display for ProfileEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = match &self.state {
            ViewState::CheckingSession => return writeln!(f, "Checking login status..."),
            ViewState::SignedOut => {
                return writeln!(f, "You must be logged in to view your profile.")
            }
            ViewState::Loading => return writeln!(f, "Loading profile..."),
            ViewState::Redirecting(route) => {
                return writeln!(f, "Redirecting to {}...", route)
            }
            ViewState::NotFound => return writeln!(f, "Profile not found."),
            ViewState::Failed(msg) => {
                writeln!(f, "Your Profile")?;
                return banner(f, Some(msg));
            }
            ViewState::Ready(summary) => summary,
        };

        writeln!(f, "Your Profile  (back to dashboard: /)")?;
        banner(f, self.error.as_deref())?;

        let Some(form) = &self.form else {
            writeln!(f, "Name: {}", summary.profile.name)?;
            match (&summary.profile.vehicle, &summary.bike) {
                (_, Some(bike)) => writeln!(f, "Your Bike: {}", bike.name)?,
                (Some(Vehicle::FreeText { name }), None) => writeln!(f, "Your Bike: {}", name)?,
                _ => writeln!(f, "Your Bike: No bike selected")?,
            }
            if let Some(email) = self.session.as_ref().and_then(|s| s.email.as_deref()) {
                writeln!(f, "Email: {}", email)?;
            }
            return Ok(());
        };

        writeln!(f, "Your Name: {}", form.name)?;
        match form.kind {
            VehicleKind::FreeText => writeln!(f, "Bike Name: {}", form.vehicle)?,
            VehicleKind::Reference => {
                writeln!(f, "Select Your Bike:")?;
                match &form.choices {
                    ViewState::Ready(bikes) if bikes.is_empty() => {
                        writeln!(f, "  No bikes available")?
                    }
                    ViewState::Ready(bikes) => {
                        for bike in bikes {
                            let mark = if bike.id == form.vehicle { "*" } else { " " };
                            writeln!(f, "  [{}] {} ({})", mark, bike.name, bike.id)?;
                        }
                    }
                    ViewState::Failed(_) => writeln!(f, "  No bikes available")?,
                    _ => writeln!(f, "  Loading bikes...")?,
                }
            }
        }
        if form.saving {
            writeln!(f, "Saving...")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_seeded_from_profile() {
        let by_id = Profile {
            name: "Asha".to_string(),
            vehicle: Some(Vehicle::Reference {
                id: "v1".to_string(),
            }),
        };
        let form = EditForm::seeded(&by_id);
        assert_eq!(form.vehicle, "v1");
        assert_eq!(form.kind, VehicleKind::Reference);
        assert_eq!(form.choices, ViewState::Loading);

        let by_name = Profile {
            name: "Ravi".to_string(),
            vehicle: Some(Vehicle::FreeText {
                name: "Pulsar".to_string(),
            }),
        };
        let form = EditForm::seeded(&by_name);
        assert_eq!(form.vehicle, "Pulsar");
        assert_eq!(form.kind, VehicleKind::FreeText);
    }

    #[test]
    fn test_edits_need_an_open_form() {
        let mut editor = ProfileEditor::new();
        editor.set_name("Asha");
        editor.select_bike("v1");
        assert!(!editor.is_editing());
        assert_eq!(editor.to_string(), "Checking login status...\n");
    }
}

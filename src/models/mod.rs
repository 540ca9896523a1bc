// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod bike;
pub mod profile;
pub mod session;

pub use bike::{Bike, Figure};
pub use profile::{FormError, Profile, ProfileForm, Vehicle, VehicleKind};
pub use session::{Session, SessionState};

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model.
//!
//! The API stores the rider's vehicle either as a catalog reference
//! (`bikeId`) or as free text (`bikeName`). Both shapes are folded into
//! [`Vehicle`] here, at the wire boundary, so no view has to guess.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Per-user application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProfileWire", into = "ProfileWire")]
pub struct Profile {
    pub name: String,
    pub vehicle: Option<Vehicle>,
}

/// The rider's vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vehicle {
    /// A catalog bike, by id
    Reference { id: String },
    /// A bike name typed by the user
    FreeText { name: String },
}

impl Profile {
    /// Catalog id of the vehicle, if it references one.
    pub fn bike_id(&self) -> Option<&str> {
        match &self.vehicle {
            Some(Vehicle::Reference { id }) => Some(id),
            _ => None,
        }
    }
}

/// Wire shape of a profile: `{ name, bikeId?, bikeName? }`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileWire {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bike_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bike_name: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<ProfileWire> for Profile {
    fn from(wire: ProfileWire) -> Self {
        // A reference wins when a record carries both fields.
        let vehicle = match (non_empty(wire.bike_id), non_empty(wire.bike_name)) {
            (Some(id), _) => Some(Vehicle::Reference { id }),
            (None, Some(name)) => Some(Vehicle::FreeText { name }),
            (None, None) => None,
        };

        Self {
            name: wire.name.unwrap_or_default(),
            vehicle,
        }
    }
}

impl From<Profile> for ProfileWire {
    fn from(profile: Profile) -> Self {
        let (bike_id, bike_name) = match profile.vehicle {
            Some(Vehicle::Reference { id }) => (Some(id), None),
            Some(Vehicle::FreeText { name }) => (None, Some(name)),
            None => (None, None),
        };

        Self {
            name: Some(profile.name),
            bike_id,
            bike_name,
        }
    }
}

/// `GET /api/user/profile` body.
#[derive(Debug, Deserialize)]
pub struct ProfileEnvelope {
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// How the vehicle field of a form is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleKind {
    Reference,
    FreeText,
}

/// Raw profile form input, trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub vehicle: String,
    pub kind: VehicleKind,
}

impl ProfileForm {
    pub fn new(name: &str, vehicle: &str, kind: VehicleKind) -> Self {
        Self {
            name: name.trim().to_string(),
            vehicle: vehicle.trim().to_string(),
            kind,
        }
    }

    /// Validate the form and build the profile it describes.
    pub fn to_profile(&self) -> Result<Profile, FormError> {
        self.validate().map_err(|_| FormError::MissingFields)?;

        let vehicle = match self.kind {
            VehicleKind::Reference => Vehicle::Reference {
                id: self.vehicle.clone(),
            },
            VehicleKind::FreeText => Vehicle::FreeText {
                name: self.vehicle.clone(),
            },
        };

        Ok(Profile {
            name: self.name.clone(),
            vehicle: Some(vehicle),
        })
    }
}

/// Client-side form validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Name and bike are required.")]
    MissingFields,
}

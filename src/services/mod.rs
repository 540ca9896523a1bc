// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - identity, session and API layer.

pub mod api;
pub mod firebase;
pub mod identity;
pub mod loader;
pub mod profile_gate;
pub mod session_watcher;

pub use api::ApiClient;
pub use firebase::{FirebaseAuth, FirebaseCredentials};
pub use identity::{
    IdentityError, IdentityProvider, Listener, ListenerHandle, ListenerRegistry,
    MockIdentityProvider, SessionEvent,
};
pub use loader::{Loaded, ResourceLoader};
pub use profile_gate::{GateOutcome, GateState, ProfileGate};
pub use session_watcher::{SessionSnapshot, SessionWatcher};

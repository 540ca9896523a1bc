// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider seam.
//!
//! Everything the client needs from an identity provider: sign in, sign out,
//! session-change notifications and a fresh bearer token for the current
//! session. Providers are constructed explicitly and passed down, so tests
//! can swap in [`MockIdentityProvider`].

use crate::models::Session;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Identity provider error categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// No signed-in user, or the session asked about is no longer current.
    #[error("No active session")]
    NoSession,

    /// The provider refused the credentials or refresh token.
    #[error("Identity provider rejected the request: {0}")]
    Rejected(String),

    /// The provider returned a token we could not read.
    #[error("Invalid ID token: {0}")]
    InvalidToken(String),

    /// Transport failure talking to the provider.
    #[error("Identity provider unreachable: {0}")]
    Transport(String),
}

/// Session-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
    /// The ID token was renewed; the session itself is unchanged.
    TokenRefreshed(Session),
}

/// Callback invoked for every session event.
pub type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// The capabilities the client consumes from an identity provider.
pub trait IdentityProvider: Send + Sync + 'static {
    type Credentials: Send;

    /// Sign in and notify listeners.
    fn sign_in(
        &self,
        credentials: Self::Credentials,
    ) -> impl Future<Output = Result<Session, IdentityError>> + Send;

    /// Sign out and notify listeners.
    fn sign_out(&self) -> impl Future<Output = Result<(), IdentityError>> + Send;

    fn current_session(&self) -> Option<Session>;

    /// Register a session-change listener.
    ///
    /// The listener is called once right away with the current state, then
    /// once per event in the order the provider emits them, until the
    /// returned handle is dropped.
    fn on_session_change(&self, listener: Listener) -> ListenerHandle;

    /// A bearer token valid right now for `session`.
    ///
    /// Fails with [`IdentityError::NoSession`] if `session` is not the
    /// provider's current session.
    fn id_token(
        &self,
        session: &Session,
    ) -> impl Future<Output = Result<String, IdentityError>> + Send;
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

/// Listener bookkeeping shared by provider implementations.
///
/// Providers must call [`ListenerRegistry::register`] and
/// [`ListenerRegistry::emit`] while holding their own state lock so that
/// listeners observe events in state-change order.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`, delivering `initial` to it (and only it) first.
    pub fn register(&self, listener: Listener, initial: &SessionEvent) -> ListenerHandle {
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;

        listener(initial);
        inner.listeners.insert(id, listener);

        ListenerHandle {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every registered listener, in registration order.
    pub fn emit(&self, event: &SessionEvent) {
        let inner = lock(&self.inner);
        for listener in inner.listeners.values() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registration token; dropping it deregisters the listener.
pub struct ListenerHandle {
    id: u64,
    registry: Weak<Mutex<RegistryInner>>,
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            lock(&inner).listeners.remove(&self.id);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MockIdentityProvider - in-memory provider for tests and local runs
// ─────────────────────────────────────────────────────────────────────────────

struct MockState {
    session: Option<Session>,
    token: String,
}

/// In-memory identity provider.
///
/// Signs in whatever [`Session`] it is handed and serves a configurable
/// bearer token, counting how often a token was requested.
pub struct MockIdentityProvider {
    state: Mutex<MockState>,
    registry: ListenerRegistry,
    token_requests: AtomicUsize,
}

impl MockIdentityProvider {
    pub fn new_mock() -> Self {
        Self {
            state: Mutex::new(MockState {
                session: None,
                token: "mock-id-token".to_string(),
            }),
            registry: ListenerRegistry::new(),
            token_requests: AtomicUsize::new(0),
        }
    }

    /// Replace the token served from now on, without notifying listeners.
    pub fn set_token(&self, token: impl Into<String>) {
        lock(&self.state).token = token.into();
    }

    /// Rotate the token and emit [`SessionEvent::TokenRefreshed`].
    pub fn refresh_token(&self, token: impl Into<String>) {
        let mut state = lock(&self.state);
        state.token = token.into();
        if let Some(session) = state.session.clone() {
            self.registry.emit(&SessionEvent::TokenRefreshed(session));
        }
    }

    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new_mock()
    }
}

impl IdentityProvider for MockIdentityProvider {
    type Credentials = Session;

    async fn sign_in(&self, credentials: Session) -> Result<Session, IdentityError> {
        let mut state = lock(&self.state);
        state.session = Some(credentials.clone());
        self.registry
            .emit(&SessionEvent::SignedIn(credentials.clone()));
        Ok(credentials)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let mut state = lock(&self.state);
        if state.session.take().is_some() {
            self.registry.emit(&SessionEvent::SignedOut);
        }
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        lock(&self.state).session.clone()
    }

    fn on_session_change(&self, listener: Listener) -> ListenerHandle {
        let state = lock(&self.state);
        let initial = match &state.session {
            Some(session) => SessionEvent::SignedIn(session.clone()),
            None => SessionEvent::SignedOut,
        };
        self.registry.register(listener, &initial)
    }

    async fn id_token(&self, session: &Session) -> Result<String, IdentityError> {
        self.token_requests.fetch_add(1, Ordering::SeqCst);
        let state = lock(&self.state);
        match &state.session {
            Some(current) if current.uid == session.uid => Ok(state.token.clone()),
            _ => Err(IdentityError::NoSession),
        }
    }
}

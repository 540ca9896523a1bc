// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session watcher: current-user state for views.
//!
//! Registers one listener with the identity provider on mount and turns
//! provider events into [`SessionState`] updates. Each update carries a
//! generation number that changes on sign-in and sign-out (not on token
//! refresh); loaders capture it before a round trip and drop results whose
//! generation is no longer current.

use crate::models::{Session, SessionState};
use crate::services::identity::{lock, IdentityProvider, ListenerHandle, SessionEvent};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

/// Session state plus the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub generation: u64,
}

#[derive(Default)]
struct Subscribers {
    closed: bool,
    senders: Vec<mpsc::UnboundedSender<SessionState>>,
}

struct Shared {
    tx: watch::Sender<SessionSnapshot>,
    subscribers: Mutex<Subscribers>,
}

impl Shared {
    /// Apply one provider event. Runs on the provider's emitting thread,
    /// under the provider's state lock, so events arrive in order.
    fn apply(&self, event: &SessionEvent) {
        let mut subscribers = lock(&self.subscribers);
        if subscribers.closed {
            return;
        }

        let current = self.tx.borrow().clone();
        let next = match event {
            SessionEvent::TokenRefreshed(session)
                if current.state.session().map(|s| &s.uid) == Some(&session.uid) =>
            {
                SessionSnapshot {
                    state: SessionState::SignedIn(session.clone()),
                    generation: current.generation,
                }
            }
            SessionEvent::SignedIn(session) | SessionEvent::TokenRefreshed(session) => {
                SessionSnapshot {
                    state: SessionState::SignedIn(session.clone()),
                    generation: current.generation + 1,
                }
            }
            SessionEvent::SignedOut => SessionSnapshot {
                state: SessionState::SignedOut,
                generation: current.generation + 1,
            },
        };

        tracing::debug!(
            generation = next.generation,
            signed_in = next.state.session().is_some(),
            "Session state changed"
        );

        self.tx.send_replace(next.clone());
        subscribers
            .senders
            .retain(|tx| tx.send(next.state.clone()).is_ok());
    }
}

/// Watches the identity provider for session changes.
pub struct SessionWatcher {
    shared: Arc<Shared>,
    rx: watch::Receiver<SessionSnapshot>,
    listener: Option<ListenerHandle>,
}

impl SessionWatcher {
    /// Register with `provider`. The provider reports its current state
    /// immediately, so the watcher leaves `Unknown` during this call for
    /// providers that already know their state.
    pub fn mount<P: IdentityProvider>(provider: &P) -> Self {
        let (tx, rx) = watch::channel(SessionSnapshot::default());
        let shared = Arc::new(Shared {
            tx,
            subscribers: Mutex::new(Subscribers::default()),
        });

        let sink = shared.clone();
        let listener = provider.on_session_change(Arc::new(move |event: &SessionEvent| {
            sink.apply(event)
        }));

        Self {
            shared,
            rx,
            listener: Some(listener),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.rx.borrow().state.clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.rx.borrow().state.session().cloned()
    }

    pub fn generation(&self) -> u64 {
        self.rx.borrow().generation
    }

    /// Whether results captured at `generation` may still be applied.
    pub fn is_current(&self, generation: u64) -> bool {
        self.is_mounted() && self.generation() == generation
    }

    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    /// Receive every subsequent state change exactly once, in order.
    ///
    /// The channel closes when the watcher is unmounted.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionState> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscribers = lock(&self.shared.subscribers);
        if !subscribers.closed {
            subscribers.senders.push(tx);
        }
        rx
    }

    /// Wait until the provider has reported at least once.
    ///
    /// An unmounted watcher never changes again, so it answers immediately.
    pub async fn resolved(&self) -> SessionState {
        if !self.is_mounted() {
            return self.state();
        }
        let mut rx = self.rx.clone();
        let state = match rx.wait_for(|snapshot| snapshot.state.is_known()).await {
            Ok(snapshot) => snapshot.state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    /// Deregister from the provider and close subscriber channels.
    pub fn unmount(&mut self) {
        if self.listener.take().is_none() {
            return;
        }

        let mut subscribers = lock(&self.shared.subscribers);
        subscribers.closed = true;
        subscribers.senders.clear();
        tracing::debug!("Session watcher unmounted");
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.unmount();
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Navigation history.

use crate::views::route::AppRoute;

/// Current route plus the back stack.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: AppRoute,
    history: Vec<AppRoute>,
    /// Every navigation, in order, for callers that report it.
    log: Vec<Navigation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Push(AppRoute),
    Replace(AppRoute),
}

impl Navigator {
    pub fn new(start: AppRoute) -> Self {
        Self {
            current: start,
            ..Self::default()
        }
    }

    pub fn current(&self) -> &AppRoute {
        &self.current
    }

    /// Navigate forward, keeping the current route on the back stack.
    pub fn push(&mut self, route: AppRoute) {
        tracing::debug!(from = %self.current, to = %route, "Navigate");
        let previous = std::mem::replace(&mut self.current, route.clone());
        self.history.push(previous);
        self.log.push(Navigation::Push(route));
    }

    /// Replace the current route without adding a back-stack entry.
    pub fn redirect(&mut self, route: AppRoute) {
        tracing::debug!(from = %self.current, to = %route, "Redirect");
        self.current = route.clone();
        self.log.push(Navigation::Replace(route));
    }

    pub fn history(&self) -> &[AppRoute] {
        &self.history
    }

    pub fn log(&self) -> &[Navigation] {
        &self.log
    }

    /// Number of redirects to `route` so far.
    pub fn redirects_to(&self, route: &AppRoute) -> usize {
        self.log
            .iter()
            .filter(|nav| matches!(nav, Navigation::Replace(r) if r == route))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_replaces_current_entry() {
        let mut nav = Navigator::new(AppRoute::Dashboard);
        nav.push(AppRoute::Profile);
        nav.redirect(AppRoute::ProfileSetup);

        assert_eq!(nav.current(), &AppRoute::ProfileSetup);
        assert_eq!(nav.history(), &[AppRoute::Dashboard]);
        assert_eq!(nav.redirects_to(&AppRoute::ProfileSetup), 1);
        assert_eq!(
            nav.log(),
            &[
                Navigation::Push(AppRoute::Profile),
                Navigation::Replace(AppRoute::ProfileSetup),
            ]
        );
    }
}

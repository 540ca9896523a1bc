// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client routes.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// Catalog dashboard
    #[default]
    Dashboard,
    BikeDetail(String),
    Profile,
    ProfileSetup,
    NotFound,
}

impl AppRoute {
    /// Parse a URL path into a route.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Self::Dashboard,
            "/profile" => Self::Profile,
            "/profile/setup" => Self::ProfileSetup,
            _ => match trimmed.strip_prefix("/bikes/") {
                Some(id) if !id.is_empty() && !id.contains('/') => {
                    let id = urlencoding::decode(id)
                        .map(|id| id.into_owned())
                        .unwrap_or_else(|_| id.to_string());
                    Self::BikeDetail(id)
                }
                _ => Self::NotFound,
            },
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Self::Dashboard => "/".to_string(),
            Self::BikeDetail(id) => format!("/bikes/{}", urlencoding::encode(id)),
            Self::Profile => "/profile".to_string(),
            Self::ProfileSetup => "/profile/setup".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }
}

impl fmt::Display for AppRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog item model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A bike from the catalog API. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bike {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    /// km/h
    #[serde(default)]
    pub top_speed: Option<Figure>,
    /// Rupees when numeric
    #[serde(default)]
    pub price: Option<Figure>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A value the catalog stores either as a number or as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Figure {
    Number(f64),
    Text(String),
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Figure::Number(n) if n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Figure::Number(n) => write!(f, "{}", n),
            Figure::Text(s) => f.write_str(s),
        }
    }
}

impl Bike {
    /// Price line as shown on catalog cards.
    pub fn price_label(&self) -> Option<String> {
        match self.price.as_ref()? {
            Figure::Number(n) => Some(format_inr(*n)),
            Figure::Text(s) if s.trim().is_empty() => None,
            Figure::Text(s) => Some(s.clone()),
        }
    }

    /// "brand • type", skipping whatever is missing.
    pub fn subtitle(&self) -> String {
        [self.brand.as_deref(), self.kind.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" • ")
    }
}

/// `GET /api/bikes` body.
#[derive(Debug, Deserialize)]
pub struct BikeList {
    #[serde(default)]
    pub bikes: Option<Vec<Bike>>,
}

/// `GET /api/bikes/:id` body.
#[derive(Debug, Deserialize)]
pub struct BikeEnvelope {
    #[serde(default)]
    pub bike: Option<Bike>,
}

/// Format rupees with Indian digit grouping, e.g. `₹2,15,000`.
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let sign = if rounded < 0 { "-" } else { "" };
    let digits = rounded.unsigned_abs().to_string();

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, last_three) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), last_three)
    };

    format!("{}₹{}", sign, grouped)
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bikers command-line client
//!
//! Signs in with Firebase and renders one screen of the Bikers app per
//! subcommand: the bike catalog, a bike's details, or the rider profile.

use anyhow::{bail, Context};
use bikers_app::{
    config::Config,
    services::{FirebaseAuth, FirebaseCredentials, IdentityProvider},
    views::{AppRoute, BikeDetailView, CatalogView, Navigation, Navigator, ProfileEditor, ProfileSetupView},
    AppContext,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the bike catalog
    Bikes,
    /// Show one bike
    Bike { id: String },
    /// Show your profile
    Profile,
    /// Change your name and bike
    EditProfile {
        #[arg(long)]
        name: String,
        /// Catalog id of your bike
        #[arg(long, conflicts_with = "bike_name")]
        bike_id: Option<String>,
        /// Your bike's name, if it is not in the catalog
        #[arg(long)]
        bike_name: Option<String>,
    },
    /// Create your profile
    Setup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        bike_name: String,
    },
}

impl Command {
    fn route(&self) -> AppRoute {
        match self {
            Command::Bikes => AppRoute::Dashboard,
            Command::Bike { id } => AppRoute::BikeDetail(id.clone()),
            Command::Profile | Command::EditProfile { .. } => AppRoute::Profile,
            Command::Setup { .. } => AppRoute::ProfileSetup,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let http = config.http_client()?;
    let auth = Arc::new(FirebaseAuth::new(&config, http.clone()));
    let ctx = AppContext::with_http(config, http, auth.clone());

    let session = ctx
        .identity
        .sign_in(credentials_from_env()?)
        .await
        .context("Sign-in failed")?;
    tracing::info!(uid = %session.uid, "Session ready");

    let mut navigator = Navigator::new(args.command.route());
    match args.command {
        Command::Bikes => {
            let mut view = CatalogView::new();
            view.load(&ctx, &mut navigator).await;
            print!("{}", view);
        }
        Command::Bike { id } => {
            let mut view = BikeDetailView::new(id);
            view.load(&ctx, &mut navigator).await;
            print!("{}", view);
        }
        Command::Profile => {
            let mut view = ProfileEditor::new();
            view.load(&ctx, &mut navigator).await;
            print!("{}", view);
        }
        Command::EditProfile {
            name,
            bike_id,
            bike_name,
        } => {
            let mut view = ProfileEditor::new();
            view.load(&ctx, &mut navigator).await;
            view.begin_edit(&ctx).await;
            if !view.is_editing() {
                print!("{}", view);
                bail!("Profile is not available for editing");
            }

            view.set_name(&name);
            if let Some(id) = bike_id {
                view.select_bike(&id);
            } else if let Some(bike_name) = bike_name {
                view.set_bike_name(&bike_name);
            }
            view.save(&ctx).await;
            print!("{}", view);
        }
        Command::Setup { name, bike_name } => {
            let mut view = ProfileSetupView::new();
            view.load(&ctx).await;
            view.set_name(&name);
            view.set_bike_name(&bike_name);
            if view.submit(&ctx, &mut navigator).await {
                let mut profile = ProfileEditor::new();
                profile.load(&ctx, &mut navigator).await;
                print!("{}", profile);
            } else {
                print!("{}", view);
            }
        }
    }

    for navigation in navigator.log() {
        match navigation {
            Navigation::Push(route) => println!("-> {}", route),
            Navigation::Replace(AppRoute::ProfileSetup) => println!(
                "-> {} (no profile yet; run `setup --name <NAME> --bike-name <BIKE>`)",
                AppRoute::ProfileSetup
            ),
            Navigation::Replace(route) => println!("-> {}", route),
        }
    }

    if let Some(refresh_token) = auth.refresh_token() {
        tracing::debug!(len = refresh_token.len(), "Refresh token available for reuse");
    }
    auth.sign_out().await?;
    Ok(())
}

/// Read sign-in credentials from the environment.
fn credentials_from_env() -> anyhow::Result<FirebaseCredentials> {
    if let Ok(refresh_token) = std::env::var("BIKERS_REFRESH_TOKEN") {
        return Ok(FirebaseCredentials::RefreshToken(refresh_token));
    }

    match (std::env::var("BIKERS_EMAIL"), std::env::var("BIKERS_PASSWORD")) {
        (Ok(email), Ok(password)) => Ok(FirebaseCredentials::EmailPassword { email, password }),
        _ => bail!("Set BIKERS_EMAIL and BIKERS_PASSWORD, or BIKERS_REFRESH_TOKEN"),
    }
}

/// Initialize logging on stderr; JSON when `LOG_FORMAT=json`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bikers_app=debug,info"));
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

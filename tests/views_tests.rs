// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tests for the catalog, detail, profile and setup views.

use axum::http::{Method, StatusCode};
use bikers_app::models::{Profile, Vehicle};
use bikers_app::services::IdentityProvider;
use bikers_app::views::{
    AppRoute, BikeDetailView, CatalogView, Navigation, Navigator, ProfileEditor, ProfileSetupView,
    ViewState,
};
use serde_json::json;
use std::time::Duration;

mod common;
use common::{rider, test_context, StubApi, MOCK_TOKEN};

const PROFILE_PATH: &str = "/api/user/profile";

fn stub_with_profile() -> StubApi {
    let stub = StubApi::with_catalog();
    stub.set_profile(MOCK_TOKEN, json!({"name": "Asha", "bikeId": "v1"}));
    stub
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_catalog_lists_bikes() {
    let stub = stub_with_profile();
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Dashboard);
    let mut view = CatalogView::new();
    view.load(&ctx, &mut nav).await;

    assert_eq!(view.bikes().len(), 2);
    let rendered = view.to_string();
    assert!(rendered.contains("Signed in as Asha <asha@example.com>"));
    assert!(rendered.contains("Hello, Asha!"));
    assert!(rendered.contains("- Classic 350 (Royal Enfield • Cruiser)  ₹2,15,000  Top Speed: 114 km/h"));
    assert!(rendered.contains("[/bikes/v2]"));
}

#[tokio::test]
async fn test_empty_catalog_shows_empty_state() {
    let stub = stub_with_profile();
    stub.state().bikes.clear();
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Dashboard);
    let mut view = CatalogView::new();
    view.load(&ctx, &mut nav).await;

    assert!(matches!(view.state(), ViewState::Ready(c) if c.bikes.is_empty()));
    assert!(view.to_string().contains("No bikes found."));
}

#[tokio::test]
async fn test_signed_out_catalog_asks_for_sign_in() {
    let stub = stub_with_profile();
    let (ctx, _provider) = test_context(&stub).await;

    let mut nav = Navigator::new(AppRoute::Dashboard);
    let mut view = CatalogView::new();
    view.load(&ctx, &mut nav).await;

    assert_eq!(view.state(), &ViewState::SignedOut);
    assert!(view
        .to_string()
        .contains("Please sign in with Google to see the bike list."));
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_catalog_failure_shows_banner_and_refresh_recovers() {
    let stub = stub_with_profile();
    stub.state().fail_bikes = Some((StatusCode::INTERNAL_SERVER_ERROR, Some("boom".to_string())));
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Dashboard);
    let mut view = CatalogView::new();
    view.load(&ctx, &mut nav).await;
    assert_eq!(view.state().error(), Some("boom"));
    assert!(view.to_string().contains("[!] boom"));

    stub.state().fail_bikes = None;
    view.refresh(&ctx, &mut nav).await;
    assert_eq!(view.bikes().len(), 2);
    assert_eq!(stub.requests_to(Method::GET, PROFILE_PATH), 1);
    assert_eq!(stub.requests_to(Method::GET, "/api/bikes"), 2);
}

#[tokio::test]
async fn test_refresh_retries_failed_profile_check() {
    let stub = stub_with_profile();
    stub.state().fail_profile_read = Some((
        StatusCode::INTERNAL_SERVER_ERROR,
        Some("offline".to_string()),
    ));
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Dashboard);
    let mut view = CatalogView::new();
    view.load(&ctx, &mut nav).await;
    assert_eq!(view.state().error(), Some("offline"));

    // Plain re-render keeps the failure without another request.
    view.load(&ctx, &mut nav).await;
    assert_eq!(stub.requests_to(Method::GET, PROFILE_PATH), 1);

    stub.state().fail_profile_read = None;
    view.refresh(&ctx, &mut nav).await;
    assert_eq!(view.bikes().len(), 2);
    assert_eq!(stub.requests_to(Method::GET, PROFILE_PATH), 2);
    assert_eq!(stub.requests_to(Method::GET, "/api/bikes"), 1);
    assert!(nav.log().is_empty());
}

#[tokio::test]
async fn test_sign_out_during_profile_check_shows_no_dashboard() {
    let stub = stub_with_profile();
    stub.state().profile_delay = Some(Duration::from_millis(200));
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Dashboard);
    let mut view = CatalogView::new();

    let sign_out = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        provider.sign_out().await.unwrap();
    };
    tokio::join!(view.load(&ctx, &mut nav), sign_out);

    assert_eq!(view.state(), &ViewState::SignedOut);
    let rendered = view.to_string();
    assert!(!rendered.contains("Classic 350"));
    assert!(!rendered.contains("Hello, Asha"));
    assert_eq!(stub.requests_to(Method::GET, "/api/bikes"), 0);
    assert!(nav.log().is_empty());
}

// ─── Detail ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_detail_renders_bike() {
    let stub = stub_with_profile();
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::BikeDetail("v1".to_string()));
    let mut view = BikeDetailView::new("v1");
    view.load(&ctx, &mut nav).await;

    assert_eq!(view.bike().map(|b| b.name.as_str()), Some("Classic 350"));
    let rendered = view.to_string();
    assert!(rendered.contains("Engine: 349cc single"));
    assert!(rendered.contains("Top Speed: 114 km/h"));
}

#[tokio::test]
async fn test_unknown_bike_renders_not_found_without_banner() {
    let stub = stub_with_profile();
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::BikeDetail("nope".to_string()));
    let mut view = BikeDetailView::new("nope");
    view.load(&ctx, &mut nav).await;

    assert_eq!(view.state(), &ViewState::NotFound);
    assert!(view.bike().is_none());
    assert!(view.state().error().is_none());

    let rendered = view.to_string();
    assert!(rendered.contains("Bike not found."));
    assert!(!rendered.contains("[!]"));
}

#[tokio::test]
async fn test_detail_retry_recovers_from_failed_profile_check() {
    let stub = stub_with_profile();
    stub.state().fail_profile_read = Some((StatusCode::BAD_GATEWAY, None));
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::BikeDetail("v1".to_string()));
    let mut view = BikeDetailView::new("v1");
    view.load(&ctx, &mut nav).await;
    assert_eq!(view.state().error(), Some("Failed to fetch profile"));

    stub.state().fail_profile_read = None;
    view.retry(&ctx, &mut nav).await;
    assert_eq!(view.bike().map(|b| b.name.as_str()), Some("Classic 350"));
    assert_eq!(stub.requests_to(Method::GET, PROFILE_PATH), 2);
}

#[tokio::test]
async fn test_detail_signed_out() {
    let stub = stub_with_profile();
    let (ctx, _provider) = test_context(&stub).await;

    let mut nav = Navigator::new(AppRoute::BikeDetail("v1".to_string()));
    let mut view = BikeDetailView::new("v1");
    view.load(&ctx, &mut nav).await;

    assert!(view
        .to_string()
        .contains("You must be logged in to view bike details."));
}

// ─── Profile editor ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_profile_resolves_referenced_bike() {
    let stub = stub_with_profile();
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Profile);
    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;

    assert_eq!(editor.profile().map(|p| p.name.as_str()), Some("Asha"));
    assert_eq!(editor.bike().map(|b| b.id.as_str()), Some("v1"));
    let rendered = editor.to_string();
    assert!(rendered.contains("Name: Asha"));
    assert!(rendered.contains("Your Bike: Classic 350"));
    assert!(rendered.contains("Email: asha@example.com"));
}

#[tokio::test]
async fn test_unresolvable_bike_shows_no_bike() {
    let stub = StubApi::with_catalog();
    stub.set_profile(MOCK_TOKEN, json!({"name": "Asha", "bikeId": "retired"}));
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Profile);
    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;

    assert!(editor.bike().is_none());
    assert!(editor.error().is_none());
    assert!(editor.to_string().contains("Your Bike: No bike selected"));
}

#[tokio::test]
async fn test_free_text_bike_is_shown_and_edited_as_text() {
    let stub = StubApi::with_catalog();
    stub.set_profile(MOCK_TOKEN, json!({"name": "Ravi", "bikeName": "Pulsar 150"}));
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Profile);
    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;
    assert!(editor.to_string().contains("Your Bike: Pulsar 150"));

    editor.begin_edit(&ctx).await;
    assert!(editor.to_string().contains("Bike Name: Pulsar 150"));
    assert_eq!(stub.requests_to(Method::GET, "/api/bikes"), 0);

    editor.set_bike_name("Pulsar 220");
    assert!(editor.save(&ctx).await);
    assert_eq!(
        stub.state().profiles.get(MOCK_TOKEN),
        Some(&json!({"name": "Ravi", "bikeName": "Pulsar 220"}))
    );
}

#[tokio::test]
async fn test_profile_retry_after_failed_check() {
    let stub = stub_with_profile();
    stub.state().fail_profile_read = Some((StatusCode::SERVICE_UNAVAILABLE, None));
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Profile);
    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;
    assert_eq!(editor.state().error(), Some("Failed to fetch profile"));

    stub.state().fail_profile_read = None;
    editor.retry(&ctx, &mut nav).await;
    assert!(editor.to_string().contains("Your Bike: Classic 350"));
}

#[tokio::test]
async fn test_switching_free_text_to_catalog_bike_sends_only_id() {
    let stub = StubApi::with_catalog();
    stub.set_profile(MOCK_TOKEN, json!({"name": "Ravi", "bikeName": "Pulsar 150"}));
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Profile);
    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;
    editor.begin_edit(&ctx).await;

    editor.set_bike_name("Pulsar 220");
    editor.select_bike("v2");
    assert!(editor.save(&ctx).await);

    assert_eq!(
        stub.state().profiles.get(MOCK_TOKEN),
        Some(&json!({"name": "Ravi", "bikeId": "v2"}))
    );
    assert!(editor.to_string().contains("Your Bike: Duke 390"));
}

#[tokio::test]
async fn test_edit_loads_catalog_choices() {
    let stub = stub_with_profile();
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Profile);
    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;
    editor.begin_edit(&ctx).await;

    let form = editor.form().unwrap();
    assert_eq!(form.choices.ready().map(Vec::len), Some(2));
    let rendered = editor.to_string();
    assert!(rendered.contains("[*] Classic 350 (v1)"));
    assert!(rendered.contains("[ ] Duke 390 (v2)"));
}

#[tokio::test]
async fn test_saving_same_profile_twice_is_idempotent() {
    let stub = stub_with_profile();
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Profile);
    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;

    editor.begin_edit(&ctx).await;
    editor.set_name("Asha");
    editor.select_bike("v2");
    assert!(editor.save(&ctx).await);
    let first_state = editor.state().clone();
    let first_render = editor.to_string();

    editor.begin_edit(&ctx).await;
    editor.set_name("  Asha ");
    editor.select_bike("v2");
    assert!(editor.save(&ctx).await);

    assert_eq!(editor.state(), &first_state);
    assert_eq!(editor.to_string(), first_render);
    assert!(first_render.contains("Your Bike: Duke 390"));
    assert_eq!(stub.state().profiles.len(), 1);
    assert_eq!(stub.requests_to(Method::POST, PROFILE_PATH), 2);
    // Optimistic update: the profile is not read back after saving.
    assert_eq!(stub.requests_to(Method::GET, PROFILE_PATH), 1);
}

#[tokio::test]
async fn test_saved_profile_round_trips() {
    let stub = stub_with_profile();
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Profile);
    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;
    editor.begin_edit(&ctx).await;
    editor.set_name("Asha");
    editor.select_bike("v1");
    assert!(editor.save(&ctx).await);

    let mut reloaded = ProfileEditor::new();
    reloaded.load(&ctx, &mut nav).await;
    assert_eq!(
        reloaded.profile(),
        Some(&Profile {
            name: "Asha".to_string(),
            vehicle: Some(Vehicle::Reference {
                id: "v1".to_string()
            }),
        })
    );
}

#[tokio::test]
async fn test_blank_fields_are_rejected_locally() {
    let stub = stub_with_profile();
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Profile);
    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;
    editor.begin_edit(&ctx).await;
    editor.set_name("   ");

    assert!(!editor.save(&ctx).await);
    assert_eq!(editor.error(), Some("Name and bike are required."));
    assert!(editor.is_editing());
    assert_eq!(stub.requests_to(Method::POST, PROFILE_PATH), 0);
}

#[tokio::test]
async fn test_failed_save_keeps_form_open() {
    let stub = stub_with_profile();
    stub.state().fail_profile_write = Some((StatusCode::BAD_REQUEST, None));
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Profile);
    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;
    editor.begin_edit(&ctx).await;
    editor.set_name("Asha K");

    assert!(!editor.save(&ctx).await);
    assert_eq!(editor.error(), Some("Failed to save profile"));
    assert!(editor.is_editing());
    assert!(!editor.form().unwrap().saving);
    assert_eq!(editor.profile().map(|p| p.name.as_str()), Some("Asha"));
}

#[tokio::test]
async fn test_cancel_reverts_to_saved_profile() {
    let stub = stub_with_profile();
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Profile);
    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;
    editor.begin_edit(&ctx).await;
    editor.set_name("Someone Else");
    editor.cancel();

    assert!(!editor.is_editing());
    assert!(editor.to_string().contains("Name: Asha"));
    assert_eq!(stub.requests_to(Method::POST, PROFILE_PATH), 0);
}

// ─── Setup ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_setup_flow_after_redirect() {
    let stub = StubApi::with_catalog();
    let (ctx, provider) = test_context(&stub).await;
    provider.sign_in(rider()).await.unwrap();

    let mut nav = Navigator::new(AppRoute::Dashboard);
    let mut catalog = CatalogView::new();
    catalog.load(&ctx, &mut nav).await;
    assert_eq!(nav.current(), &AppRoute::ProfileSetup);

    let mut setup = ProfileSetupView::new();
    setup.load(&ctx).await;
    setup.set_name("Ravi");
    assert!(!setup.submit(&ctx, &mut nav).await);
    assert_eq!(setup.error(), Some("Both name and bike name are required."));
    assert_eq!(stub.requests_to(Method::POST, PROFILE_PATH), 0);

    setup.set_bike_name("Pulsar 150");
    assert!(setup.submit(&ctx, &mut nav).await);
    assert_eq!(nav.current(), &AppRoute::Profile);
    assert_eq!(
        nav.log(),
        &[
            Navigation::Replace(AppRoute::ProfileSetup),
            Navigation::Push(AppRoute::Profile),
        ]
    );

    let mut editor = ProfileEditor::new();
    editor.load(&ctx, &mut nav).await;
    assert_eq!(
        editor.profile().and_then(|p| p.vehicle.clone()),
        Some(Vehicle::FreeText {
            name: "Pulsar 150".to_string()
        })
    );
}

#[tokio::test]
async fn test_setup_requires_session() {
    let stub = StubApi::with_catalog();
    let (ctx, _provider) = test_context(&stub).await;

    let mut nav = Navigator::new(AppRoute::ProfileSetup);
    let mut setup = ProfileSetupView::new();
    setup.load(&ctx).await;

    assert_eq!(setup.state(), &ViewState::SignedOut);
    assert!(!setup.submit(&ctx, &mut nav).await);
    assert!(setup
        .to_string()
        .contains("You must be logged in to set up your profile."));
}

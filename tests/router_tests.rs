use async_trait::async_trait;
use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::Path,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde_json::{Value, json};
use soboite::backend::{BackendClient, RestaurantSource, TableQuery};
use soboite::config::BackendConfig;
use soboite::error::{FetchError, SubscribeError};
use soboite::realtime::{ChangeCallback, ChangeFeed, Subscription};
use soboite::server::router::{SoboiteState, soboite_router};
use soboite::view::{ViewSources, ViewState, Views};
use soboite_schema::Restaurant;
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, time::timeout};
use tower::ServiceExt;
use url::Url;

const WAIT: Duration = Duration::from_secs(5);

struct FixedRows(Vec<Restaurant>);

#[async_trait]
impl RestaurantSource for FixedRows {
    async fn fetch(&self, _query: &TableQuery) -> Result<Vec<Restaurant>, FetchError> {
        Ok(self.0.clone())
    }
}

/// Accepts subscriptions and never notifies.
struct QuietFeed;

#[async_trait]
impl ChangeFeed for QuietFeed {
    async fn subscribe(
        &self,
        table: &str,
        _on_change: ChangeCallback,
    ) -> Result<Subscription, SubscribeError> {
        let (sub, stop) = Subscription::new(table);
        tokio::spawn(async move {
            let _ = stop.await;
        });
        Ok(sub)
    }
}

fn restaurant(id: &str, name: &str, rating: f64, coords: Option<(f64, f64)>) -> Restaurant {
    let mut r = Restaurant::new(id, name);
    r.rating = Some(rating);
    r.geo_lat = coords.map(|c| c.0);
    r.geo_lng = coords.map(|c| c.1);
    r.city = Some("Bengaluru".to_string());
    r
}

fn fixture_rows() -> Vec<Restaurant> {
    vec![
        restaurant("r1", "Middle Mess", 4.5, Some((12.97, 77.59))),
        restaurant("r2", "Nowhere Diner", 3.0, None),
        restaurant("r3", "Top Tiffin", 4.8, Some((12.93, 77.61))),
    ]
}

async fn wait_settled(view: &soboite::view::LiveViewHandle) {
    let mut rx = view.watch();
    timeout(WAIT, rx.wait_for(ViewState::is_settled))
        .await
        .expect("view should settle")
        .expect("view stopped publishing");
}

async fn app_with_rows(rows: Vec<Restaurant>) -> (Router, Views) {
    let cfg = BackendConfig::default();
    let sources = ViewSources::new(Arc::new(FixedRows(rows)), Arc::new(QuietFeed));
    let views = Views::mount(&cfg, Some(sources))
        .await
        .expect("views should mount");
    wait_settled(&views.listing).await;
    wait_settled(&views.ranking).await;

    let state = SoboiteState::new(views.clone(), None, &cfg);
    (soboite_router(state), views)
}

async fn get_uri(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed")
}

async fn body_text(resp: Response) -> String {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(body.to_vec()).expect("response body was not utf-8")
}

async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_text(resp).await).expect("response body was not json")
}

#[tokio::test]
async fn unconfigured_backend_renders_advisory() {
    let cfg = BackendConfig::default();
    let views = Views::mount(&cfg, None).await.expect("views should mount");
    let app = soboite_router(SoboiteState::new(views.clone(), None, &cfg));

    let resp = get_uri(&app, "/").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let html = body_text(resp).await;
    assert!(html.contains("Discover Restaurants"));
    assert!(html.contains("SUPABASE_URL"));
    assert!(html.contains("SUPABASE_ANON_KEY"));

    let html = body_text(get_uri(&app, "/status").await).await;
    assert!(html.contains("SUPABASE_URL"));
    assert!(html.contains("SUPABASE_ANON_KEY"));

    let resp = get_uri(&app, "/api/restaurants/r1").await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(resp).await["error"]["code"], "BACKEND_UNAVAILABLE");

    views.unmount().await;
}

#[tokio::test]
async fn rankings_order_by_rating_descending() {
    let (app, views) = app_with_rows(fixture_rows()).await;

    let ranked = body_json(get_uri(&app, "/api/rankings").await).await;
    assert_eq!(ranked["phase"], "ready");
    let ratings: Vec<f64> = ranked["items"]
        .as_array()
        .expect("items array")
        .iter()
        .map(|r| r["rating"].as_f64().expect("rating"))
        .collect();
    assert_eq!(ratings, vec![4.8, 4.5, 3.0]);

    let html = body_text(get_uri(&app, "/").await).await;
    let list_start = html.find("<ol class=\"ranking\">").expect("ranked list present");
    let list = &html[list_start..];
    let top = list.find("Top Tiffin").expect("top entry");
    let middle = list.find("Middle Mess").expect("middle entry");
    let bottom = list.find("Nowhere Diner").expect("bottom entry");
    assert!(top < middle && middle < bottom);

    views.unmount().await;
}

#[tokio::test]
async fn record_without_coordinates_is_listed_but_not_mapped() {
    let (app, views) = app_with_rows(fixture_rows()).await;

    let markers = body_json(get_uri(&app, "/api/markers").await).await;
    let ids: Vec<&str> = markers["markers"]
        .as_array()
        .expect("markers array")
        .iter()
        .map(|m| m["restaurant_id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec!["r1", "r3"]);
    assert_eq!(markers["zoom"], 13);

    let listing = body_json(get_uri(&app, "/api/restaurants").await).await;
    assert_eq!(listing["items"].as_array().expect("items").len(), 3);

    let html = body_text(get_uri(&app, "/").await).await;
    assert!(html.contains("<a class=\"card\" href=\"/?selected=r2\">"));

    views.unmount().await;
}

#[tokio::test]
async fn selection_opens_detail_modal() {
    let (app, views) = app_with_rows(fixture_rows()).await;

    let html = body_text(get_uri(&app, "/").await).await;
    assert!(!html.contains("class=\"modal\""));

    let html = body_text(get_uri(&app, "/?selected=r3").await).await;
    assert!(html.contains("class=\"modal\""));
    assert!(html.contains("<dt>restaurant_id</dt><dd>r3</dd>"));
    assert!(html.contains("<a href=\"/\">Close</a>"));

    let resp = get_uri(&app, "/api/restaurants/r3").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["name"], "Top Tiffin");

    let resp = get_uri(&app, "/api/restaurants/missing").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "No restaurant with id missing.");

    views.unmount().await;
}

#[tokio::test]
async fn unknown_id_is_not_found_when_views_have_sources_but_no_status_client() {
    let (app, views) = app_with_rows(fixture_rows()).await;

    let resp = get_uri(&app, "/api/restaurants/r404").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"]["code"], "NOT_FOUND");

    views.unmount().await;
}

#[tokio::test]
async fn empty_table_says_no_restaurants() {
    let (app, views) = app_with_rows(Vec::new()).await;

    let html = body_text(get_uri(&app, "/").await).await;
    assert!(html.contains("No restaurants found."));
    assert!(!html.contains("Loading restaurants…"));

    views.unmount().await;
}

#[tokio::test]
async fn unknown_paths_are_not_found_and_request_id_is_echoed() {
    let (app, views) = app_with_rows(fixture_rows()).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/nowhere")
                .header("x-request-id", "trace-123")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "trace-123");

    views.unmount().await;
}

#[tokio::test]
async fn events_stream_announces_refreshes() {
    let (app, views) = app_with_rows(fixture_rows()).await;

    let resp = get_uri(&app, "/events").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let mut events = resp.into_body().into_data_stream().eventsource();

    views.listing.refresh();

    let event = timeout(WAIT, events.next())
        .await
        .expect("refresh event within timeout")
        .expect("stream ended")
        .expect("valid event");
    assert_eq!(event.event, "refresh");
    assert_eq!(event.data, "listing");

    views.unmount().await;
}

#[tokio::test]
async fn change_settling_both_views_reloads_once() {
    let (app, views) = app_with_rows(fixture_rows()).await;

    let resp = get_uri(&app, "/events").await;
    let mut events = resp.into_body().into_data_stream().eventsource();

    views.listing.refresh();
    views.ranking.refresh();

    let event = timeout(WAIT, events.next())
        .await
        .expect("refresh event within timeout")
        .expect("stream ended")
        .expect("valid event");
    assert_eq!(event.event, "refresh");
    assert_eq!(event.data, "listing,ranking");

    assert!(
        timeout(Duration::from_millis(600), events.next())
            .await
            .is_err(),
        "one burst of settles should produce a single refresh"
    );

    views.unmount().await;
}

async fn table_handler(Path(table): Path<String>) -> Response {
    match table.as_str() {
        "employee" => Json(json!([{ "id": 1, "first_name": "Asha" }])).into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "code": "42P01",
                "message": "relation \"public.ghost\" does not exist"
            })),
        )
            .into_response(),
    }
}

async fn status_app(status_table: &str) -> (Router, Views) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let stub = Router::new().route("/rest/v1/{table}", get(table_handler));
    tokio::spawn(async move {
        axum::serve(listener, stub).await.expect("server run");
    });
    let base = Url::parse(&format!("http://{addr}")).expect("valid base url");

    let cfg = BackendConfig {
        status_table: status_table.to_string(),
        ..BackendConfig::default()
    };
    let http = soboite::backend::build_http_client(&cfg).expect("http client");
    let client = BackendClient::new(Some(base.as_str()), Some("anon"), http).expect("handle");

    let sources = ViewSources::new(Arc::new(FixedRows(Vec::new())), Arc::new(QuietFeed));
    let views = Views::mount(&cfg, Some(sources))
        .await
        .expect("views should mount");
    let app = soboite_router(SoboiteState::new(views.clone(), Some(client), &cfg));
    (app, views)
}

#[tokio::test]
async fn status_page_reports_rows_or_error() {
    let (app, views) = status_app("employee").await;
    let html = body_text(get_uri(&app, "/status").await).await;
    assert!(html.contains("Connected to Supabase — table: <strong>employee</strong>"));
    assert!(html.contains("Rows returned: 1"));
    assert!(html.contains("Asha"));
    views.unmount().await;

    let (app, views) = status_app("ghost").await;
    let html = body_text(get_uri(&app, "/status").await).await;
    assert!(html.contains("Error: relation &quot;public.ghost&quot; does not exist"));
    views.unmount().await;
}

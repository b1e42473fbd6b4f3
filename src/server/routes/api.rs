use crate::backend::MISSING_CONFIG_ADVISORY;
use crate::error::{FetchError, SoboiteError};
use crate::render::{MapView, map_view, rank_by_rating};
use crate::server::router::SoboiteState;
use crate::view::{Phase, ViewState};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use soboite_schema::{Restaurant, RestaurantId};

pub fn router() -> Router<SoboiteState> {
    Router::new()
        .route("/api/restaurants", get(restaurants_handler))
        .route("/api/restaurants/{id}", get(restaurant_handler))
        .route("/api/rankings", get(rankings_handler))
        .route("/api/markers", get(markers_handler))
}

/// Ranking view with its rows re-ordered by rating.
#[derive(Serialize)]
struct RankedView {
    phase: Phase,
    loading: bool,
    items: Vec<Restaurant>,
    error: Option<String>,
}

async fn restaurants_handler(State(state): State<SoboiteState>) -> Json<ViewState<Restaurant>> {
    Json(state.views.listing.snapshot())
}

async fn restaurant_handler(
    State(state): State<SoboiteState>,
    Path(id): Path<String>,
) -> Result<Json<Restaurant>, SoboiteError> {
    let id = RestaurantId::new(id);
    let listing = state.views.listing.snapshot();
    if let Some(found) = listing.find(&id) {
        return Ok(Json(found.clone()));
    }
    if let Some(found) = state.views.ranking.snapshot().find(&id) {
        return Ok(Json(found.clone()));
    }

    // A view mounted without sources settles into the advisory and never holds rows.
    if listing.error() == Some(MISSING_CONFIG_ADVISORY) {
        return Err(FetchError::Unavailable.into());
    }
    Err(SoboiteError::NotFound(id.to_string()))
}

async fn rankings_handler(State(state): State<SoboiteState>) -> Json<RankedView> {
    let view = state.views.ranking.snapshot();
    Json(RankedView {
        phase: view.phase(),
        loading: view.is_loading(),
        items: rank_by_rating(view.items()).into_iter().cloned().collect(),
        error: view.error().map(str::to_string),
    })
}

async fn markers_handler(State(state): State<SoboiteState>) -> Json<MapView> {
    Json(map_view(state.views.listing.snapshot().items()))
}

use super::selection_href;
use crate::backend::MISSING_CONFIG_ADVISORY;
use crate::render::{HomePage, StatusPanel, home_page, status_page};
use crate::server::router::SoboiteState;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use serde::Deserialize;
use soboite_schema::RestaurantId;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
pub(super) struct HomeParams {
    selected: Option<String>,
}

pub fn router() -> Router<SoboiteState> {
    Router::new()
        .route("/", get(home_handler))
        .route("/status", get(status_handler))
}

async fn home_handler(
    State(state): State<SoboiteState>,
    Query(params): Query<HomeParams>,
) -> Html<String> {
    let listing = state.views.listing.snapshot();
    let ranking = state.views.ranking.snapshot();

    let selected_id = params
        .selected
        .filter(|s| !s.is_empty())
        .map(RestaurantId::new);
    let selected = selected_id
        .as_ref()
        .and_then(|id| listing.find(id).or_else(|| ranking.find(id)));
    if let (Some(id), None) = (&selected_id, selected) {
        debug!(restaurant_id = %id, "Selected restaurant is not in the current views");
    }

    let page = HomePage {
        listing: &listing,
        ranking: &ranking,
        selected,
        close_href: "/",
    };
    Html(home_page(&page, &selection_href))
}

async fn status_handler(State(state): State<SoboiteState>) -> Html<String> {
    let panel = match &state.backend {
        None => StatusPanel::Unavailable(MISSING_CONFIG_ADVISORY.to_string()),
        Some(client) => match client.select_raw(&state.status_query).await {
            Ok(rows) => StatusPanel::Rows {
                table: state.status_query.table().to_string(),
                rows,
            },
            Err(e) => StatusPanel::Failed(e.to_string()),
        },
    };
    Html(status_page(&panel))
}

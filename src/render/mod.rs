//! Server-side HTML for the restaurant views.
//!
//! Every renderer is a pure function of view state. Selecting a record is expressed through a
//! [`Selector`]: the renderer asks it for the link target of each record and never decides
//! navigation itself.

mod card;
mod detail;
mod home;
mod html;
mod map;
mod ranking;
mod status;

use soboite_schema::RestaurantId;

pub use card::{card, card_grid};
pub use detail::detail_modal;
pub use home::{HomePage, home_page};
pub use html::{escape, layout};
pub use map::{DEFAULT_CENTER, DEFAULT_ZOOM, MapMarker, MapView, map_panel, map_view};
pub use ranking::{rank_by_rating, ranked_list};
pub use status::{StatusPanel, status_page};

/// Maps a record identifier to the link that selects it.
pub type Selector<'a> = &'a dyn Fn(&RestaurantId) -> String;

/// Placeholder for absent ratings and prices.
pub(crate) const DASH: &str = "—";

pub(crate) fn rating_label(rating: Option<f64>) -> String {
    rating.map_or_else(|| DASH.to_string(), |r| r.to_string())
}

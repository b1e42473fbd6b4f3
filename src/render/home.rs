use super::{Selector, card_grid, detail_modal, escape, layout, map_panel, map_view, ranked_list};
use crate::view::ViewState;
use soboite_schema::Restaurant;
use std::fmt::Write as _;

/// Inputs of the home page: the listing and ranking snapshots plus the selected record.
pub struct HomePage<'a> {
    pub listing: &'a ViewState<Restaurant>,
    pub ranking: &'a ViewState<Restaurant>,
    pub selected: Option<&'a Restaurant>,
    /// Target of the modal's close link.
    pub close_href: &'a str,
}

pub fn home_page(page: &HomePage<'_>, select: Selector<'_>) -> String {
    let mut body = String::from(
        "<main><section><h1>Discover Restaurants</h1>\
         <p>Live rankings and map powered by Supabase</p>",
    );

    if !page.listing.is_settled() {
        body.push_str("<p>Loading restaurants…</p>");
    }
    if let Some(error) = page.listing.error() {
        let _ = write!(body, "<p class=\"error\">{}</p>", escape(error));
    }
    body.push_str(&card_grid(page.listing, select));

    let _ = write!(
        body,
        "</section><aside><h2>Live Rankings</h2>{}<h2>Map</h2>{}</aside></main>",
        ranked_list(page.ranking, select),
        map_panel(&map_view(page.listing.items()), select),
    );

    if let Some(r) = page.selected {
        body.push_str(&detail_modal(r, page.close_href));
    }

    layout("Soboite", &body, true)
}

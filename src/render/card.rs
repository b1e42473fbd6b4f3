use super::{DASH, Selector, escape, rating_label};
use crate::view::ViewState;
use soboite_schema::Restaurant;
use std::fmt::Write as _;

const SHOWN_CUISINES: usize = 3;
const SHOWN_PICKS: usize = 2;

/// One restaurant card linking to `href`.
pub fn card(r: &Restaurant, href: &str) -> String {
    let mut out = String::new();
    let _ = write!(out, "<a class=\"card\" href=\"{}\">", escape(href));

    match r.hero_image_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(src) => {
            let _ = write!(
                out,
                "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                escape(src),
                escape(&r.name)
            );
        }
        None => out.push_str("<div class=\"noimg\">No image</div>"),
    }

    let _ = write!(
        out,
        "<h3>{} <small>{}</small></h3>",
        escape(&r.name),
        r.price_label()
    );

    out.push_str("<div class=\"tags\">");
    for cuisine in r.cuisines.iter().take(SHOWN_CUISINES) {
        let _ = write!(out, "<span>{}</span>", escape(cuisine));
    }
    out.push_str("</div>");

    let _ = write!(
        out,
        "<p>{} · {}</p><p>Rating: {}</p>",
        escape(r.area.as_deref().unwrap_or("Unknown area")),
        escape(r.city.as_deref().unwrap_or("Unknown city")),
        rating_label(r.rating)
    );

    let picks = if r.top_picks.is_empty() {
        DASH.to_string()
    } else {
        escape(
            &r.top_picks
                .iter()
                .take(SHOWN_PICKS)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        )
    };
    let _ = write!(out, "<p><strong>Top Picks:</strong> {picks}</p></a>");
    out
}

/// Cards for every record, in view order.
pub fn card_grid(view: &ViewState<Restaurant>, select: Selector<'_>) -> String {
    let mut out = String::from("<section class=\"grid\">");
    for r in view.items() {
        out.push_str(&card(r, &select(&r.restaurant_id)));
    }
    out.push_str("</section>");
    out
}

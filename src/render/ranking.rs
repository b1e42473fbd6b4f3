use super::{Selector, escape, rating_label};
use crate::view::ViewState;
use soboite_schema::Restaurant;
use std::cmp::Ordering;
use std::fmt::Write as _;

/// Records by rating, highest first. Unrated records go last; ties keep their query order.
pub fn rank_by_rating(items: &[Restaurant]) -> Vec<&Restaurant> {
    let mut ranked: Vec<&Restaurant> = items.iter().collect();
    ranked.sort_by(|a, b| match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ranked
}

pub fn ranked_list(view: &ViewState<Restaurant>, select: Selector<'_>) -> String {
    if let Some(error) = view.error() {
        return format!("<p class=\"error\">{}</p>", escape(error));
    }
    if view.items().is_empty() {
        if view.is_settled() {
            return "<p>No restaurants found.</p>".to_string();
        }
        return "<p>Loading restaurants…</p>".to_string();
    }

    let mut out = String::from("<ol class=\"ranking\">");
    for (rank, r) in rank_by_rating(view.items()).into_iter().enumerate() {
        let _ = write!(
            out,
            "<li><span>{}.</span> <strong>{}</strong> <small>{}</small> \
             <span>{}</span> <a href=\"{}\">View</a></li>",
            rank + 1,
            escape(&r.name),
            escape(r.locality()),
            rating_label(r.rating),
            escape(&select(&r.restaurant_id)),
        );
    }
    out.push_str("</ol>");
    out
}

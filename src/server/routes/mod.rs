pub mod api;
pub mod events;
pub mod pages;

use url::form_urlencoded;

/// Home-page link that opens the detail modal for `id`.
pub(crate) fn selection_href(id: &soboite_schema::RestaurantId) -> String {
    let encoded: String = form_urlencoded::byte_serialize(id.as_str().as_bytes()).collect();
    format!("/?selected={encoded}")
}

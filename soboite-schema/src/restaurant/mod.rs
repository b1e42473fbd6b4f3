mod lax;
mod record;

pub use record::{Restaurant, RestaurantId, VisitMeta};

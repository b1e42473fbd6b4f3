pub mod postgrest;
pub mod realtime;
pub mod restaurant;

pub use postgrest::PostgrestErrorBody;
pub use realtime::{ChangeFilter, PhoenixMessage};
pub use restaurant::{Restaurant, RestaurantId, VisitMeta};

//! Live views: each mounted component's view state, kept current by fetch and change feed.

mod bootstrap;
mod live;
mod sources;
mod state;

pub use bootstrap::Views;
pub use live::{LiveViewHandle, LiveViewMessage, mount};
pub use sources::ViewSources;
pub use state::{Phase, ViewState};

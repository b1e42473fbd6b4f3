pub mod backend;
pub mod config;
pub mod error;
pub mod realtime;
pub mod render;
pub mod server;
pub mod view;

pub(crate) mod utils;

pub use backend::{BackendClient, MISSING_CONFIG_ADVISORY};
pub use error::SoboiteError;
pub use view::{ViewSources, Views};

mod backend;
mod realtime;
mod soboite;

pub use backend::FetchError;
pub use realtime::{ReleaseError, SubscribeError};
pub use soboite::{ApiErrorBody, ApiErrorObject, SoboiteError};

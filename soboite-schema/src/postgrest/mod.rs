mod error;

pub use error::PostgrestErrorBody;

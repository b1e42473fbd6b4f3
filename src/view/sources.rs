use crate::backend::{BackendClient, RestaurantSource};
use crate::realtime::ChangeFeed;
use std::sync::Arc;

/// What a live view reads from: a row source and a change feed for the same backend.
#[derive(Clone)]
pub struct ViewSources {
    pub rows: Arc<dyn RestaurantSource>,
    pub changes: Arc<dyn ChangeFeed>,
}

impl ViewSources {
    pub fn new(rows: Arc<dyn RestaurantSource>, changes: Arc<dyn ChangeFeed>) -> Self {
        Self { rows, changes }
    }

    /// REST reads and realtime notifications from the same project.
    pub fn from_client(client: &BackendClient) -> Self {
        Self {
            rows: Arc::new(client.clone()),
            changes: Arc::new(client.realtime()),
        }
    }
}

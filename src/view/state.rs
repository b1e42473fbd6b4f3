use serde::Serialize;
use soboite_schema::{Restaurant, RestaurantId};
use std::fmt::Display;

/// `Idle → Loading → Ready | Error`, back to `Loading` on every refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Snapshot of one component: its rows plus loading and error flags.
///
/// Results always replace the rows wholesale. A failed load leaves no rows behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState<T> {
    phase: Phase,
    loading: bool,
    items: Vec<T>,
    error: Option<String>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            loading: false,
            items: Vec::new(),
            error: None,
        }
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True once a load finished, whatever its outcome, and no other load is running.
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Ready | Phase::Error)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Enters `Loading`. Rows from the previous result stay visible until replaced.
    pub fn begin_load(&mut self) {
        self.phase = Phase::Loading;
        self.loading = true;
        self.error = None;
    }

    pub fn succeed(&mut self, items: Vec<T>) {
        self.phase = Phase::Ready;
        self.loading = false;
        self.items = items;
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = Phase::Error;
        self.loading = false;
        self.items = Vec::new();
        self.error = Some(message.into());
    }

    pub fn settle<E: Display>(&mut self, result: Result<Vec<T>, E>) {
        match result {
            Ok(items) => self.succeed(items),
            Err(e) => self.fail(e.to_string()),
        }
    }
}

impl ViewState<Restaurant> {
    pub fn find(&self, id: &RestaurantId) -> Option<&Restaurant> {
        self.items.iter().find(|r| &r.restaurant_id == id)
    }
}

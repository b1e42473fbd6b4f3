//! Row-change notifications.
//!
//! Callers depend only on [`ChangeFeed`]; [`RealtimeAdapter`] is the implementation over the
//! hosted service's websocket.

mod phoenix;
mod subscription;

pub use phoenix::RealtimeAdapter;
pub use subscription::Subscription;

use crate::error::SubscribeError;
use async_trait::async_trait;
use std::sync::Arc;

/// Invoked once per change notification. Carries no payload: insert, update and delete
/// all mean "something changed".
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Starts watching every row of `table`. The watch lasts until the returned
    /// subscription is released or dropped.
    async fn subscribe(
        &self,
        table: &str,
        on_change: ChangeCallback,
    ) -> Result<Subscription, SubscribeError>;
}

use async_trait::async_trait;
use axum::http::StatusCode;
use soboite::backend::{Direction, MISSING_CONFIG_ADVISORY, RestaurantSource, TableQuery};
use soboite::error::{FetchError, SubscribeError};
use soboite::realtime::{ChangeCallback, ChangeFeed, Subscription};
use soboite::view::{LiveViewHandle, Phase, ViewSources, ViewState, mount};
use soboite_schema::Restaurant;
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{sync::Semaphore, time::timeout};

const WAIT: Duration = Duration::from_secs(5);

/// Row source answering from a script. Each fetch waits for one permit on `gate`.
struct ScriptedSource {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Result<Vec<Restaurant>, FetchError>>>,
    gate: Semaphore,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Vec<Restaurant>, FetchError>>) -> Arc<Self> {
        Self::gated(script, Semaphore::MAX_PERMITS)
    }

    fn gated(script: Vec<Result<Vec<Restaurant>, FetchError>>, permits: usize) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(script.into()),
            gate: Semaphore::new(permits),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RestaurantSource for ScriptedSource {
    async fn fetch(&self, query: &TableQuery) -> Result<Vec<Restaurant>, FetchError> {
        assert_eq!(query.table(), "restaurants");
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.acquire().await.expect("gate closed").forget();
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Change feed whose notifications are fired by the test.
#[derive(Default)]
struct ManualFeed {
    fail: bool,
    callbacks: Mutex<Vec<ChangeCallback>>,
    released: Arc<AtomicUsize>,
}

impl ManualFeed {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn fire(&self) {
        for cb in self.callbacks.lock().unwrap().iter() {
            cb();
        }
    }

    async fn wait_subscribed(&self) {
        timeout(WAIT, async {
            while self.callbacks.lock().unwrap().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("view should subscribe");
    }

    fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChangeFeed for ManualFeed {
    async fn subscribe(
        &self,
        table: &str,
        on_change: ChangeCallback,
    ) -> Result<Subscription, SubscribeError> {
        if self.fail {
            return Err(SubscribeError::Endpoint("realtime disabled".to_string()));
        }
        let (sub, stop) = Subscription::new(table);
        let released = self.released.clone();
        tokio::spawn(async move {
            if stop.await.is_ok() {
                released.fetch_add(1, Ordering::SeqCst);
            }
        });
        self.callbacks.lock().unwrap().push(on_change);
        Ok(sub)
    }
}

fn rows(ids: &[&str]) -> Vec<Restaurant> {
    ids.iter().map(|id| Restaurant::new(*id, *id)).collect()
}

fn ids(view: &ViewState<Restaurant>) -> Vec<String> {
    view.items()
        .iter()
        .map(|r| r.restaurant_id.to_string())
        .collect()
}

fn query() -> TableQuery {
    TableQuery::new("restaurants")
        .order_by("rating", Direction::Descending)
        .limit(200)
}

async fn wait_for(
    view: &LiveViewHandle,
    pred: impl FnMut(&ViewState<Restaurant>) -> bool,
) -> ViewState<Restaurant> {
    let mut rx = view.watch();
    timeout(WAIT, rx.wait_for(pred))
        .await
        .expect("view state did not reach the expected shape in time")
        .expect("view stopped publishing")
        .clone()
}

async fn mount_with(
    source: Arc<ScriptedSource>,
    feed: Arc<ManualFeed>,
) -> LiveViewHandle {
    let sources = ViewSources::new(source, feed);
    mount("test", query(), Some(sources))
        .await
        .expect("mount should succeed")
}

#[tokio::test]
async fn mount_loads_rows_in_query_order() {
    let source = ScriptedSource::gated(vec![Ok(rows(&["c", "a", "b"]))], 0);
    let feed = Arc::new(ManualFeed::default());
    let view = mount_with(source.clone(), feed).await;

    let loading = wait_for(&view, ViewState::is_loading).await;
    assert_eq!(loading.phase(), Phase::Loading);
    assert!(loading.items().is_empty());

    source.gate.add_permits(1);
    let ready = wait_for(&view, ViewState::is_settled).await;
    assert_eq!(ready.phase(), Phase::Ready);
    assert!(!ready.is_loading());
    assert_eq!(ready.error(), None);
    assert_eq!(ids(&ready), vec!["c", "a", "b"]);
    assert_eq!(source.calls(), 1);

    view.unmount().await;
}

#[tokio::test]
async fn failed_refresh_clears_rows_and_keeps_message() {
    let source = ScriptedSource::new(vec![
        Ok(rows(&["a", "b"])),
        Err(FetchError::Backend {
            status: StatusCode::BAD_REQUEST,
            code: Some("42703".to_string()),
            message: "column restaurants.ratingx does not exist".to_string(),
        }),
    ]);
    let feed = Arc::new(ManualFeed::default());
    let view = mount_with(source.clone(), feed.clone()).await;

    let ready = wait_for(&view, |s| s.phase() == Phase::Ready).await;
    assert_eq!(ids(&ready), vec!["a", "b"]);

    feed.wait_subscribed().await;
    feed.fire();

    let failed = wait_for(&view, |s| s.phase() == Phase::Error).await;
    assert!(failed.items().is_empty());
    assert!(!failed.is_loading());
    assert_eq!(
        failed.error(),
        Some("column restaurants.ratingx does not exist")
    );

    view.unmount().await;
}

#[tokio::test]
async fn change_notification_refetches_and_replaces_state() {
    let source = ScriptedSource::new(vec![Ok(rows(&["a", "b"])), Ok(rows(&["a", "b"]))]);
    let feed = Arc::new(ManualFeed::default());
    let view = mount_with(source.clone(), feed.clone()).await;

    wait_for(&view, |s| s.phase() == Phase::Ready).await;
    feed.wait_subscribed().await;
    assert_eq!(source.calls(), 1);

    let mut rx = view.watch();
    rx.borrow_and_update();
    feed.fire();

    // The unchanged result is still republished: loading, then ready again.
    timeout(WAIT, rx.changed())
        .await
        .expect("refresh should publish")
        .expect("view stopped publishing");
    let ready = wait_for(&view, |s| s.phase() == Phase::Ready && !s.is_loading()).await;
    assert_eq!(ids(&ready), vec!["a", "b"]);
    assert_eq!(source.calls(), 2);

    view.unmount().await;
}

#[tokio::test]
async fn missing_backend_settles_into_advisory() {
    let view = mount("test", query(), None)
        .await
        .expect("mount should succeed");

    let state = view.snapshot();
    assert_eq!(state.phase(), Phase::Error);
    assert!(state.items().is_empty());
    let message = state.error().expect("advisory present");
    assert_eq!(message, MISSING_CONFIG_ADVISORY);
    assert!(message.contains("SUPABASE_URL"));
    assert!(message.contains("SUPABASE_ANON_KEY"));

    view.unmount().await;
}

#[tokio::test]
async fn subscription_failure_degrades_to_fetch_once() {
    let source = ScriptedSource::new(vec![Ok(rows(&["x"]))]);
    let feed = Arc::new(ManualFeed::failing());
    let view = mount_with(source.clone(), feed).await;

    let ready = wait_for(&view, |s| s.phase() == Phase::Ready).await;
    assert_eq!(ids(&ready), vec!["x"]);
    assert_eq!(ready.error(), None);
    assert_eq!(source.calls(), 1);

    view.unmount().await;
}

#[tokio::test]
async fn unmount_releases_subscription_and_drops_late_responses() {
    let source = ScriptedSource::gated(vec![Ok(rows(&["a"])), Ok(rows(&["late"]))], 1);
    let feed = Arc::new(ManualFeed::default());
    let view = mount_with(source.clone(), feed.clone()).await;

    wait_for(&view, |s| s.phase() == Phase::Ready).await;
    feed.wait_subscribed().await;

    feed.fire();
    wait_for(&view, ViewState::is_loading).await;

    view.unmount().await;
    timeout(WAIT, async {
        while feed.released() == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscription should be released on unmount");

    source.gate.add_permits(1);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let last = view.snapshot();
    assert_eq!(last.phase(), Phase::Loading);
    assert_eq!(ids(&last), vec!["a"]);

    view.refresh();
    assert_eq!(source.calls(), 2);
    assert_eq!(feed.released(), 1);
}

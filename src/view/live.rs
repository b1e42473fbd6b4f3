use super::{ViewSources, ViewState};
use crate::backend::TableQuery;
use crate::error::{FetchError, SoboiteError};
use crate::realtime::{ChangeCallback, Subscription};
use ractor::{Actor, ActorProcessingErr, ActorRef};
use soboite_schema::Restaurant;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Messages handled by a live view actor.
#[derive(Debug)]
pub enum LiveViewMessage {
    /// Start a fetch. Sent on mount, on every change notification, and on demand.
    Refresh,

    // Internal messages (sent by the actor's own fetch tasks)
    /// A fetch finished; its result replaces the view state.
    Loaded(Result<Vec<Restaurant>, FetchError>),
    /// The change subscription is live; the view now owns it.
    Subscribed(Subscription),
}

/// Handle for reading and driving one mounted live view.
#[derive(Clone)]
pub struct LiveViewHandle {
    actor: ActorRef<LiveViewMessage>,
    name: Arc<str>,
    state: watch::Receiver<ViewState<Restaurant>>,
}

impl LiveViewHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest view state.
    pub fn snapshot(&self) -> ViewState<Restaurant> {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published view state.
    pub fn watch(&self) -> watch::Receiver<ViewState<Restaurant>> {
        self.state.clone()
    }

    /// Ask for a fresh fetch. Ignored once unmounted.
    pub fn refresh(&self) {
        let _ = ractor::cast!(self.actor, LiveViewMessage::Refresh);
    }

    /// Stops the view and releases its subscription. Responses still in flight are dropped.
    pub async fn unmount(&self) {
        if let Err(e) = self.actor.stop_and_wait(None, None).await {
            debug!(view = %self.name, error = %e, "LiveView already stopped");
        }
    }
}

struct LiveViewState {
    name: Arc<str>,
    query: TableQuery,
    sources: Option<ViewSources>,
    view: ViewState<Restaurant>,
    publish: watch::Sender<ViewState<Restaurant>>,
    subscription: Option<Subscription>,
}

impl LiveViewState {
    fn publish(&self) {
        self.publish.send_replace(self.view.clone());
    }
}

struct LiveViewActor;

type LiveViewArgs = (
    Arc<str>,
    TableQuery,
    Option<ViewSources>,
    watch::Sender<ViewState<Restaurant>>,
);

#[ractor::async_trait]
impl Actor for LiveViewActor {
    type Msg = LiveViewMessage;
    type State = LiveViewState;
    type Arguments = LiveViewArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        (name, query, sources, publish): Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let mut state = LiveViewState {
            name,
            query,
            sources,
            view: ViewState::new(),
            publish,
            subscription: None,
        };

        if state.sources.is_none() {
            state.view.fail(FetchError::Unavailable.to_string());
            state.publish();
        }

        Ok(state)
    }

    async fn post_start(
        &self,
        myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let Some(sources) = state.sources.clone() else {
            info!(view = %state.name, "LiveView mounted without backend");
            return Ok(());
        };

        ractor::cast!(myself, LiveViewMessage::Refresh)
            .map_err(|e| ActorProcessingErr::from(format!("initial refresh failed: {e}")))?;

        let actor = myself.clone();
        let on_change: ChangeCallback = Arc::new(move || {
            let _ = ractor::cast!(actor, LiveViewMessage::Refresh);
        });

        let name = state.name.clone();
        let table = state.query.table().to_string();
        tokio::spawn(async move {
            match sources.changes.subscribe(&table, on_change).await {
                Ok(sub) => {
                    // A view unmounted meanwhile drops the message, and with it the subscription.
                    let _ = ractor::cast!(myself, LiveViewMessage::Subscribed(sub));
                }
                Err(e) => {
                    // Degrades to fetch-once; nothing is shown to the user.
                    warn!(
                        view = %name,
                        table = %table,
                        error = %e,
                        "LiveView change subscription failed"
                    );
                }
            }
        });

        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            LiveViewMessage::Refresh => {
                self.handle_refresh(myself, state);
            }
            LiveViewMessage::Loaded(result) => {
                self.handle_loaded(state, result);
            }
            LiveViewMessage::Subscribed(sub) => {
                self.handle_subscribed(state, sub);
            }
        }
        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        if let Some(sub) = state.subscription.take() {
            sub.release();
        }
        info!(view = %state.name, "LiveView unmounted");
        Ok(())
    }
}

impl LiveViewActor {
    fn handle_refresh(&self, myself: ActorRef<LiveViewMessage>, state: &mut LiveViewState) {
        let Some(sources) = state.sources.as_ref() else {
            return;
        };

        state.view.begin_load();
        state.publish();

        let rows = sources.rows.clone();
        let query = state.query.clone();
        let name = state.name.clone();
        tokio::spawn(async move {
            let result = rows.fetch(&query).await;
            if ractor::cast!(myself, LiveViewMessage::Loaded(result)).is_err() {
                debug!(view = %name, "Discarding response for unmounted LiveView");
            }
        });
    }

    fn handle_loaded(
        &self,
        state: &mut LiveViewState,
        result: Result<Vec<Restaurant>, FetchError>,
    ) {
        match &result {
            Ok(rows) => debug!(view = %state.name, rows = rows.len(), "LiveView loaded"),
            Err(e) => warn!(view = %state.name, error = %e, "LiveView load failed"),
        }
        state.view.settle(result);
        state.publish();
    }

    fn handle_subscribed(&self, state: &mut LiveViewState, sub: Subscription) {
        if let Some(previous) = state.subscription.take() {
            previous.release();
        }
        info!(
            view = %state.name,
            table = sub.table(),
            subscription = %sub.id(),
            "LiveView subscribed to changes"
        );
        state.subscription = Some(sub);
    }
}

/// Mounts a live view over `query`.
///
/// Without `sources` the view settles immediately into the configuration advisory and never
/// fetches. Otherwise it fetches once, subscribes to changes on the query's table, and
/// re-fetches on every change.
pub async fn mount(
    name: &str,
    query: TableQuery,
    sources: Option<ViewSources>,
) -> Result<LiveViewHandle, SoboiteError> {
    let name: Arc<str> = Arc::from(name);
    let (publish, state) = watch::channel(ViewState::new());

    let (actor, _jh) = Actor::spawn(
        None,
        LiveViewActor,
        (name.clone(), query, sources, publish),
    )
    .await
    .map_err(|e| SoboiteError::RactorError(format!("LiveView spawn failed: {e}")))?;

    Ok(LiveViewHandle { actor, name, state })
}

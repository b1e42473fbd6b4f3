use crate::server::router::SoboiteState;
use crate::view::LiveViewHandle;
use axum::{
    Router,
    extract::State,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use futures::Stream;
use std::{convert::Infallible, time::Duration};
use tokio_stream::{StreamExt, wrappers::WatchStream};

/// Settles closer together than this collapse into one `refresh`.
const REFRESH_WINDOW: Duration = Duration::from_millis(250);
const REFRESH_BURST: usize = 16;

pub fn router() -> Router<SoboiteState> {
    Router::new().route("/events", get(events_handler))
}

/// The view's name each time it settles after the stream was opened.
fn settled(view: &LiveViewHandle) -> impl Stream<Item = String> + use<> {
    let name = view.name().to_string();
    WatchStream::from_changes(view.watch())
        .filter(|state| state.is_settled())
        .map(move |_| name.clone())
}

fn refresh_event(mut names: Vec<String>) -> Result<Event, Infallible> {
    names.sort();
    names.dedup();
    Ok(Event::default().event("refresh").data(names.join(",")))
}

/// One `refresh` per burst of settles: a change notification settles every view, but the
/// page reloads once.
async fn events_handler(State(state): State<SoboiteState>) -> impl IntoResponse {
    let stream = settled(&state.views.listing)
        .merge(settled(&state.views.ranking))
        .chunks_timeout(REFRESH_BURST, REFRESH_WINDOW)
        .map(refresh_event);
    Sse::new(stream).keep_alive(KeepAlive::default())
}

use super::{ChangeCallback, ChangeFeed, Subscription};
use crate::error::SubscribeError;
use crate::utils::logging::with_pretty_json_debug;
use async_trait::async_trait;
use futures::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use soboite_schema::realtime::{
    ChangeFilter, EVENT_CLOSE, EVENT_ERROR, PhoenixMessage, table_topic,
};
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpStream, sync::oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const SCHEMA: &str = "public";
const PROTOCOL_VSN: &str = "1.0.0";
const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(30);
const MIN_HEARTBEAT: Duration = Duration::from_millis(10);

/// [`ChangeFeed`] over the realtime websocket (Phoenix channels, JSON v1 frames).
///
/// Each subscription owns one socket and one channel joined to `realtime:public:{table}`.
#[derive(Clone)]
pub struct RealtimeAdapter {
    base_url: Url,
    anon_key: Arc<str>,
    heartbeat: Duration,
}

impl RealtimeAdapter {
    pub fn new(base_url: Url, anon_key: Arc<str>) -> Self {
        Self {
            base_url,
            anon_key,
            heartbeat: DEFAULT_HEARTBEAT,
        }
    }

    /// Heartbeat period, raised to at least 10 ms.
    #[must_use]
    pub fn with_heartbeat(mut self, every: Duration) -> Self {
        self.heartbeat = every.max(MIN_HEARTBEAT);
        self
    }

    /// `ws(s)://{host}/realtime/v1/websocket?apikey={key}&vsn=1.0.0`.
    pub fn websocket_url(&self) -> Result<Url, SubscribeError> {
        let mut url = self.base_url.clone();
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            "http" | "ws" => "ws",
            other => {
                return Err(SubscribeError::Endpoint(format!(
                    "unsupported scheme {other}"
                )));
            }
        };
        url.set_scheme(scheme)
            .map_err(|()| SubscribeError::Endpoint(format!("cannot switch {url} to {scheme}")))?;

        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["realtime", "v1", "websocket"]);
        }

        url.query_pairs_mut()
            .clear()
            .append_pair("apikey", &self.anon_key)
            .append_pair("vsn", PROTOCOL_VSN);

        Ok(url)
    }
}

#[async_trait]
impl ChangeFeed for RealtimeAdapter {
    async fn subscribe(
        &self,
        table: &str,
        on_change: ChangeCallback,
    ) -> Result<Subscription, SubscribeError> {
        let ws_url = self.websocket_url()?;
        let (stream, _) = connect_async(ws_url.as_str()).await?;
        let (mut write, read) = stream.split();

        let topic = table_topic(SCHEMA, table);
        let filter = ChangeFilter::all_events(SCHEMA, table);
        let mut refs = RefCounter::default();
        let join_ref = refs.next_ref();
        let join = PhoenixMessage::join(topic.clone(), &filter, &self.anon_key, join_ref.clone());
        write.send(Message::text(serde_json::to_string(&join)?)).await?;

        let (subscription, stop) = Subscription::new(table);
        info!(
            subscription = %subscription.id(),
            table,
            topic = %topic,
            "Realtime channel joined"
        );

        let channel = Channel {
            id: subscription.id(),
            topic,
            join_ref,
            refs,
            on_change,
            heartbeat: self.heartbeat,
        };
        tokio::spawn(channel.run(write, read, stop));

        Ok(subscription)
    }
}

#[derive(Default)]
struct RefCounter(u64);

impl RefCounter {
    fn next_ref(&mut self) -> String {
        self.0 += 1;
        self.0.to_string()
    }
}

enum Flow {
    Continue,
    Stop,
}

struct Channel {
    id: Uuid,
    topic: String,
    join_ref: String,
    refs: RefCounter,
    on_change: ChangeCallback,
    heartbeat: Duration,
}

impl Channel {
    async fn run(
        mut self,
        mut write: SplitSink<WsStream, Message>,
        mut read: SplitStream<WsStream>,
        mut stop: oneshot::Receiver<()>,
    ) {
        let mut heartbeat = tokio::time::interval(self.heartbeat);
        // The first tick completes immediately.
        heartbeat.tick().await;

        loop {
            tokio::select! {
                _ = &mut stop => {
                    self.leave(&mut write).await;
                    break;
                }
                _ = heartbeat.tick() => {
                    let beat = PhoenixMessage::heartbeat(self.refs.next_ref());
                    if let Err(e) = send_frame(&mut write, &beat).await {
                        warn!(subscription = %self.id, error = %e, "Realtime heartbeat failed");
                        break;
                    }
                }
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Flow::Stop = self.on_text(text.as_str()) {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(subscription = %self.id, "Realtime socket closed by server");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(subscription = %self.id, error = %e, "Realtime socket error");
                        break;
                    }
                },
            }
        }

        debug!(subscription = %self.id, topic = %self.topic, "Realtime channel task finished");
    }

    fn on_text(&self, text: &str) -> Flow {
        let msg = match serde_json::from_str::<PhoenixMessage>(text) {
            Ok(msg) => msg,
            Err(e) => {
                debug!(subscription = %self.id, error = %e, "Ignoring unparseable realtime frame");
                return Flow::Continue;
            }
        };

        if msg.topic != self.topic {
            return Flow::Continue;
        }

        if msg.is_row_change() {
            with_pretty_json_debug(&msg.payload, |payload| {
                debug!(subscription = %self.id, event = %msg.event, %payload, "Row change");
            });
            (self.on_change)();
            return Flow::Continue;
        }

        let join_reply = msg.reference.as_deref() == Some(self.join_ref.as_str());
        if join_reply && msg.reply_status() == Some("error") {
            warn!(
                subscription = %self.id,
                topic = %self.topic,
                response = %msg.payload,
                "Realtime join rejected"
            );
            return Flow::Stop;
        }

        if msg.event == EVENT_CLOSE || msg.event == EVENT_ERROR {
            warn!(subscription = %self.id, event = %msg.event, "Realtime channel ended by server");
            return Flow::Stop;
        }

        Flow::Continue
    }

    async fn leave(&mut self, write: &mut SplitSink<WsStream, Message>) {
        let leave = PhoenixMessage::leave(self.topic.clone(), self.refs.next_ref());
        if let Err(e) = send_frame(write, &leave).await {
            debug!(subscription = %self.id, error = %e, "Realtime leave not delivered");
        }
        let _ = write.close().await;
        info!(subscription = %self.id, topic = %self.topic, "Realtime channel left");
    }
}

async fn send_frame(
    write: &mut SplitSink<WsStream, Message>,
    msg: &PhoenixMessage,
) -> Result<(), SubscribeError> {
    write.send(Message::text(serde_json::to_string(msg)?)).await?;
    Ok(())
}

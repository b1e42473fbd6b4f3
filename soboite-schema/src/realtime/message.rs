//! Phoenix channel frames (v1 JSON serializer) as spoken by the realtime websocket.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

pub const TOPIC_PHOENIX: &str = "phoenix";

pub const EVENT_JOIN: &str = "phx_join";
pub const EVENT_LEAVE: &str = "phx_leave";
pub const EVENT_REPLY: &str = "phx_reply";
pub const EVENT_CLOSE: &str = "phx_close";
pub const EVENT_ERROR: &str = "phx_error";
pub const EVENT_HEARTBEAT: &str = "heartbeat";
pub const EVENT_POSTGRES_CHANGES: &str = "postgres_changes";

/// Row events emitted by older servers instead of `postgres_changes`.
const LEGACY_ROW_EVENTS: [&str; 3] = ["INSERT", "UPDATE", "DELETE"];

/// Channel topic watching every row of `schema.table`.
pub fn table_topic(schema: &str, table: &str) -> String {
    format!("realtime:{schema}:{table}")
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default, deserialize_with = "deserialize_ref")]
    pub reference: Option<String>,
}

/// One `postgres_changes` subscription entry of a join payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChangeFilter {
    pub event: String,
    pub schema: String,
    pub table: String,
}

impl ChangeFilter {
    /// Inserts, updates and deletes on every row of the table.
    pub fn all_events(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            event: "*".to_string(),
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl PhoenixMessage {
    pub fn join(
        topic: impl Into<String>,
        filter: &ChangeFilter,
        access_token: &str,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            event: EVENT_JOIN.to_string(),
            payload: json!({
                "config": {
                    "broadcast": { "ack": false, "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [filter],
                },
                "access_token": access_token,
            }),
            reference: Some(reference.into()),
        }
    }

    pub fn leave(topic: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            event: EVENT_LEAVE.to_string(),
            payload: json!({}),
            reference: Some(reference.into()),
        }
    }

    pub fn heartbeat(reference: impl Into<String>) -> Self {
        Self {
            topic: TOPIC_PHOENIX.to_string(),
            event: EVENT_HEARTBEAT.to_string(),
            payload: json!({}),
            reference: Some(reference.into()),
        }
    }

    /// True for frames announcing that a watched row changed.
    pub fn is_row_change(&self) -> bool {
        self.event == EVENT_POSTGRES_CHANGES || LEGACY_ROW_EVENTS.contains(&self.event.as_str())
    }

    /// `payload.status` of a `phx_reply` frame.
    pub fn reply_status(&self) -> Option<&str> {
        if self.event != EVENT_REPLY {
            return None;
        }
        self.payload.get("status").and_then(Value::as_str)
    }

    /// The first `postgres_changes` filter of a join frame, if any.
    pub fn join_filter(&self) -> Option<ChangeFilter> {
        self.payload
            .pointer("/config/postgres_changes/0")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

fn deserialize_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_frame_carries_filter_and_token() {
        let filter = ChangeFilter::all_events("public", "restaurants");
        let msg = PhoenixMessage::join(table_topic("public", "restaurants"), &filter, "anon", "1");

        let wire = serde_json::to_value(&msg).unwrap();
        assert_eq!(wire["topic"], "realtime:public:restaurants");
        assert_eq!(wire["event"], "phx_join");
        assert_eq!(wire["ref"], "1");
        assert_eq!(wire["payload"]["access_token"], "anon");
        assert_eq!(
            wire["payload"]["config"]["postgres_changes"][0],
            json!({ "event": "*", "schema": "public", "table": "restaurants" })
        );
        assert_eq!(msg.join_filter(), Some(filter));
    }

    #[test]
    fn recognises_row_changes_and_replies() {
        let change: PhoenixMessage = serde_json::from_str(
            r#"{"topic":"realtime:public:restaurants","event":"postgres_changes","payload":{"data":{"type":"UPDATE"}},"ref":null}"#,
        )
        .unwrap();
        assert!(change.is_row_change());
        assert_eq!(change.reference, None);

        let legacy: PhoenixMessage = serde_json::from_str(
            r#"{"topic":"realtime:public:restaurants","event":"DELETE","payload":{},"ref":7}"#,
        )
        .unwrap();
        assert!(legacy.is_row_change());
        assert_eq!(legacy.reference.as_deref(), Some("7"));

        let reply: PhoenixMessage = serde_json::from_str(
            r#"{"topic":"realtime:public:restaurants","event":"phx_reply","payload":{"status":"error","response":{}},"ref":"1"}"#,
        )
        .unwrap();
        assert!(!reply.is_row_change());
        assert_eq!(reply.reply_status(), Some("error"));
    }
}

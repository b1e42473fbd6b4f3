mod message;

pub use message::{
    ChangeFilter, EVENT_CLOSE, EVENT_ERROR, EVENT_HEARTBEAT, EVENT_JOIN, EVENT_LEAVE,
    EVENT_POSTGRES_CHANGES, EVENT_REPLY, PhoenixMessage, TOPIC_PHOENIX, table_topic,
};

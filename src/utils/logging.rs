use serde::Serialize;

/// Runs `log` with `value` pretty-printed, only when `debug` events are enabled.
pub(crate) fn with_pretty_json_debug<T: Serialize>(value: &T, log: impl FnOnce(&str)) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    match serde_json::to_string_pretty(value) {
        Ok(pretty) => log(&pretty),
        Err(e) => log(&format!("<unprintable payload: {e}>")),
    }
}

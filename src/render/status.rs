use super::{escape, layout};
use serde_json::Value;

/// Outcome of the one-shot status query.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusPanel {
    /// No backend configured; carries the advisory text.
    Unavailable(String),
    Rows { table: String, rows: Vec<Value> },
    Failed(String),
}

pub fn status_page(panel: &StatusPanel) -> String {
    let body = match panel {
        StatusPanel::Unavailable(advisory) => {
            format!("<p class=\"error\">{}</p>", escape(advisory))
        }
        StatusPanel::Failed(message) => {
            format!("<p class=\"error\">Error: {}</p>", escape(message))
        }
        StatusPanel::Rows { table, rows } => {
            let pretty = serde_json::to_string_pretty(rows).unwrap_or_default();
            format!(
                "<p>Connected to Supabase — table: <strong>{}</strong></p>\
                 <p>Rows returned: {}</p><pre>{}</pre>",
                escape(table),
                rows.len(),
                escape(&pretty)
            )
        }
    };

    layout(
        "Supabase status",
        &format!("<section style=\"padding:1.5rem\"><h1>Supabase status</h1>{body}</section>"),
        false,
    )
}

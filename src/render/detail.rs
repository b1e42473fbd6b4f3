use super::escape;
use chrono::NaiveDate;
use serde_json::Value;
use soboite_schema::Restaurant;
use std::fmt::Write as _;

const DATE_FORMAT: &str = "%d %b %Y";

/// Overlay listing every field of `r`, closed by following `close_href`.
pub fn detail_modal(r: &Restaurant, close_href: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<div class=\"modal\" role=\"dialog\"><div><a href=\"{}\">Close</a><h2>{}</h2><dl>",
        escape(close_href),
        escape(&r.name)
    );

    if let Ok(Value::Object(fields)) = serde_json::to_value(r) {
        for (key, value) in &fields {
            let _ = write!(
                out,
                "<dt>{}</dt><dd>{}</dd>",
                escape(key),
                escape(&field_text(value))
            );
        }
    }

    if let Some(meta) = &r.meta {
        visit_row(&mut out, "First visit", meta.first_visit_date());
        visit_row(&mut out, "Last visit", meta.last_visit_date());
    }

    out.push_str("</dl></div></div>");
    out
}

fn visit_row(out: &mut String, label: &str, date: Option<NaiveDate>) {
    if let Some(date) = date {
        let _ = write!(out, "<dt>{label}</dt><dd>{}</dd>", date.format(DATE_FORMAT));
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::Null => "—".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

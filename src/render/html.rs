use std::fmt::Write as _;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#fafafa;color:#222}\
main{display:grid;grid-template-columns:minmax(0,2fr) minmax(0,1fr);gap:1.5rem;padding:1.5rem}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(220px,1fr));gap:1rem}\
.card{display:block;background:#fff;border-radius:8px;padding:.75rem;color:inherit;text-decoration:none;box-shadow:0 1px 3px #0002}\
.card img,.card .noimg{width:100%;height:140px;object-fit:cover;border-radius:6px;background:#eee;display:flex;align-items:center;justify-content:center}\
.tags span{display:inline-block;background:#eef;border-radius:4px;padding:0 .4rem;margin:.1rem;font-size:.8rem}\
.error{background:#fee;color:#900;padding:.75rem;border-radius:6px}\
#map{height:360px;border-radius:8px}\
.modal{position:fixed;inset:0;background:#0006;display:flex;align-items:center;justify-content:center}\
.modal>div{background:#fff;border-radius:8px;padding:1.5rem;max-width:640px;max-height:80vh;overflow:auto}\
pre{background:#f4f4f4;padding:.75rem;border-radius:6px;overflow:auto}";

/// Reloads the page whenever a live view settles on the server.
const RELOAD_SCRIPT: &str = "\
if(window.EventSource){const es=new EventSource('/events');\
es.addEventListener('refresh',()=>window.location.reload());}";

/// Escapes text for HTML element content and double-quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full document around `body`. `live` adds the refresh subscription script.
pub fn layout(title: &str, body: &str, live: bool) -> String {
    let mut page = String::with_capacity(body.len() + 2048);
    let _ = write!(
        page,
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
         <title>{title}</title>\
         <link rel=\"stylesheet\" href=\"{LEAFLET_CSS}\">\
         <script src=\"{LEAFLET_JS}\"></script>\
         <style>{STYLE}</style></head><body>{body}",
        title = escape(title),
    );
    if live {
        let _ = write!(page, "<script>{RELOAD_SCRIPT}</script>");
    }
    page.push_str("</body></html>");
    page
}

/// Serializes `value` for inlining in a `<script>` element.
pub(crate) fn script_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

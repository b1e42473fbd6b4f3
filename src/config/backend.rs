use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

/// Hosted database settings managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Service endpoint, e.g. `https://<project>.supabase.co`.
    /// TOML: `backend.url`. Env: `SUPABASE_URL`. Default: unset.
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub url: Option<String>,

    /// Public (anon) access key sent with every request.
    /// TOML: `backend.anon_key`. Env: `SUPABASE_ANON_KEY`. Default: unset.
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub anon_key: Option<String>,

    /// Table listing restaurants.
    /// TOML: `backend.restaurants_table`. Env: `SUPABASE_RESTAURANTS_TABLE`, then
    /// `SUPABASE_TEST_TABLE`. Default: `restaurants`.
    #[serde(default = "default_restaurants_table")]
    pub restaurants_table: String,

    /// Table read by the status page.
    /// TOML: `backend.status_table`. Env: `SUPABASE_STATUS_TABLE`. Default: `employee`.
    #[serde(default = "default_status_table")]
    pub status_table: String,

    /// Row limit of the main listing. TOML: `backend.page_limit`. Default: `200`.
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Row limit of the ranked list. TOML: `backend.ranking_limit`. Default: `50`.
    #[serde(default = "default_ranking_limit")]
    pub ranking_limit: usize,

    /// Row limit of the status-page query. TOML: `backend.status_limit`. Default: `5`.
    #[serde(default = "default_status_limit")]
    pub status_limit: usize,

    /// Optional outbound HTTP proxy for REST calls.
    /// TOML: `backend.proxy`. Env: `PROXY`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Whole-request timeout for REST calls, in seconds.
    /// TOML: `backend.request_timeout_secs`. Default: `30`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            restaurants_table: default_restaurants_table(),
            status_table: default_status_table(),
            page_limit: default_page_limit(),
            ranking_limit: default_ranking_limit(),
            status_limit: default_status_limit(),
            proxy: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn deserialize_opt_string_lax<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;

    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for a backend setting",
        )),
    }
}

fn default_restaurants_table() -> String {
    "restaurants".to_string()
}

fn default_status_table() -> String {
    "employee".to_string()
}

fn default_page_limit() -> usize {
    200
}

fn default_ranking_limit() -> usize {
    50
}

fn default_status_limit() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

use crate::config::BackendConfig;
use crate::realtime::RealtimeAdapter;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::{sync::Arc, time::Duration};
use tracing::warn;
use url::Url;

/// Connected handle to the hosted database.
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Clone)]
pub struct BackendClient {
    base_url: Url,
    anon_key: Arc<str>,
    http: reqwest::Client,
}

impl BackendClient {
    /// Builds a handle from an endpoint URL and an access key.
    ///
    /// Returns `None` when either value is missing or blank, or when the URL is not an
    /// absolute `http`/`https` URL. Never panics; callers render an advisory instead.
    pub fn new(url: Option<&str>, anon_key: Option<&str>, http: reqwest::Client) -> Option<Self> {
        let url = url.map(str::trim).filter(|u| !u.is_empty())?;
        let anon_key = anon_key.map(str::trim).filter(|k| !k.is_empty())?;

        let base_url = match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
            Ok(parsed) => {
                warn!(scheme = parsed.scheme(), "Backend URL must use http or https");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Backend URL is not a valid URL");
                return None;
            }
        };

        Some(Self {
            base_url,
            anon_key: Arc::from(anon_key),
            http,
        })
    }

    pub fn from_config(cfg: &BackendConfig, http: reqwest::Client) -> Option<Self> {
        Self::new(cfg.url.as_deref(), cfg.anon_key.as_deref(), http)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Change feed speaking the realtime websocket protocol of the same project.
    pub fn realtime(&self) -> RealtimeAdapter {
        RealtimeAdapter::new(self.base_url.clone(), self.anon_key.clone())
    }
}

/// Shared HTTP client for REST calls.
pub fn build_http_client(cfg: &BackendConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("soboite/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(cfg.request_timeout_secs.max(1)));

    if let Some(proxy_url) = &cfg.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    builder.default_headers(headers).build()
}

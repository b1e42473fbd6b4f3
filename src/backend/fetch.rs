use super::{BODY_PREVIEW_CHARS, BackendClient, TableQuery};
use crate::error::FetchError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use soboite_schema::{PostgrestErrorBody, Restaurant};
use std::time::Instant;
use tracing::{debug, warn};

/// Read seam used by live views: one request, one typed result.
#[async_trait]
pub trait RestaurantSource: Send + Sync {
    async fn fetch(&self, query: &TableQuery) -> Result<Vec<Restaurant>, FetchError>;
}

#[async_trait]
impl RestaurantSource for BackendClient {
    async fn fetch(&self, query: &TableQuery) -> Result<Vec<Restaurant>, FetchError> {
        self.select(query).await
    }
}

impl BackendClient {
    /// Runs `query` once and decodes the rows. No retries, no pagination.
    pub async fn select<T>(&self, query: &TableQuery) -> Result<Vec<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let url = query.endpoint(self.base_url());
        let start = Instant::now();

        let resp = self
            .http()
            .get(url)
            .header("apikey", self.anon_key())
            .bearer_auth(self.anon_key())
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let raw_body = String::from_utf8_lossy(&bytes);
            warn!(
                table = query.table(),
                %status,
                body = %format_args!("{:.len$}", raw_body, len = BODY_PREVIEW_CHARS),
                "Backend query failed"
            );
            return Err(backend_error(status, &bytes));
        }

        let rows: Vec<T> = serde_json::from_slice(&bytes)?;
        debug!(
            table = query.table(),
            rows = rows.len(),
            took_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Backend query succeeded"
        );
        Ok(rows)
    }

    /// Same as [`select`](Self::select) but leaves rows as untyped JSON.
    pub async fn select_raw(&self, query: &TableQuery) -> Result<Vec<Value>, FetchError> {
        self.select(query).await
    }
}

fn backend_error(status: reqwest::StatusCode, body: &[u8]) -> FetchError {
    match serde_json::from_slice::<PostgrestErrorBody>(body) {
        Ok(err) => match err.user_message() {
            Some(message) => FetchError::Backend {
                status,
                code: err.code.clone(),
                message: message.to_string(),
            },
            None => FetchError::Status(status),
        },
        Err(_) => FetchError::Status(status),
    }
}

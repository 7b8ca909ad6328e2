// src/api/client.rs
use std::future::Future;
use std::time::Duration;

use reqwest::header;
use serde_json::Value;

use crate::utils::error::ApiError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Anything that can hand out numbered pages of JSON records.
pub trait PageSource {
    /// Records on `page` (1-based). An empty page means there is no more data.
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<Vec<Value>, ApiError>>;
}

/// A REST endpoint paged with `per_page` and `page` query parameters.
pub struct HttpPageSource {
    client: reqwest::Client,
    url: String,
    per_page: u32,
}

impl HttpPageSource {
    pub fn new(url: &str, per_page: u32, insecure: bool) -> Result<Self, ApiError> {
        if insecure {
            tracing::warn!("SSL certificate verification is disabled");
        }
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(insecure)
            .build()?; // Propagate client build error if any

        Ok(Self {
            client,
            url: url.to_string(),
            per_page,
        })
    }
}

impl PageSource for HttpPageSource {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Value>, ApiError> {
        tracing::debug!("Requesting page {} from {}", page, self.url);

        let response = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/json")
            .query(&[("per_page", self.per_page), ("page", page)])
            .send()
            .await?; // Propagates reqwest::Error as ApiError::Network

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http { status, page, body });
        }

        match response.json::<Value>().await? {
            Value::Array(records) => Ok(records),
            Value::Object(_) => Err(ApiError::Parse(format!(
                "expected a JSON array on page {}, got an object",
                page
            ))),
            other => Err(ApiError::Parse(format!(
                "expected a JSON array on page {}, got `{}`",
                page, other
            ))),
        }
    }
}

/// Everything fetched before the loop ended, and why it ended early if it did.
#[derive(Debug)]
pub struct PageDump {
    pub records: Vec<Value>,
    pub pages: u32,
    pub halted: Option<ApiError>,
}

/// Fetches pages 1, 2, … until an empty page, waiting `delay` between
/// requests. The first failed request stops the loop; nothing is retried.
pub async fn fetch_all<S: PageSource>(source: &S, delay: Duration) -> PageDump {
    let mut records = Vec::new();
    let mut page = 1;

    loop {
        match source.fetch_page(page).await {
            Ok(batch) if batch.is_empty() => {
                tracing::info!("No more data found. Reached the last page.");
                return PageDump {
                    records,
                    pages: page - 1,
                    halted: None,
                };
            }
            Ok(batch) => {
                tracing::info!("Successfully fetched page {} with {} records.", page, batch.len());
                records.extend(batch);
                page += 1;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => {
                tracing::error!("Request failed on page {}: {}", page, e);
                return PageDump {
                    records,
                    pages: page - 1,
                    halted: Some(e),
                };
            }
        }
    }
}

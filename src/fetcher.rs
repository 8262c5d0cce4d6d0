use crate::types::{AnnouncerError, Result};
use backoff::backoff::{Backoff, Constant};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Retries beyond the first attempt for a failing fetch.
pub const MAX_RETRIES: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_secs(10);

/// HTTP fetcher shared by the feed sources. Transport errors and non-2xx
/// statuses are retried with a fixed delay before the failure is surfaced.
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_retry(MAX_RETRIES, RETRY_DELAY)
    }

    pub fn with_retry(max_retries: u32, retry_delay: Duration) -> Self {
        let client = Client::builder()
            .user_agent(concat!("spin-announcer/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            max_retries,
            retry_delay,
        }
    }

    /// Fetches `url` as text. The last error wins when every attempt fails.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let mut backoff = Constant::new(self.retry_delay);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.text().await?;
                        debug!("fetched {} ({} bytes)", url, body.len());
                        return Ok(body);
                    }
                    last_error = Some(format!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("unknown")
                    ));
                }
                Err(e) => last_error = Some(e.to_string()),
            }

            if attempt < self.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!(
                        "attempt {}/{} failed for {}, retrying in {:?}",
                        attempt + 1,
                        self.max_retries + 1,
                        url,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(AnnouncerError::FetchExhausted {
            attempts: self.max_retries + 1,
            reason: last_error.unwrap_or_else(|| "unknown error".to_string()),
        })
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

use crate::types::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;

/// Visibility of a published status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
    Direct,
}

/// Outcome of one publish attempt. Remote rejection is data, not an `Err`;
/// only transport failures surface as errors.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub success: bool,
    pub status: u16,
    pub reason: String,
    pub body: String,
}

/// Seam over the social endpoint so the poll loop can be exercised without
/// a live server.
#[async_trait]
pub trait Publish: Send + Sync {
    /// Posts one status. The idempotency key lets the provider deduplicate
    /// retried requests for the same logical item.
    async fn publish(&self, status: &str, idempotency_key: &str) -> Result<PublishOutcome>;
}

#[derive(Serialize)]
struct StatusRequest<'a> {
    status: &'a str,
    visibility: Visibility,
}

/// Posts statuses to a Mastodon instance over its REST API using an access
/// token obtained by registering an app on the instance.
pub struct MastodonPublisher {
    client: Client,
    endpoint: String,
    access_token: String,
    visibility: Visibility,
}

impl MastodonPublisher {
    pub fn new(client: Client, base_url: &Url, access_token: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/v1/statuses", base_url.as_str().trim_end_matches('/')),
            access_token: access_token.into(),
            visibility: Visibility::default(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

#[async_trait]
impl Publish for MastodonPublisher {
    async fn publish(&self, status: &str, idempotency_key: &str) -> Result<PublishOutcome> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .header("Idempotency-Key", idempotency_key)
            .json(&StatusRequest {
                status,
                visibility: self.visibility,
            })
            .send()
            .await?;

        let code = response.status();
        let body = response.text().await?;

        Ok(PublishOutcome {
            success: code.is_success(),
            status: code.as_u16(),
            reason: code.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

use crate::fetcher::Fetcher;
use crate::types::{AnnouncerError, LocationReport, Result};
use tracing::debug;

/// The JSON locations feed of the SPIN public API: a flat array of incident
/// reports without stable ids, keyed by report timestamp instead.
pub struct LocationsSource {
    fetcher: Fetcher,
    url: String,
}

impl LocationsSource {
    pub fn new(fetcher: Fetcher, base_url: &str) -> Self {
        Self {
            fetcher,
            url: format!("{}/lokacija", base_url.trim_end_matches('/')),
        }
    }

    pub async fn fetch(&self) -> Result<Vec<LocationReport>> {
        let body = self.fetcher.get_text(&self.url).await?;
        let reports = parse_reports(&body)?;
        debug!("parsed {} location reports", reports.len());
        Ok(reports)
    }
}

pub fn parse_reports(content: &str) -> Result<Vec<LocationReport>> {
    serde_json::from_str(content)
        .map_err(|e| AnnouncerError::Parse(format!("failed to parse locations feed: {e}")))
}

use crate::fetcher::Fetcher;
use crate::types::{AnnouncerError, FeedKind, IncidentItem, Result};
use feed_rs::parser;
use tracing::debug;

/// The two RSS sub-feeds of the SPIN public API. `ODRSS/true` lists reports
/// as entered, `ODRSS/false` the ones verified by the operators.
pub struct RssSource {
    fetcher: Fetcher,
    base_url: String,
}

impl RssSource {
    pub fn new(fetcher: Fetcher, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn feed_url(&self, kind: FeedKind) -> String {
        match kind {
            FeedKind::Entered => format!("{}/ODRSS/true", self.base_url),
            FeedKind::Verified => format!("{}/ODRSS/false", self.base_url),
        }
    }

    /// Fetches one sub-feed and maps it to incident items, newest-first as
    /// emitted by the source.
    pub async fn fetch(&self, kind: FeedKind) -> Result<Vec<IncidentItem>> {
        let body = self.fetcher.get_text(&self.feed_url(kind)).await?;
        parse_channel(kind, &body)
    }
}

/// Parses an RSS document into incident items. A malformed entry fails the
/// whole batch: the delta logic needs a complete ordered fetch, partial
/// batches would corrupt the watermark.
pub fn parse_channel(kind: FeedKind, content: &str) -> Result<Vec<IncidentItem>> {
    let feed = parser::parse(content.as_bytes())
        .map_err(|e| AnnouncerError::Parse(format!("failed to parse feed: {e}")))?;

    let mut items = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let guid = entry.id;
        let id = extract_id(&guid).ok_or(AnnouncerError::InvalidItemId { guid })?;
        let title = entry
            .title
            .map(|t| t.content)
            .ok_or_else(|| AnnouncerError::Parse(format!("item {id} has no title")))?;
        let link = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .ok_or_else(|| AnnouncerError::Parse(format!("item {id} has no link")))?;
        let timestamp = entry
            .published
            .ok_or_else(|| AnnouncerError::Parse(format!("item {id} has no publication date")))?;
        let body = entry.summary.map(|s| s.content).unwrap_or_default();

        items.push(IncidentItem {
            kind,
            id,
            title,
            body,
            link,
            timestamp,
        });
    }

    debug!("parsed {} {} items", items.len(), kind);
    Ok(items)
}

/// Stable item id: the trailing numeric path segment of the permalink guid.
pub fn extract_id(guid: &str) -> Option<u32> {
    guid.rsplit('/').next().and_then(|tail| tail.parse().ok())
}

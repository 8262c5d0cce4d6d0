use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which SPIN sub-feed an item belongs to. The two sub-feeds are numbered
/// independently, so ids are only comparable within one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedKind {
    Entered,
    Verified,
}

impl FeedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::Entered => "entered",
            FeedKind::Verified => "verified",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One incident report as emitted by the RSS sub-feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentItem {
    pub kind: FeedKind,
    pub id: u32,
    pub title: String,
    pub body: String,
    pub link: String,
    pub timestamp: DateTime<Utc>,
}

/// One report from the JSON locations feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    #[serde(rename = "wgsLat")]
    pub lat: f64,
    #[serde(rename = "wgsLon")]
    pub lon: f64,
    #[serde(rename = "prijavaCas")]
    pub report_date: DateTime<Utc>,
    #[serde(rename = "obcinaNaziv")]
    pub municipality: Option<String>,
    #[serde(rename = "intervencijaVrstaNaziv")]
    pub intervention_type: Option<String>,
    #[serde(rename = "dogodekNaziv")]
    pub caption: Option<String>,
    #[serde(rename = "besedilo")]
    pub text: Option<String>,
}

impl LocationReport {
    /// Display title; the caption is sometimes empty, in which case the
    /// intervention type stands in.
    pub fn title(&self) -> &str {
        match self.caption.as_deref() {
            Some(caption) if !caption.is_empty() => caption,
            _ => self.intervention_type.as_deref().unwrap_or(""),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnnouncerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("fetch failed after {attempts} attempts: {reason}")]
    FetchExhausted { attempts: u32, reason: String },

    #[error("feed parse error: {0}")]
    Parse(String),

    #[error("invalid item id in guid: {guid}")]
    InvalidItemId { guid: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnnouncerError>;

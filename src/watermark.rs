use crate::types::{FeedKind, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Last successfully published id per sub-feed kind. `None` means nothing
/// was published yet and the entire feed counts as new.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdWatermark {
    pub last_entered: Option<u32>,
    pub last_verified: Option<u32>,
}

impl IdWatermark {
    pub fn get(&self, kind: FeedKind) -> Option<u32> {
        match kind {
            FeedKind::Entered => self.last_entered,
            FeedKind::Verified => self.last_verified,
        }
    }

    pub fn advance(&mut self, kind: FeedKind, id: u32) {
        match kind {
            FeedKind::Entered => self.last_entered = Some(id),
            FeedKind::Verified => self.last_verified = Some(id),
        }
    }
}

impl fmt::Display for IdWatermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn part(id: Option<u32>) -> String {
            id.map_or_else(|| "-".to_string(), |id| id.to_string())
        }
        write!(
            f,
            "entered:{} verified:{}",
            part(self.last_entered),
            part(self.last_verified)
        )
    }
}

/// Seen report timestamps for the date-keyed feed variant. Pruned to the
/// live feed's retention window on every poll, which bounds its growth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWatermark {
    pub seen: BTreeSet<DateTime<Utc>>,
}

impl DateWatermark {
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.seen.contains(&date)
    }

    pub fn insert(&mut self, date: DateTime<Utc>) {
        self.seen.insert(date);
    }

    /// Drops entries that are no longer present in the current fetch.
    pub fn prune(&mut self, live: &BTreeSet<DateTime<Utc>>) {
        self.seen.retain(|date| live.contains(date));
    }
}

/// Durable store for the publication watermark. Saves are atomic: the new
/// content goes to a sibling temp file which is renamed over the target, so
/// a concurrent reader never observes a torn write.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted watermark, defaulting to empty when the file is
    /// missing or unreadable.
    pub fn load<T>(&self) -> T
    where
        T: DeserializeOwned + Default,
    {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(value) => value,
                Err(e) => {
                    warn!(
                        "state file {} is unreadable ({}), starting empty",
                        self.path.display(),
                        e
                    );
                    T::default()
                }
            },
            Err(_) => {
                info!("no state file at {}, starting empty", self.path.display());
                T::default()
            }
        }
    }

    pub fn save<T: Serialize>(&self, value: &T) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

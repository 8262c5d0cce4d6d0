pub mod config;
pub mod delta;
pub mod fetcher;
pub mod formatter;
pub mod locations;
pub mod publisher;
pub mod rss;
pub mod scheduler;
pub mod types;
pub mod watermark;

pub use config::{Config, FeedMode};
pub use fetcher::Fetcher;
pub use locations::LocationsSource;
pub use publisher::{MastodonPublisher, Publish, PublishOutcome, Visibility};
pub use rss::RssSource;
pub use scheduler::{CycleStats, LocationsCycle, PollCycle, RssCycle};
pub use types::*;
pub use watermark::{DateWatermark, IdWatermark, StateStore};

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Feed shape to poll, which also fixes the watermark scheme: the RSS
/// sub-feeds carry stable numeric ids, the JSON locations feed is keyed by
/// report timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FeedMode {
    Rss,
    Locations,
}

/// Runtime configuration, read from CLI flags with environment fallbacks.
#[derive(Debug, Parser)]
#[command(name = "spin-announcer", version, about)]
pub struct Config {
    /// Which feed variant to poll.
    #[arg(long, value_enum, env = "SPIN_FEED_MODE", default_value = "rss")]
    pub feed_mode: FeedMode,

    /// Base URL of the SPIN public API.
    #[arg(
        long,
        env = "SPIN_API_URL",
        default_value = "https://spin3.sos112.si/api/javno"
    )]
    pub spin_url: Url,

    /// Base URL of the Mastodon instance posts are sent to.
    #[arg(long, env = "MASTODON_URL", default_value = "https://botsin.space")]
    pub mastodon_url: Url,

    /// Mastodon access token.
    #[arg(long, env = "MASTODON_ACCESS_TOKEN", hide_env_values = true)]
    pub mastodon_token: String,

    /// Public incident map page, used as the post link in locations mode.
    #[arg(
        long,
        env = "SPIN_MAP_URL",
        default_value = "https://spin3.sos112.si/javno/zemljevid"
    )]
    pub map_url: Url,

    /// Path of the persisted publication state file.
    #[arg(long, env = "SPIN_STATE_PATH", default_value = "state/state.json")]
    pub state_path: PathBuf,

    /// Seconds between poll cycles, measured poll-start to poll-start.
    #[arg(long, env = "SPIN_POLL_INTERVAL_SECS", default_value_t = 300)]
    pub poll_interval_secs: u64,

    /// Hard character limit for one post.
    #[arg(long, env = "SPIN_MAX_POST_LEN", default_value_t = 500)]
    pub max_post_len: usize,
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

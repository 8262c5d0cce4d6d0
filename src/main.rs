use clap::Parser;
use spin_announcer::scheduler::{self, LocationsCycle, RssCycle};
use spin_announcer::{
    Config, FeedMode, Fetcher, LocationsSource, MastodonPublisher, RssSource, StateStore,
};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    info!("starting spin-announcer v{}", env!("CARGO_PKG_VERSION"));

    let publisher = MastodonPublisher::new(
        reqwest::Client::new(),
        &config.mastodon_url,
        config.mastodon_token.clone(),
    );
    let store = StateStore::new(&config.state_path);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    spawn_signal_listener(shutdown_tx);

    let spin_url = config.spin_url.as_str();
    match config.feed_mode {
        FeedMode::Rss => {
            let source = RssSource::new(Fetcher::new(), spin_url);
            let mut cycle = RssCycle::new(source, Box::new(publisher), store, config.max_post_len);
            scheduler::run(&mut cycle, config.poll_interval(), shutdown_rx).await;
        }
        FeedMode::Locations => {
            let source = LocationsSource::new(Fetcher::new(), spin_url);
            let mut cycle = LocationsCycle::new(
                source,
                Box::new(publisher),
                store,
                config.map_url.as_str(),
                config.max_post_len,
            );
            scheduler::run(&mut cycle, config.poll_interval(), shutdown_rx).await;
        }
    }

    info!("stopped");
    Ok(())
}

/// Flips the shutdown channel on SIGINT or SIGTERM. The poll loop drains
/// the in-flight item before the process returns.
fn spawn_signal_listener(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal as unix_signal, SignalKind};

            let mut sigterm = match unix_signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    error!("failed to install SIGTERM handler: {e}");
                    return;
                }
            };

            tokio::select! {
                result = signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!("failed to listen for SIGINT: {e}");
                        return;
                    }
                    info!("received SIGINT, shutting down");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = signal::ctrl_c().await {
                error!("failed to listen for SIGINT: {e}");
                return;
            }
            info!("received SIGINT, shutting down");
        }

        let _ = shutdown_tx.send(true);
    });
}

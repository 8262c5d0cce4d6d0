use crate::delta;
use crate::formatter;
use crate::locations::LocationsSource;
use crate::publisher::Publish;
use crate::rss::RssSource;
use crate::types::FeedKind;
use crate::watermark::{DateWatermark, IdWatermark, StateStore};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// Counts for one sweep, logged at the end of every cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub published: usize,
    pub failed: usize,
}

/// One fetch → delta → publish → persist sweep. Implementations absorb all
/// per-cycle errors; the driver owns the cadence and shutdown handling.
#[async_trait]
pub trait PollCycle: Send {
    async fn run_cycle(&mut self, shutdown: &watch::Receiver<bool>) -> CycleStats;
}

/// Drives a cycle on a fixed cadence until `shutdown` flips. The delay is
/// started before the cycle runs and awaited after it completes, so the
/// interval is measured poll-start to poll-start and a slow poll does not
/// stretch the schedule.
pub async fn run(cycle: &mut dyn PollCycle, interval: Duration, mut shutdown: watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        let pause = tokio::time::sleep(interval);
        tokio::pin!(pause);

        let stats = cycle.run_cycle(&shutdown).await;
        info!(
            "sweep done with {} published and {} failures",
            stats.published, stats.failed
        );

        tokio::select! {
            _ = &mut pause => {}
            _ = signalled(&mut shutdown) => break,
        }
    }
    info!("poll loop stopped");
}

async fn signalled(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            break;
        }
    }
}

/// Poll cycle over the two id-numbered RSS sub-feeds.
pub struct RssCycle {
    source: RssSource,
    publisher: Box<dyn Publish>,
    store: StateStore,
    watermark: IdWatermark,
    max_post_len: usize,
}

impl RssCycle {
    pub fn new(
        source: RssSource,
        publisher: Box<dyn Publish>,
        store: StateStore,
        max_post_len: usize,
    ) -> Self {
        let watermark: IdWatermark = store.load();
        info!("last published {watermark}");
        Self {
            source,
            publisher,
            store,
            watermark,
            max_post_len,
        }
    }

    pub fn watermark(&self) -> IdWatermark {
        self.watermark
    }
}

#[async_trait]
impl PollCycle for RssCycle {
    async fn run_cycle(&mut self, shutdown: &watch::Receiver<bool>) -> CycleStats {
        let mut stats = CycleStats::default();

        let (entered, verified) = tokio::join!(
            self.source.fetch(FeedKind::Entered),
            self.source.fetch(FeedKind::Verified),
        );

        // A failed sub-feed skips only that kind for this cycle; the other
        // kind still publishes and the next cycle fetches fresh.
        let mut batch = Vec::new();
        for (kind, result) in [(FeedKind::Entered, entered), (FeedKind::Verified, verified)] {
            match result {
                Ok(items) => {
                    let new = delta::take_new(&items, self.watermark.get(kind));
                    if !new.is_empty() {
                        let ids: Vec<String> = new.iter().map(|i| i.id.to_string()).collect();
                        info!("{} new {}: {}", new.len(), kind, ids.join(", "));
                    }
                    batch.extend(new);
                }
                Err(e) => error!("fetching {kind} feed failed, skipping it this cycle: {e}"),
            }
        }

        if batch.is_empty() {
            info!("no new entries");
            return stats;
        }
        info!("there are {} new posts to publish", batch.len());

        for item in batch {
            if *shutdown.borrow() {
                info!("shutdown requested, leaving remaining items for the next start");
                break;
            }

            info!("publishing {}:{}", item.kind, item.id);
            let message = formatter::compose_item(&item, self.max_post_len);
            let key = format!("{}_{}", item.kind, item.id);

            let published = match self.publisher.publish(&message, &key).await {
                Ok(outcome) if outcome.success => true,
                Ok(outcome) => {
                    error!(
                        "failed publishing {key}: {} {}: {}",
                        outcome.status, outcome.reason, outcome.body
                    );
                    false
                }
                Err(e) => {
                    error!("failed publishing {key}: {e}");
                    false
                }
            };

            if published {
                self.watermark.advance(item.kind, item.id);
                if let Err(e) = self.store.save(&self.watermark) {
                    error!("failed persisting state after {key}: {e}");
                }
                info!("publication state persisted with {}", self.watermark);
                stats.published += 1;
            } else {
                stats.failed += 1;
            }
        }

        stats
    }
}

/// Poll cycle over the date-keyed JSON locations feed.
pub struct LocationsCycle {
    source: LocationsSource,
    publisher: Box<dyn Publish>,
    store: StateStore,
    watermark: DateWatermark,
    map_url: String,
    max_post_len: usize,
}

impl LocationsCycle {
    pub fn new(
        source: LocationsSource,
        publisher: Box<dyn Publish>,
        store: StateStore,
        map_url: impl Into<String>,
        max_post_len: usize,
    ) -> Self {
        let watermark: DateWatermark = store.load();
        info!("{} report dates already published", watermark.seen.len());
        Self {
            source,
            publisher,
            store,
            watermark,
            map_url: map_url.into(),
            max_post_len,
        }
    }

    pub fn watermark(&self) -> &DateWatermark {
        &self.watermark
    }
}

#[async_trait]
impl PollCycle for LocationsCycle {
    async fn run_cycle(&mut self, shutdown: &watch::Receiver<bool>) -> CycleStats {
        let mut stats = CycleStats::default();

        let reports = match self.source.fetch().await {
            Ok(reports) => reports,
            Err(e) => {
                error!("fetching locations feed failed, skipping this cycle: {e}");
                return stats;
            }
        };

        // Prune before the delta so the seen set stays bounded by the
        // feed's retention window.
        let live: BTreeSet<_> = reports.iter().map(|r| r.report_date).collect();
        self.watermark.prune(&live);

        let new = delta::new_reports(&reports, &self.watermark);
        if new.is_empty() {
            info!("no new entries");
            return stats;
        }
        info!("there are {} new posts to publish", new.len());

        for report in new {
            if *shutdown.borrow() {
                info!("shutdown requested, leaving remaining items for the next start");
                break;
            }

            let key = report.report_date.to_rfc3339();
            info!("publishing report from {key}");
            let message = formatter::compose_report(&report, &self.map_url, self.max_post_len);

            let published = match self.publisher.publish(&message, &key).await {
                Ok(outcome) if outcome.success => true,
                Ok(outcome) => {
                    error!(
                        "failed publishing {key}: {} {}: {}",
                        outcome.status, outcome.reason, outcome.body
                    );
                    false
                }
                Err(e) => {
                    error!("failed publishing {key}: {e}");
                    false
                }
            };

            if published {
                self.watermark.insert(report.report_date);
                if let Err(e) = self.store.save(&self.watermark) {
                    error!("failed persisting state after {key}: {e}");
                }
                stats.published += 1;
            } else {
                stats.failed += 1;
            }
        }

        stats
    }
}

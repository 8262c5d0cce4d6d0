use crate::types::{IncidentItem, LocationReport};
use crate::watermark::DateWatermark;

/// Returns the genuinely new items of one sub-feed, oldest-first.
///
/// `items` is the feed as emitted, newest-first. The scan walks from the top
/// until it reaches the last published id. When that id has fallen out of
/// the feed's retained window (for example after an outage longer than the
/// feed history), the whole batch counts as new and the provider-side
/// idempotency keys absorb any duplicates.
pub fn take_new(items: &[IncidentItem], last: Option<u32>) -> Vec<IncidentItem> {
    let mut new: Vec<IncidentItem> = match last {
        None => items.to_vec(),
        Some(last) => items.iter().take_while(|i| i.id != last).cloned().collect(),
    };
    new.reverse();
    new
}

/// Returns the reports not yet in the seen set, oldest-first. The caller
/// must prune the set against the current fetch before calling this.
pub fn new_reports(reports: &[LocationReport], seen: &DateWatermark) -> Vec<LocationReport> {
    let mut new: Vec<LocationReport> = reports
        .iter()
        .filter(|r| !seen.contains(r.report_date))
        .cloned()
        .collect();
    new.sort_by_key(|r| r.report_date);
    new
}

use crate::types::{IncidentItem, LocationReport};

const ELLIPSIS: &str = "...\n";

/// Renders one post: title and body on separate lines, truncated to the
/// platform limit, with the canonical link always appended in full.
///
/// Truncation is a plain character-count slice with no word-boundary
/// awareness.
pub fn compose(title: &str, body: &str, link: &str, max_len: usize) -> String {
    let text = format!("{title}\n{body}");
    let text_len = text.chars().count();
    let budget = max_len.saturating_sub(link.chars().count());

    if text_len > budget {
        let keep = budget.saturating_sub(ELLIPSIS.chars().count());
        let head: String = text.chars().take(keep).collect();
        format!("{head}{ELLIPSIS}{link}")
    } else {
        let keep = text_len.min(max_len.saturating_sub(1));
        let head: String = text.chars().take(keep).collect();
        format!("{head}\n{link}")
    }
}

pub fn compose_item(item: &IncidentItem, max_len: usize) -> String {
    compose(&item.title, &item.body, &item.link, max_len)
}

/// Location reports carry no permalink, so posts link to the public
/// incident map instead.
pub fn compose_report(report: &LocationReport, map_url: &str, max_len: usize) -> String {
    let body = match report.municipality.as_deref() {
        Some(municipality) if !municipality.is_empty() => format!(
            "{}: {}",
            municipality,
            report.text.as_deref().unwrap_or_default()
        ),
        _ => report.text.clone().unwrap_or_default(),
    };
    compose(report.title(), &body, map_url, max_len)
}

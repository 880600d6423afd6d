//! Usage and health analytics over a flattened bookmark collection.
//!
//! Everything here is a pure function of its inputs; the caller supplies the
//! current time so results are reproducible.

use std::collections::{BTreeMap, HashMap};

use chrono::DateTime;

use crate::services::duplicate_grouper::{duplicate_excess, group_duplicates};
use crate::services::url_normalizer::domain_of;
use crate::types::analytics::{HealthGrade, HealthReport, UsageEntry, VisitInfo};
use crate::types::bookmark::FlatLink;
use crate::types::scan::{ScanKind, ScanRun};
use crate::types::settings::NormalizeMode;

pub const MOST_VISITED_LIMIT: usize = 10;
pub const ZOMBIE_LIMIT: usize = 10;
pub const DOMAIN_LIMIT: usize = 8;
pub const TIMELINE_MONTHS: usize = 12;
/// Age after which an unvisited bookmark counts as a zombie.
pub const ZOMBIE_AGE_MS: i64 = 90 * 24 * 60 * 60 * 1000;

/// Visit data keyed by bookmark URL.
pub type VisitMap = HashMap<String, VisitInfo>;

/// Collection health in `[0, 100]`.
///
/// `100 - 200 * invalid/total - 100 * duplicates/total - 2 * empty`, rounded and
/// clamped. An empty collection scores 100.
pub fn health_score(total: usize, duplicates: usize, empty_folders: usize, invalid: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let total = total as f64;
    let raw = 100.0
        - 200.0 * (invalid as f64 / total)
        - 100.0 * (duplicates as f64 / total)
        - 2.0 * empty_folders as f64;
    raw.round().clamp(0.0, 100.0) as u8
}

fn usage_entry(link: &FlatLink, visit: Option<&VisitInfo>) -> UsageEntry {
    UsageEntry {
        link: link.clone(),
        visit_count: visit.map(|v| v.visit_count).unwrap_or(0),
        last_visit_time: visit.map(|v| v.last_visit_time).unwrap_or(0),
    }
}

/// Links with at least one visit, most visited first. Ties keep input order.
pub fn most_visited(links: &[FlatLink], visits: &VisitMap, limit: usize) -> Vec<UsageEntry> {
    let mut entries: Vec<UsageEntry> = links
        .iter()
        .filter_map(|link| {
            let visit = visits.get(&link.url)?;
            (visit.visit_count > 0).then(|| usage_entry(link, Some(visit)))
        })
        .collect();
    entries.sort_by(|a, b| b.visit_count.cmp(&a.visit_count));
    entries.truncate(limit);
    entries
}

/// Bookmarks added more than 90 days before `now_ms` that were not visited in
/// that window, oldest first, at most [`ZOMBIE_LIMIT`].
///
/// With `visits == None` (no history feed) age alone decides.
pub fn find_zombies(links: &[FlatLink], visits: Option<&VisitMap>, now_ms: i64) -> Vec<UsageEntry> {
    let cutoff = now_ms - ZOMBIE_AGE_MS;
    let mut zombies: Vec<UsageEntry> = links
        .iter()
        .filter(|link| link.date_added < cutoff)
        .filter_map(|link| match visits {
            None => Some(usage_entry(link, None)),
            Some(map) => {
                let visit = map.get(&link.url);
                let last = visit.map(|v| v.last_visit_time).unwrap_or(0);
                (last < cutoff).then(|| usage_entry(link, visit))
            }
        })
        .collect();
    zombies.sort_by_key(|entry| entry.link.date_added);
    zombies.truncate(ZOMBIE_LIMIT);
    zombies
}

/// Most common hosts, by count then name.
pub fn domain_distribution(links: &[FlatLink], limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for domain in links.iter().filter_map(|link| domain_of(&link.url)) {
        *counts.entry(domain).or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(limit);
    sorted
}

/// Bookmarks added per UTC month (`YYYY-MM`), the last `months` months that
/// have data, oldest first.
pub fn monthly_timeline(links: &[FlatLink], months: usize) -> Vec<(String, usize)> {
    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for link in links {
        if let Some(added) = DateTime::from_timestamp_millis(link.date_added) {
            *buckets.entry(added.format("%Y-%m").to_string()).or_insert(0) += 1;
        }
    }
    let skip = buckets.len().saturating_sub(months);
    buckets.into_iter().skip(skip).collect()
}

/// Invalid links found by the newest invalid scan and not cleaned since.
///
/// `history` is newest first.
pub fn outstanding_invalid(history: &[ScanRun]) -> u32 {
    history
        .iter()
        .find(|run| run.kind == ScanKind::Invalid)
        .map(|run| run.found_count.saturating_sub(run.cleaned_count))
        .unwrap_or(0)
}

/// Inputs for a full analytics pass.
pub struct AnalysisInput<'a> {
    pub links: &'a [FlatLink],
    pub empty_folders: usize,
    pub history: &'a [ScanRun],
    pub visits: Option<&'a VisitMap>,
    pub normalize_mode: NormalizeMode,
    pub now_ms: i64,
}

/// Runs every analysis and scores the collection.
pub fn analyze(input: &AnalysisInput<'_>) -> HealthReport {
    let total = input.links.len();
    let groups = group_duplicates(input.links, input.normalize_mode);
    let duplicates = duplicate_excess(&groups);
    let invalid = outstanding_invalid(input.history) as usize;
    let score = health_score(total, duplicates, input.empty_folders, invalid);

    let most_visited = match input.visits {
        Some(visits) => most_visited(input.links, visits, MOST_VISITED_LIMIT),
        None => Vec::new(),
    };

    HealthReport {
        score,
        grade: HealthGrade::from_score(score),
        total,
        duplicates,
        empty_folders: input.empty_folders,
        invalid,
        most_visited,
        zombies: find_zombies(input.links, input.visits, input.now_ms),
        domains: domain_distribution(input.links, DOMAIN_LIMIT),
        timeline: monthly_timeline(input.links, TIMELINE_MONTHS),
    }
}

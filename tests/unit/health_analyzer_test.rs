//! Unit tests for usage analytics and the health score.

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};
use rstest::rstest;

use bookmark_audit::services::health_analyzer::{
    analyze, domain_distribution, find_zombies, health_score, monthly_timeline,
    outstanding_invalid, AnalysisInput, VisitMap, ZOMBIE_LIMIT,
};
use bookmark_audit::types::analytics::{HealthGrade, VisitInfo};
use bookmark_audit::types::bookmark::FlatLink;
use bookmark_audit::types::scan::{ScanKind, ScanRun};
use bookmark_audit::types::settings::NormalizeMode;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn link(id: &str, url: &str, date_added: i64) -> FlatLink {
    FlatLink {
        id: id.to_string(),
        title: id.to_string(),
        url: url.to_string(),
        path: vec!["Bookmarks Bar".to_string()],
        date_added,
    }
}

fn ms(year: i32, month: u32, day: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .unwrap()
        .timestamp_millis()
}

fn run(kind: ScanKind, found: u32, cleaned: u32) -> ScanRun {
    ScanRun {
        id: format!("{:?}-{}", kind, found),
        started_at: Utc::now(),
        kind,
        scope_folder_ids: BTreeSet::new(),
        scanned_count: 10,
        found_count: found,
        cleaned_count: cleaned,
        duration_seconds: 0.1,
    }
}

#[rstest]
#[case(0, 0, 0, 0, 100)]
#[case(0, 4, 9, 4, 100)]
#[case(10, 0, 0, 0, 100)]
#[case(10, 0, 0, 10, 0)]
#[case(10, 10, 0, 0, 0)]
#[case(100, 0, 5, 0, 90)]
#[case(100, 10, 0, 5, 80)]
#[case(3, 0, 0, 1, 33)]
fn test_health_score(
    #[case] total: usize,
    #[case] duplicates: usize,
    #[case] empty: usize,
    #[case] invalid: usize,
    #[case] expected: u8,
) {
    assert_eq!(health_score(total, duplicates, empty, invalid), expected);
}

#[rstest]
#[case(100, HealthGrade::Excellent)]
#[case(90, HealthGrade::Excellent)]
#[case(89, HealthGrade::Good)]
#[case(70, HealthGrade::Good)]
#[case(69, HealthGrade::Poor)]
#[case(0, HealthGrade::Poor)]
fn test_grade_bands(#[case] score: u8, #[case] grade: HealthGrade) {
    assert_eq!(HealthGrade::from_score(score), grade);
}

#[test]
fn test_zombies_without_history_use_age_only() {
    let now = ms(2024, 6, 1);
    let links = vec![
        link("new", "https://new.example", now - 10 * DAY_MS),
        link("old", "https://old.example", now - 200 * DAY_MS),
        link("older", "https://older.example", now - 400 * DAY_MS),
    ];
    let ids: Vec<String> = find_zombies(&links, None, now)
        .into_iter()
        .map(|z| z.link.id)
        .collect();
    assert_eq!(ids, vec!["older", "old"]);
}

#[test]
fn test_recent_visit_saves_old_bookmark() {
    let now = ms(2024, 6, 1);
    let links = vec![
        link("visited", "https://visited.example", now - 200 * DAY_MS),
        link("stale", "https://stale.example", now - 200 * DAY_MS),
        link("never", "https://never.example", now - 200 * DAY_MS),
    ];
    let mut visits = VisitMap::new();
    visits.insert(
        "https://visited.example".into(),
        VisitInfo {
            visit_count: 3,
            last_visit_time: now - 5 * DAY_MS,
        },
    );
    visits.insert(
        "https://stale.example".into(),
        VisitInfo {
            visit_count: 7,
            last_visit_time: now - 120 * DAY_MS,
        },
    );

    let zombies = find_zombies(&links, Some(&visits), now);
    let ids: Vec<&str> = zombies.iter().map(|z| z.link.id.as_str()).collect();
    assert_eq!(ids, vec!["stale", "never"]);
    assert_eq!(zombies[0].visit_count, 7);
    assert_eq!(zombies[1].visit_count, 0);
}

#[test]
fn test_zombies_are_capped() {
    let now = ms(2024, 6, 1);
    let links: Vec<FlatLink> = (0..25)
        .map(|i| link(&i.to_string(), &format!("https://{}.example", i), now - (100 + i) * DAY_MS))
        .collect();
    let zombies = find_zombies(&links, None, now);
    assert_eq!(zombies.len(), ZOMBIE_LIMIT);
    assert_eq!(zombies[0].link.id, "24");
}

#[test]
fn test_domain_distribution_ignores_www_and_sorts() {
    let links = vec![
        link("1", "https://www.b.com/x", 0),
        link("2", "https://b.com/y", 0),
        link("3", "https://a.com", 0),
        link("4", "https://c.com", 0),
        link("5", "javascript:void(0)", 0),
    ];
    assert_eq!(
        domain_distribution(&links, 2),
        vec![("b.com".to_string(), 2), ("a.com".to_string(), 1)]
    );
}

#[test]
fn test_timeline_buckets_by_month_and_keeps_latest() {
    let links = vec![
        link("1", "https://a.com", ms(2023, 12, 31)),
        link("2", "https://b.com", ms(2024, 1, 1)),
        link("3", "https://c.com", ms(2024, 1, 20)),
        link("4", "https://d.com", ms(2024, 3, 2)),
    ];
    assert_eq!(
        monthly_timeline(&links, 2),
        vec![("2024-01".to_string(), 2), ("2024-03".to_string(), 1)]
    );
    assert_eq!(monthly_timeline(&links, 12).len(), 3);
}

#[test]
fn test_outstanding_invalid_uses_latest_invalid_run() {
    let history = vec![
        run(ScanKind::Duplicate, 9, 0),
        run(ScanKind::Invalid, 5, 2),
        run(ScanKind::Invalid, 40, 0),
    ];
    assert_eq!(outstanding_invalid(&history), 3);
    assert_eq!(outstanding_invalid(&[run(ScanKind::Duplicate, 4, 0)]), 0);
    assert_eq!(outstanding_invalid(&[run(ScanKind::Invalid, 2, 5)]), 0);
}

#[test]
fn test_analyze_combines_everything() {
    let now = ms(2024, 6, 1);
    let links = vec![
        link("a", "https://www.example.com/page", now - 300 * DAY_MS),
        link("b", "http://example.com/page/", now - 10 * DAY_MS),
        link("c", "https://other.example/", now - 10 * DAY_MS),
        link("d", "https://third.example/", now - 10 * DAY_MS),
    ];
    let history = vec![run(ScanKind::Invalid, 1, 0)];
    let mut visits = VisitMap::new();
    visits.insert(
        "https://other.example/".into(),
        VisitInfo {
            visit_count: 4,
            last_visit_time: now - DAY_MS,
        },
    );

    let report = analyze(&AnalysisInput {
        links: &links,
        empty_folders: 1,
        history: &history,
        visits: Some(&visits),
        normalize_mode: NormalizeMode::Loose,
        now_ms: now,
    });

    // 100 - 200 * 1/4 - 100 * 1/4 - 2 * 1 = 23
    assert_eq!(report.score, 23);
    assert_eq!(report.grade, HealthGrade::Poor);
    assert_eq!(report.total, 4);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.invalid, 1);
    assert_eq!(report.empty_folders, 1);
    assert_eq!(report.most_visited.len(), 1);
    assert_eq!(report.most_visited[0].link.id, "c");
    assert_eq!(report.zombies.len(), 1);
    assert_eq!(report.zombies[0].link.id, "a");
    assert_eq!(report.domains[0], ("example.com".to_string(), 2));
}

#[test]
fn test_strict_mode_changes_duplicate_count() {
    let links = vec![
        link("a", "https://www.example.com/page", 0),
        link("b", "http://example.com/page/", 0),
    ];
    let input = |mode| AnalysisInput {
        links: &links,
        empty_folders: 0,
        history: &[],
        visits: None,
        normalize_mode: mode,
        now_ms: 0,
    };
    assert_eq!(analyze(&input(NormalizeMode::Loose)).duplicates, 1);
    assert_eq!(analyze(&input(NormalizeMode::Strict)).duplicates, 0);
    assert!(analyze(&input(NormalizeMode::Strict)).most_visited.is_empty());
}

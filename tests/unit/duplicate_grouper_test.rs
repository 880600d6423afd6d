//! Unit tests for duplicate grouping and smart-select.

use bookmark_audit::services::duplicate_grouper::{
    duplicate_excess, duplicate_member_count, group_duplicates, smart_select,
};
use bookmark_audit::types::bookmark::FlatLink;
use bookmark_audit::types::settings::NormalizeMode;
use rstest::rstest;

fn link(id: &str, url: &str, date_added: i64) -> FlatLink {
    FlatLink {
        id: id.to_string(),
        title: format!("title {}", id),
        url: url.to_string(),
        path: vec!["Bookmarks Bar".to_string()],
        date_added,
    }
}

#[test]
fn test_two_share_third_does_not() {
    let links = vec![
        link("x", "https://example.com/page", 1),
        link("y", "https://other.example/", 2),
        link("z", "https://example.com/page", 3),
    ];
    let groups = group_duplicates(&links, NormalizeMode::Strict);
    assert_eq!(groups.len(), 1);
    let ids: Vec<&str> = groups[0].members.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["x", "z"]);
    assert!(groups
        .iter()
        .all(|g| g.members.iter().all(|m| m.id != "y")));
}

#[rstest]
#[case(NormalizeMode::Loose, 1)]
#[case(NormalizeMode::Strict, 0)]
fn test_mode_decides_scheme_collapse(#[case] mode: NormalizeMode, #[case] expected: usize) {
    let links = vec![
        link("a", "http://www.example.com/docs/", 1),
        link("b", "https://example.com/docs", 2),
    ];
    assert_eq!(group_duplicates(&links, mode).len(), expected);
}

#[test]
fn test_counts() {
    let links = vec![
        link("a1", "https://a.com", 1),
        link("a2", "https://a.com", 2),
        link("a3", "https://a.com", 3),
        link("b1", "https://b.com", 4),
        link("b2", "https://b.com", 5),
    ];
    let groups = group_duplicates(&links, NormalizeMode::Loose);
    assert_eq!(duplicate_member_count(&groups), 5);
    assert_eq!(duplicate_excess(&groups), 3);
}

#[test]
fn test_smart_select_keeps_oldest_per_group() {
    let links = vec![
        link("a-new", "https://a.com", 30),
        link("a-old", "https://a.com", 10),
        link("b-old", "https://b.com", 5),
        link("b-new", "https://b.com/", 50),
    ];
    let groups = group_duplicates(&links, NormalizeMode::Loose);
    let selected = smart_select(&groups);
    assert_eq!(selected, vec!["a-new".to_string(), "b-new".to_string()]);
}

#[test]
fn test_smart_select_ties_keep_first_seen() {
    let links = vec![
        link("first", "https://a.com", 10),
        link("second", "https://a.com", 10),
    ];
    let groups = group_duplicates(&links, NormalizeMode::Loose);
    assert_eq!(smart_select(&groups), vec!["second".to_string()]);
}

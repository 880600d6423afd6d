//! Property-based tests for duplicate grouping and smart selection.

use std::collections::{HashMap, HashSet};

use bookmark_audit::services::duplicate_grouper::{
    duplicate_excess, duplicate_member_count, group_duplicates, smart_select,
};
use bookmark_audit::services::url_normalizer::normalize;
use bookmark_audit::types::bookmark::FlatLink;
use bookmark_audit::types::settings::NormalizeMode;
use proptest::prelude::*;

/// Links drawn from a small URL pool so collisions are common.
fn arb_links() -> impl Strategy<Value = Vec<FlatLink>> {
    let url = prop_oneof![
        Just("https://example.com/a"),
        Just("http://www.example.com/a/"),
        Just("https://example.com/b"),
        Just("https://example.com/b?x=1"),
        Just("https://other.org/"),
        Just("https://other.org"),
        Just("mailto:someone@example.com"),
    ];
    prop::collection::vec((url, 0i64..5), 0..20).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (url, date_added))| FlatLink {
                id: i.to_string(),
                title: format!("link {}", i),
                url: url.to_string(),
                path: vec![],
                date_added,
            })
            .collect()
    })
}

fn arb_mode() -> impl Strategy<Value = NormalizeMode> {
    prop_oneof![Just(NormalizeMode::Loose), Just(NormalizeMode::Strict)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Groups partition exactly the links whose key occurs more than once.
    #[test]
    fn groups_partition_colliding_links(links in arb_links(), mode in arb_mode()) {
        let groups = group_duplicates(&links, mode);

        let mut key_counts: HashMap<String, usize> = HashMap::new();
        for link in &links {
            *key_counts.entry(normalize(&link.url, mode)).or_insert(0) += 1;
        }

        let mut seen = HashSet::new();
        for group in &groups {
            prop_assert!(group.members.len() >= 2);
            for member in &group.members {
                prop_assert_eq!(&normalize(&member.url, mode), &group.normalized_url);
                prop_assert!(seen.insert(member.id.clone()), "link in two groups");
            }
        }

        let colliding: usize = key_counts.values().filter(|&&n| n >= 2).sum();
        prop_assert_eq!(duplicate_member_count(&groups), colliding);
        prop_assert_eq!(seen.len(), colliding);
        prop_assert_eq!(duplicate_excess(&groups), colliding - groups.len());
    }

    // Smart selection leaves one survivor per group, and it is an oldest member.
    #[test]
    fn smart_select_keeps_one_oldest_per_group(links in arb_links(), mode in arb_mode()) {
        let groups = group_duplicates(&links, mode);
        let selected: HashSet<String> = smart_select(&groups).into_iter().collect();
        prop_assert_eq!(selected.len(), duplicate_excess(&groups));

        for group in &groups {
            let survivors: Vec<&FlatLink> = group
                .members
                .iter()
                .filter(|m| !selected.contains(&m.id))
                .collect();
            prop_assert_eq!(survivors.len(), 1);
            let oldest = group.members.iter().map(|m| m.date_added).min().unwrap_or_default();
            prop_assert_eq!(survivors[0].date_added, oldest);
        }
    }
}

//! Duplicate grouping over flattened links.

use std::collections::HashMap;

use crate::services::url_normalizer::normalize;
use crate::types::bookmark::{DuplicateGroup, FlatLink};
use crate::types::settings::NormalizeMode;

/// Groups links by normalized URL, keeping only keys shared by two or more links.
///
/// Groups come out in order of each key's first occurrence, and members keep
/// their input order.
pub fn group_duplicates(links: &[FlatLink], mode: NormalizeMode) -> Vec<DuplicateGroup> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(links.len());
    let mut buckets: Vec<DuplicateGroup> = Vec::new();

    for link in links {
        let key = normalize(&link.url, mode);
        match slots.get(&key) {
            Some(&slot) => buckets[slot].members.push(link.clone()),
            None => {
                slots.insert(key.clone(), buckets.len());
                buckets.push(DuplicateGroup {
                    normalized_url: key,
                    members: vec![link.clone()],
                });
            }
        }
    }

    buckets.retain(|group| group.members.len() >= 2);
    buckets
}

/// IDs to remove so each group keeps only its oldest bookmark.
///
/// Members are ordered by `date_added` ascending; ties keep input order.
pub fn smart_select(groups: &[DuplicateGroup]) -> Vec<String> {
    let mut selected = Vec::new();
    for group in groups {
        let mut members: Vec<&FlatLink> = group.members.iter().collect();
        members.sort_by_key(|link| link.date_added);
        selected.extend(members.iter().skip(1).map(|link| link.id.clone()));
    }
    selected
}

/// Total number of links that belong to some group.
pub fn duplicate_member_count(groups: &[DuplicateGroup]) -> usize {
    groups.iter().map(|g| g.members.len()).sum()
}

/// Number of links beyond the first in each group.
pub fn duplicate_excess(groups: &[DuplicateGroup]) -> usize {
    groups.iter().map(|g| g.members.len() - 1).sum()
}

use std::collections::HashSet;

use tracing::debug;

use crate::DiscoveryItem;

/// Drop items whose `id` already appeared earlier in the list, keeping the
/// first occurrence. Returns the surviving items and how many were dropped.
pub fn dedup_by_id(items: Vec<DiscoveryItem>) -> (Vec<DiscoveryItem>, usize) {
    let before = items.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<DiscoveryItem> = items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect();

    let dropped = before - kept.len();
    if dropped > 0 {
        debug!(dropped, "dropped duplicate catalog entries");
    }
    (kept, dropped)
}

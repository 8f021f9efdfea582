//! Detection of notifications that appeared since the previous poll.

use std::collections::HashSet;

use eventsphere_core::config::NewItemDetection;
use eventsphere_entity::Notification;

/// Return the items of `current` considered new relative to `previous`,
/// in server order.
pub fn detect_new(
    previous: &[Notification],
    current: &[Notification],
    strategy: NewItemDetection,
) -> Vec<Notification> {
    match strategy {
        NewItemDetection::Identity => by_identity(previous, current),
        NewItemDetection::Length => by_length(previous, current),
    }
}

fn by_identity(previous: &[Notification], current: &[Notification]) -> Vec<Notification> {
    let known: HashSet<_> = previous.iter().map(|n| &n.id).collect();
    current
        .iter()
        .filter(|n| !known.contains(&n.id))
        .cloned()
        .collect()
}

/// Assumes newest-first and prepend-only: growth of `k` means the first
/// `k` items are new. Misreports when the server evicts or reorders.
fn by_length(previous: &[Notification], current: &[Notification]) -> Vec<Notification> {
    let grown = current.len().saturating_sub(previous.len());
    current[..grown].to_vec()
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Add/modify/delete events between two snapshots of the same filtered view.

use crate::fqdn::Fqdn;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Kind of change reported to stream subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Key present now but not before
    Added,
    /// Key present in both, content changed
    Modified,
    /// Key present before but not now
    Deleted,
}

impl EventType {
    /// Wire representation, also used as the SSE event name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Added => "added",
            EventType::Modified => "modified",
            EventType::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change to one record.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FqdnEvent {
    /// What happened
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// The current entry, or the last known one for deletions
    pub fqdn: Fqdn,
}

impl FqdnEvent {
    /// `added` event for `fqdn`.
    #[must_use]
    pub fn added(fqdn: Fqdn) -> Self {
        Self {
            event_type: EventType::Added,
            fqdn,
        }
    }
}

/// Events turning `previous` into `current`.
///
/// Records are keyed by `name/recordType`. Additions and modifications carry the
/// entry from `current`, deletions the entry from `previous`. Changes to
/// `lastSeen` alone produce no event.
#[must_use]
pub fn diff(previous: &[Fqdn], current: &[Fqdn]) -> Vec<FqdnEvent> {
    let before: HashMap<String, &Fqdn> = previous.iter().map(|f| (f.key(), f)).collect();
    let mut seen: HashSet<String> = HashSet::with_capacity(current.len());
    let mut events = Vec::new();

    for fqdn in current {
        let key = fqdn.key();
        match before.get(&key) {
            None => events.push(FqdnEvent::added(fqdn.clone())),
            Some(old) if !old.content_eq(fqdn) => events.push(FqdnEvent {
                event_type: EventType::Modified,
                fqdn: fqdn.clone(),
            }),
            Some(_) => {}
        }
        seen.insert(key);
    }

    for fqdn in previous {
        if !seen.contains(&fqdn.key()) {
            events.push(FqdnEvent {
                event_type: EventType::Deleted,
                fqdn: fqdn.clone(),
            });
        }
    }

    events
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod diff_tests;

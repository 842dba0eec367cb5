// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deduplicating FQDN collection keyed by name.
//!
//! Used when entries for the same DNS name arrive from several origins and one
//! authoritative entry per name is wanted. Collisions are resolved as follows:
//!
//! - **manual over discovered**: the manual entry replaces the discovered one,
//!   but keeps the discovered `targets` and `recordType` (manual entries assert
//!   ownership and description, not DNS data).
//! - **anything else** (same source, or discovered over manual): the existing
//!   entry stays; only its `lastSeen` advances if the incoming entry is newer.

use crate::fqdn::{normalize_name, Fqdn, FqdnSource};
use std::collections::{BTreeMap, HashMap};

/// Name → FQDN map with manual-over-discovered precedence.
#[derive(Clone, Debug, Default)]
pub struct FqdnCollection {
    entries: HashMap<String, Fqdn>,
}

impl FqdnCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, applying the precedence rules on name collisions.
    pub fn add(&mut self, fqdn: Fqdn) {
        let Some(existing) = self.entries.get_mut(fqdn.name()) else {
            self.entries.insert(fqdn.name().to_string(), fqdn);
            return;
        };

        if fqdn.source == FqdnSource::Manual && existing.source == FqdnSource::Discovered {
            let mut winner = fqdn;
            winner.targets = std::mem::take(&mut existing.targets);
            winner.set_record_type(existing.record_type());
            *existing = winner;
        } else if fqdn.last_seen > existing.last_seen {
            existing.last_seen = fqdn.last_seen;
        }
    }

    /// Look up an entry; the name is normalized first.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Fqdn> {
        self.entries.get(&normalize_name(name))
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no entries were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries sorted by name.
    #[must_use]
    pub fn all(&self) -> Vec<Fqdn> {
        sorted(self.entries.values().cloned().collect())
    }

    /// Entries with the given source, sorted by name.
    #[must_use]
    pub fn filter_by_source(&self, source: FqdnSource) -> Vec<Fqdn> {
        sorted(
            self.entries
                .values()
                .filter(|fqdn| fqdn.source == source)
                .cloned()
                .collect(),
        )
    }

    /// Entries partitioned by source, each partition sorted by name.
    #[must_use]
    pub fn group_by_source(&self) -> BTreeMap<FqdnSource, Vec<Fqdn>> {
        let mut groups: BTreeMap<FqdnSource, Vec<Fqdn>> = BTreeMap::new();
        for fqdn in self.entries.values() {
            groups.entry(fqdn.source).or_default().push(fqdn.clone());
        }
        groups.into_iter().map(|(source, list)| (source, sorted(list))).collect()
    }
}

impl FromIterator<Fqdn> for FqdnCollection {
    fn from_iter<I: IntoIterator<Item = Fqdn>>(iter: I) -> Self {
        let mut collection = Self::new();
        for fqdn in iter {
            collection.add(fqdn);
        }
        collection
    }
}

fn sorted(mut list: Vec<Fqdn>) -> Vec<Fqdn> {
    list.sort_by(|a, b| a.name().cmp(b.name()));
    list
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod collection_tests;

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Flattening of `DNSRecordSet` status into one deduplicated FQDN list.
//!
//! Every resource carries groups, every group carries FQDN status entries.
//! [`aggregate`] walks them all, keys each entry by `name/recordType`, and keeps
//! the first occurrence of each key. Later occurrences only add their group name.
//! A blank group name is shown as [`FALLBACK_GROUP`].
//!
//! The output is sorted by name, then record type, so repeated calls over the
//! same input produce the same list. Diffing and pagination depend on that.

use crate::constants::FALLBACK_GROUP;
use crate::crd::{DNSRecordSet, FQDNStatus};
use crate::fqdn::{normalize_name, normalize_record_type, Fqdn, FqdnSource};
use crate::resource_ref::ResourceRef;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use kube::ResourceExt;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// List filters; every populated field must match (AND).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FqdnFilters {
    /// Namespace of the owning `DNSRecordSet`
    pub namespace: Option<String>,
    /// Portal of the owning `DNSRecordSet`
    pub portal: Option<String>,
    /// Manual or discovered
    pub source: Option<FqdnSource>,
    /// Case-insensitive substring of the FQDN name
    pub search: Option<String>,
}

impl FqdnFilters {
    /// `true` when no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.namespace.is_none()
            && self.portal.is_none()
            && self.source.is_none()
            && self.search.is_none()
    }

    fn matches_resource(&self, record_set: &DNSRecordSet) -> bool {
        self.namespace
            .as_deref()
            .is_none_or(|ns| record_set.namespace().as_deref() == Some(ns))
            && self
                .portal
                .as_deref()
                .is_none_or(|portal| record_set.portal() == portal)
    }

    fn matches_entry(&self, name: &str, source: FqdnSource, search: Option<&str>) -> bool {
        self.source.is_none_or(|wanted| wanted == source)
            && search.is_none_or(|needle| name.contains(needle))
    }
}

/// Flatten, filter, deduplicate and sort the FQDNs of `record_sets`.
#[must_use]
pub fn aggregate(record_sets: &[DNSRecordSet], filters: &FqdnFilters) -> Vec<Fqdn> {
    let search = filters
        .search
        .as_deref()
        .map(normalize_name)
        .filter(|needle| !needle.is_empty());

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut output: Vec<Fqdn> = Vec::new();

    for record_set in record_sets {
        if !filters.matches_resource(record_set) {
            continue;
        }

        for group in record_set.groups() {
            let group_name = match group.name.trim() {
                "" => FALLBACK_GROUP,
                name => name,
            };

            for status in &group.fqdns {
                let name = normalize_name(&status.fqdn);
                if name.is_empty() {
                    continue;
                }
                if !filters.matches_entry(&name, status.source, search.as_deref()) {
                    continue;
                }

                let key = format!("{name}/{}", normalize_record_type(&status.record_type));
                if let Some(&position) = index.get(&key) {
                    output[position].add_group(group_name.to_string());
                } else {
                    index.insert(key, output.len());
                    output.push(to_fqdn(status, group_name));
                }
            }
        }
    }

    output.sort_by(|a, b| {
        a.name()
            .cmp(b.name())
            .then_with(|| a.record_type().cmp(b.record_type()))
    });
    output
}

fn to_fqdn(status: &FQDNStatus, group: &str) -> Fqdn {
    Fqdn::new(&status.fqdn, status.source)
        .with_record_type(&status.record_type)
        .with_targets(status.targets.iter().cloned())
        .with_description(status.description.clone())
        .with_groups([group])
        .with_sync_status(status.sync_status)
        .with_origin(parse_origin(status))
        .with_last_seen(parse_last_seen(status))
}

fn parse_origin(status: &FQDNStatus) -> Option<ResourceRef> {
    let raw = status.resource_ref.as_deref()?;
    match ResourceRef::parse(raw) {
        Ok(origin) => Some(origin),
        Err(e) => {
            debug!(fqdn = %status.fqdn, error = %e, "Ignoring malformed resource reference");
            None
        }
    }
}

fn parse_last_seen(status: &FQDNStatus) -> DateTime<Utc> {
    let Some(raw) = status.last_seen.as_deref() else {
        return DateTime::<Utc>::default();
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            debug!(fqdn = %status.fqdn, last_seen = raw, error = %e, "Ignoring malformed lastSeen timestamp");
            DateTime::<Utc>::default()
        }
    }
}

/// One page of a sorted FQDN list.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Entries on this page
    pub fqdns: Vec<Fqdn>,
    /// Token for the following page; empty on the last page
    pub next_page_token: String,
    /// Size of the full, unpaginated list
    pub total_size: usize,
}

/// Slice `all` into the page starting at `page_token`.
///
/// A `page_size` of zero returns everything. An empty, malformed or
/// out-of-range token restarts from the first entry.
#[must_use]
pub fn paginate(all: Vec<Fqdn>, page_size: usize, page_token: &str) -> Page {
    let total_size = all.len();
    if page_size == 0 {
        return Page {
            fqdns: all,
            next_page_token: String::new(),
            total_size,
        };
    }

    let offset = decode_page_token(page_token)
        .filter(|&offset| offset < total_size)
        .unwrap_or(0);
    let end = offset.saturating_add(page_size).min(total_size);
    let next_page_token = if end < total_size {
        encode_page_token(end)
    } else {
        String::new()
    };

    Page {
        fqdns: all.into_iter().skip(offset).take(end - offset).collect(),
        next_page_token,
        total_size,
    }
}

/// Opaque token for the page starting at `offset`.
#[must_use]
pub fn encode_page_token(offset: usize) -> String {
    URL_SAFE_NO_PAD.encode(offset.to_string())
}

/// Offset encoded in `token`, or `None` when it is not a token we issued.
#[must_use]
pub fn decode_page_token(token: &str) -> Option<usize> {
    let bytes = URL_SAFE_NO_PAD.decode(token.trim()).ok()?;
    std::str::from_utf8(&bytes).ok()?.parse().ok()
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod aggregator_tests;

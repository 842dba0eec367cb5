// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The FQDN value type and its enums.
//!
//! An [`Fqdn`] is one DNS name together with everything the portal tracks about
//! it: where it came from, what it should resolve to, which groups display it,
//! and whether live DNS currently agrees.
//!
//! Two FQDNs are the *same record* when their name and record type are equal;
//! `api.example.com/A` and `api.example.com/CNAME` are distinct records.

use crate::resource_ref::ResourceRef;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provenance of an FQDN entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FqdnSource {
    /// Declared by a user; asserts ownership and description
    Manual,
    /// Discovered from cluster objects; carries observed DNS data
    #[default]
    Discovered,
}

impl FqdnSource {
    /// Wire representation of the source.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FqdnSource::Manual => "manual",
            FqdnSource::Discovered => "discovered",
        }
    }
}

impl fmt::Display for FqdnSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FqdnSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(FqdnSource::Manual),
            "discovered" => Ok(FqdnSource::Discovered),
            other => Err(other.to_string()),
        }
    }
}

/// Whether live DNS resolution matches the declared state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Resolution matches the declared targets
    Sync,
    /// The name resolves, but not to the declared targets
    NotSync,
    /// The name could not be resolved at all
    #[default]
    NotAvailable,
}

impl SyncStatus {
    /// Wire representation of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Sync => "sync",
            SyncStatus::NotSync => "notsync",
            SyncStatus::NotAvailable => "notavailable",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-case and trim a DNS name.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Upper-case and trim a record type (`a` and `A` compare equal).
#[must_use]
pub fn normalize_record_type(record_type: &str) -> String {
    record_type.trim().to_ascii_uppercase()
}

/// One DNS name's current known state.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fqdn {
    name: String,

    /// Manual or discovered
    pub source: FqdnSource,

    /// Free-text description shown next to the name
    pub description: String,

    record_type: String,

    /// Declared targets (addresses or canonical name)
    pub targets: Vec<String>,

    /// Groups the name is displayed under, in first-seen order
    pub groups: Vec<String>,

    /// Kubernetes object that produced the entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_resource: Option<ResourceRef>,

    /// Result of the most recent DNS check
    pub sync_status: SyncStatus,

    /// Observation timestamp
    pub last_seen: DateTime<Utc>,
}

impl Fqdn {
    /// Create an entry with a normalized name and no record data.
    #[must_use]
    pub fn new(name: &str, source: FqdnSource) -> Self {
        Self {
            name: normalize_name(name),
            source,
            description: String::new(),
            record_type: String::new(),
            targets: Vec::new(),
            groups: Vec::new(),
            origin_resource: None,
            sync_status: SyncStatus::default(),
            last_seen: Utc::now(),
        }
    }

    /// Set the record type (normalized to upper case).
    #[must_use]
    pub fn with_record_type(mut self, record_type: &str) -> Self {
        self.set_record_type(record_type);
        self
    }

    /// Set the declared targets.
    #[must_use]
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the groups, dropping duplicates while keeping the first-seen order.
    #[must_use]
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.clear();
        for group in groups {
            self.add_group(group.into());
        }
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the observation timestamp.
    #[must_use]
    pub fn with_last_seen(mut self, last_seen: DateTime<Utc>) -> Self {
        self.last_seen = last_seen;
        self
    }

    /// Set the sync status.
    #[must_use]
    pub fn with_sync_status(mut self, status: SyncStatus) -> Self {
        self.sync_status = status;
        self
    }

    /// Set the origin reference; the zero reference clears it.
    #[must_use]
    pub fn with_origin(mut self, origin: Option<ResourceRef>) -> Self {
        self.origin_resource = origin.filter(|r| !r.is_zero());
        self
    }

    /// Normalized DNS name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized record type; empty means existence-only.
    #[must_use]
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Replace the record type (normalized to upper case).
    pub fn set_record_type(&mut self, record_type: &str) {
        self.record_type = normalize_record_type(record_type);
    }

    /// Composite `name/recordType` key identifying the record.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}/{}", self.name, self.record_type)
    }

    /// `true` when both entries describe the same record (name and type).
    #[must_use]
    pub fn same_record(&self, other: &Fqdn) -> bool {
        self.name == other.name && self.record_type == other.record_type
    }

    /// Add a group unless it is already present. Returns `true` if added.
    pub fn add_group(&mut self, group: String) -> bool {
        if self.groups.contains(&group) {
            return false;
        }
        self.groups.push(group);
        true
    }

    /// Field equality ignoring only the observation timestamp.
    ///
    /// Groups and targets are compared as ordered lists.
    #[must_use]
    pub fn content_eq(&self, other: &Fqdn) -> bool {
        self.name == other.name
            && self.source == other.source
            && self.description == other.description
            && self.record_type == other.record_type
            && self.sync_status == other.sync_status
            && self.groups == other.groups
            && self.targets == other.targets
            && self.origin_resource == other.origin_resource
    }
}

#[cfg(test)]
#[path = "fqdn_tests.rs"]
mod fqdn_tests;

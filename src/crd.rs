// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) read by the DNS portal.
//!
//! # Resource Types
//!
//! - [`DNSRecordSet`] - FQDN status published by a producer for one portal,
//!   bucketed into named groups
//!
//! Producers (controllers scraping ingresses, services or load balancers) own the
//! `status` of each `DNSRecordSet`; the portal only reads it.
//!
//! # Example: A populated record set
//!
//! ```rust,no_run
//! use dnsportal::crd::{DNSRecordSetSpec, DNSRecordSetStatus, FQDNGroupStatus, FQDNStatus};
//! use dnsportal::fqdn::{FqdnSource, SyncStatus};
//!
//! let spec = DNSRecordSetSpec {
//!     portal_ref: Some("public".to_string()),
//! };
//!
//! let status = DNSRecordSetStatus {
//!     groups: vec![FQDNGroupStatus {
//!         name: "Storefront".to_string(),
//!         fqdns: vec![FQDNStatus {
//!             fqdn: "shop.example.com".to_string(),
//!             record_type: "A".to_string(),
//!             targets: vec!["192.0.2.10".to_string()],
//!             description: String::new(),
//!             source: FqdnSource::Discovered,
//!             sync_status: SyncStatus::Sync,
//!             last_seen: Some("2025-01-01T00:00:00Z".to_string()),
//!             resource_ref: Some("Ingress/shop/storefront".to_string()),
//!         }],
//!     }],
//!     observed_generation: Some(1),
//!     last_update_time: None,
//! };
//! ```

use crate::fqdn::{FqdnSource, SyncStatus};
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `DNSRecordSet` specification.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dnsportal.firestoned.io",
    version = "v1alpha1",
    kind = "DNSRecordSet",
    namespaced,
    shortname = "dnsrs",
    doc = "DNSRecordSet publishes the FQDNs discovered or declared for one portal. Producers write the status; the DNS portal aggregates every DNSRecordSet into a single deduplicated view."
)]
#[kube(status = "DNSRecordSetStatus")]
#[serde(rename_all = "camelCase")]
pub struct DNSRecordSetSpec {
    /// Portal this set is published to.
    ///
    /// Defaults to the name of the `DNSRecordSet` when unset or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portal_ref: Option<String>,
}

/// Observed FQDNs of a `DNSRecordSet`, grouped for display.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DNSRecordSetStatus {
    /// Named groups of FQDNs
    #[serde(default)]
    pub groups: Vec<FQDNGroupStatus>,

    /// Generation of the spec the producer last acted on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// RFC 3339 timestamp of the producer's last status write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<String>,
}

/// One display group and its FQDNs.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FQDNGroupStatus {
    /// Group name shown to users
    pub name: String,

    /// FQDNs in this group
    #[serde(default)]
    pub fqdns: Vec<FQDNStatus>,
}

/// Status of a single FQDN as reported by a producer.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FQDNStatus {
    /// Fully-qualified domain name (case-insensitive)
    pub fqdn: String,

    /// Declared record type (`A`, `AAAA`, `CNAME`, ...). Empty for existence-only entries.
    #[serde(default)]
    pub record_type: String,

    /// Declared targets: addresses for A/AAAA, the canonical name for CNAME
    #[serde(default)]
    pub targets: Vec<String>,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Whether the FQDN was declared manually or discovered
    #[serde(default)]
    pub source: FqdnSource,

    /// Result of the producer's last DNS check
    #[serde(default)]
    pub sync_status: SyncStatus,

    /// RFC 3339 timestamp of the last observation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,

    /// Origin object as `kind/namespace/name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_ref: Option<String>,
}

impl DNSRecordSet {
    /// Portal this set belongs to: `spec.portalRef`, or the resource name.
    #[must_use]
    pub fn portal(&self) -> String {
        self.spec
            .portal_ref
            .as_deref()
            .map(str::trim)
            .filter(|portal| !portal.is_empty())
            .map_or_else(|| self.name_any(), str::to_string)
    }

    /// Groups reported in the status (empty when no status was written yet).
    #[must_use]
    pub fn groups(&self) -> &[FQDNGroupStatus] {
        self.status.as_ref().map_or(&[], |status| status.groups.as_slice())
    }
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;

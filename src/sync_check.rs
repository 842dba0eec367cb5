// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS sync-status classification.
//!
//! [`SyncChecker::check`] resolves a name through a [`NameResolver`] and compares
//! what it finds with the declared record type and targets:
//!
//! | Record type     | Lookup         | `sync` when                                          |
//! |-----------------|----------------|------------------------------------------------------|
//! | `A` / `AAAA`    | addresses      | same multiset as expected, within the record type family |
//! | `CNAME`         | canonical name | canonical name equals the first expected target      |
//! | anything else   | addresses      | at least one address is returned                     |
//!
//! Address lookups return both families; `A` checks keep only IPv4 answers and
//! `AAAA` checks only IPv6 answers, so a dual-stack name can be `sync` for both.
//! Comparisons are case-insensitive and ignore a single trailing dot on
//! canonical names. Any lookup error yields `notavailable`; errors are never
//! propagated to callers.

use crate::constants::{RECORD_TYPE_A, RECORD_TYPE_AAAA, RECORD_TYPE_CNAME};
use crate::fqdn::SyncStatus;
use crate::metrics;
use crate::resolver::NameResolver;
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Outcome of one sync check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    /// Classification of the live DNS state
    pub status: SyncStatus,
    /// What resolution actually returned (empty on failure)
    pub resolved_targets: Vec<String>,
}

impl CheckResult {
    fn not_available() -> Self {
        Self {
            status: SyncStatus::NotAvailable,
            resolved_targets: Vec::new(),
        }
    }
}

/// Classifies FQDNs against live DNS.
#[derive(Clone)]
pub struct SyncChecker {
    resolver: Arc<dyn NameResolver>,
}

impl SyncChecker {
    /// Create a checker using `resolver` for all lookups.
    #[must_use]
    pub fn new(resolver: Arc<dyn NameResolver>) -> Self {
        Self { resolver }
    }

    /// Check `name` against the declared `record_type` and `expected_targets`.
    pub async fn check(&self, name: &str, record_type: &str, expected_targets: &[String]) -> CheckResult {
        let record_type = record_type.trim().to_ascii_uppercase();

        let result = match record_type.as_str() {
            RECORD_TYPE_A => self.check_addresses(name, expected_targets, IpAddr::is_ipv4).await,
            RECORD_TYPE_AAAA => self.check_addresses(name, expected_targets, IpAddr::is_ipv6).await,
            RECORD_TYPE_CNAME => self.check_cname(name, expected_targets).await,
            _ => self.check_exists(name).await,
        };

        debug!(
            fqdn = name,
            record_type = %record_type,
            status = %result.status,
            resolved = ?result.resolved_targets,
            "DNS sync check completed"
        );
        metrics::record_sync_check(result.status.as_str());
        result
    }

    async fn check_addresses(
        &self,
        name: &str,
        expected: &[String],
        in_family: fn(&IpAddr) -> bool,
    ) -> CheckResult {
        let resolved: Vec<String> = match self.resolver.lookup_host(name).await {
            Ok(resolved) => resolved
                .into_iter()
                .filter(|address| address.trim().parse::<IpAddr>().map_or(true, |ip| in_family(&ip)))
                .collect(),
            Err(e) => {
                debug!(fqdn = name, error = %e, "Address lookup failed");
                return CheckResult::not_available();
            }
        };

        let status = if same_multiset(&resolved, expected) {
            SyncStatus::Sync
        } else {
            SyncStatus::NotSync
        };

        CheckResult {
            status,
            resolved_targets: resolved,
        }
    }

    async fn check_cname(&self, name: &str, expected: &[String]) -> CheckResult {
        let canonical = match self.resolver.lookup_cname(name).await {
            Ok(canonical) => canonical,
            Err(e) => {
                debug!(fqdn = name, error = %e, "CNAME lookup failed");
                return CheckResult::not_available();
            }
        };

        let matches = expected
            .first()
            .is_some_and(|target| strip_dot(target).eq_ignore_ascii_case(strip_dot(&canonical)));

        CheckResult {
            status: if matches {
                SyncStatus::Sync
            } else {
                SyncStatus::NotSync
            },
            resolved_targets: vec![canonical],
        }
    }

    async fn check_exists(&self, name: &str) -> CheckResult {
        match self.resolver.lookup_host(name).await {
            Ok(resolved) if !resolved.is_empty() => CheckResult {
                status: SyncStatus::Sync,
                resolved_targets: resolved,
            },
            Ok(_) => CheckResult::not_available(),
            Err(e) => {
                debug!(fqdn = name, error = %e, "Existence lookup failed");
                CheckResult::not_available()
            }
        }
    }
}

/// Order-independent, case-insensitive comparison of two target lists.
fn same_multiset(resolved: &[String], expected: &[String]) -> bool {
    if resolved.len() != expected.len() {
        return false;
    }

    let normalize = |list: &[String]| {
        let mut list: Vec<String> = list.iter().map(|t| t.trim().to_lowercase()).collect();
        list.sort_unstable();
        list
    };

    normalize(resolved) == normalize(expected)
}

fn strip_dot(name: &str) -> &str {
    let name = name.trim();
    name.strip_suffix('.').unwrap_or(name)
}

#[cfg(test)]
#[path = "sync_check_tests.rs"]
mod sync_check_tests;

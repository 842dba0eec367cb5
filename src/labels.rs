// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label and annotation keys read from origin objects.
//!
//! Producers copy these keys from the Kubernetes objects they scrape (ingresses,
//! services, gateways) so that the portal can attribute each FQDN to a group and
//! to the object that published it.

// ============================================================================
// Provenance Labels
// ============================================================================

/// Comma-separated list of groups an origin object explicitly belongs to.
///
/// Takes precedence over every configured group mapping rule.
pub const GROUPS_ANNOTATION: &str = "dnsportal.firestoned.io/groups";

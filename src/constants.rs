// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the DNS portal.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the `DNSRecordSet` CRD
pub const API_GROUP: &str = "dnsportal.firestoned.io";

/// API version for the `DNSRecordSet` CRD
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "dnsportal.firestoned.io/v1alpha1";

/// Kind name for `DNSRecordSet` resource
pub const KIND_DNS_RECORD_SET: &str = "DNSRecordSet";

// ============================================================================
// DNS Constants
// ============================================================================

/// Standard DNS port for queries
pub const DNS_PORT: u16 = 53;

/// Nameserver used when `/etc/resolv.conf` has no usable entry
pub const FALLBACK_NAMESERVER: &str = "127.0.0.1:53";

/// Location of the system resolver configuration
pub const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// Default timeout for a single DNS query (seconds)
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 5;

/// Record type for IPv4 address records
pub const RECORD_TYPE_A: &str = "A";

/// Record type for IPv6 address records
pub const RECORD_TYPE_AAAA: &str = "AAAA";

/// Record type for canonical name records
pub const RECORD_TYPE_CNAME: &str = "CNAME";

// ============================================================================
// Grouping Constants
// ============================================================================

/// Group assigned when no mapping rule produces a group
pub const FALLBACK_GROUP: &str = "Services";

// ============================================================================
// Cache & Streaming Constants
// ============================================================================

/// Default interval between snapshot refreshes (seconds)
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// Default number of buffered events per stream subscriber
pub const DEFAULT_STREAM_BUFFER: usize = 64;

/// Interval between SSE keep-alive comments (seconds)
pub const SSE_KEEP_ALIVE_SECS: u64 = 15;

// ============================================================================
// Kubernetes API Constants
// ============================================================================

/// Page size for Kubernetes API list operations
///
/// Kubernetes API supports pagination for list operations. This constant defines
/// the number of items to fetch per page to reduce memory usage and API server load.
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

// ============================================================================
// HTTP API Constants
// ============================================================================

/// Default address the HTTP API listens on
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

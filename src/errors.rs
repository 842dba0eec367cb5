// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the DNS portal.
//!
//! This module provides specialized error types for:
//! - Parsing `kind/namespace/name` resource references
//! - Name-resolution lookups performed by the sync checker
//! - Listing `DNSRecordSet` resources from the backing store
//! - Service-layer operations exposed at the API boundary
//! - Service configuration
//!
//! Name-resolution errors never reach API callers: the sync checker folds every
//! variant into [`crate::fqdn::SyncStatus::NotAvailable`]. They exist so that
//! the resolver implementations can log something meaningful.

use thiserror::Error;

/// Errors that can occur while parsing a resource reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceRefError {
    /// The reference is not of the form `kind/namespace/name`
    ///
    /// Returned when the raw string does not split into exactly three segments,
    /// or when any segment is empty after trimming whitespace.
    #[error("Invalid resource reference '{raw}': expected 'kind/namespace/name'")]
    InvalidResourceRef {
        /// The offending raw string, verbatim
        raw: String,
    },
}

/// Errors returned by [`crate::resolver::NameResolver`] implementations.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// The name could not be turned into a DNS query name
    #[error("Invalid DNS name '{name}': {reason}")]
    InvalidName {
        /// The name that failed to parse
        name: String,
        /// Parser error message
        reason: String,
    },

    /// The query could not be sent or no response arrived (timeout, socket error)
    #[error("DNS query for '{name}' to {server} failed: {reason}")]
    QueryFailed {
        /// The queried name
        name: String,
        /// Nameserver address
        server: String,
        /// Transport error message
        reason: String,
    },

    /// The server answered with a non-success response code (NXDOMAIN, SERVFAIL, ...)
    #[error("DNS server {server} answered {response_code} for '{name}'")]
    ErrorResponse {
        /// The queried name
        name: String,
        /// Nameserver address
        server: String,
        /// Response code as reported by the server
        response_code: String,
    },

    /// The response carried no answer of the requested type
    #[error("No {record_type} records found for '{name}'")]
    NoRecords {
        /// The queried name
        name: String,
        /// Requested record type
        record_type: String,
    },

    /// The blocking lookup task was cancelled or panicked
    #[error("DNS lookup task for '{name}' did not complete: {reason}")]
    TaskFailed {
        /// The queried name
        name: String,
        /// Join error message
        reason: String,
    },
}

/// Errors that can occur while listing `DNSRecordSet` resources.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The Kubernetes API rejected or failed the list call
    #[error("Failed to list DNSRecordSets: {0}")]
    Kube(#[from] kube::Error),

    /// Any other backing-store failure (used by non-Kubernetes sources)
    #[error("Backing store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by [`crate::service::FqdnService`].
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The backing store failed and no cached snapshot exists yet
    #[error("DNS records are not available yet: {0}")]
    NotReady(#[source] SourceError),

    /// A caller supplied a resource reference that does not parse
    #[error(transparent)]
    ResourceRef(#[from] ResourceRefError),

    /// A caller supplied an unknown source filter value
    #[error("Unknown FQDN source '{0}': expected 'manual' or 'discovered'")]
    InvalidSource(String),
}

/// Errors raised while building the service configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A `--namespace-group` value is not of the form `namespace=group`
    #[error("Invalid namespace group mapping '{0}': expected 'namespace=group'")]
    InvalidNamespaceGroup(String),

    /// The refresh interval must be at least one second
    #[error("Refresh interval must be at least 1 second")]
    InvalidRefreshInterval,

    /// A nameserver argument is not a socket address
    #[error("Invalid nameserver address '{0}': expected 'ip:port'")]
    InvalidNameserver(String),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;

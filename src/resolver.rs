// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Name-resolution capability used by the sync checker.
//!
//! [`NameResolver`] is the seam between the sync checker and the network. The
//! production implementation, [`HickoryResolver`], sends plain UDP queries to a
//! single nameserver with the Hickory DNS client. Tests substitute in-memory
//! fakes.
//!
//! # Example
//!
//! ```rust,no_run
//! use dnsportal::resolver::{HickoryResolver, NameResolver};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let resolver = HickoryResolver::new("10.96.0.10:53".parse().unwrap(), Duration::from_secs(5));
//! let addresses = resolver.lookup_host("kubernetes.default.svc.cluster.local").await;
//! # }
//! ```

use crate::constants::{DNS_PORT, FALLBACK_NAMESERVER, RESOLV_CONF_PATH};
use crate::errors::ResolveError;
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::ResponseCode;
use hickory_client::rr::{DNSClass, Name, RData, RecordType};
use hickory_client::udp::UdpClientConnection;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Resolves DNS names for the sync checker.
///
/// Failures carry no meaning beyond "not available".
#[async_trait::async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve the addresses of a name (A and AAAA answers).
    ///
    /// # Errors
    ///
    /// Returns an error if the name cannot be resolved to at least one address.
    async fn lookup_host(&self, name: &str) -> Result<Vec<String>, ResolveError>;

    /// Resolve the canonical name of an alias.
    ///
    /// # Errors
    ///
    /// Returns an error if the name has no CNAME record or cannot be queried.
    async fn lookup_cname(&self, name: &str) -> Result<String, ResolveError>;
}

/// [`NameResolver`] backed by the Hickory DNS client.
#[derive(Clone, Debug)]
pub struct HickoryResolver {
    nameserver: SocketAddr,
    timeout: Duration,
}

impl HickoryResolver {
    /// Create a resolver querying `nameserver` with a per-query `timeout`.
    #[must_use]
    pub fn new(nameserver: SocketAddr, timeout: Duration) -> Self {
        Self {
            nameserver,
            timeout,
        }
    }

    /// Nameserver this resolver queries.
    #[must_use]
    pub fn nameserver(&self) -> SocketAddr {
        self.nameserver
    }

    async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<RData>, ResolveError> {
        let name_str = name.to_string();
        let server = self.nameserver;
        let timeout = self.timeout;

        // hickory-client's SyncClient blocks, keep it off the async workers
        tokio::task::spawn_blocking(move || query_blocking(server, timeout, &name_str, record_type))
            .await
            .map_err(|e| ResolveError::TaskFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?
    }
}

#[async_trait::async_trait]
impl NameResolver for HickoryResolver {
    async fn lookup_host(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        let mut addresses = Vec::new();
        let mut last_error = None;

        for record_type in [RecordType::A, RecordType::AAAA] {
            match self.query(name, record_type).await {
                Ok(answers) => addresses.extend(answers.iter().filter_map(|rdata| match rdata {
                    RData::A(ip) => Some(ip.to_string()),
                    RData::AAAA(ip) => Some(ip.to_string()),
                    _ => None,
                })),
                Err(e) => {
                    debug!(fqdn = name, ?record_type, error = %e, "Address lookup failed");
                    last_error = Some(e);
                }
            }
        }

        if addresses.is_empty() {
            return Err(last_error.unwrap_or_else(|| ResolveError::NoRecords {
                name: name.to_string(),
                record_type: "A/AAAA".to_string(),
            }));
        }

        Ok(addresses)
    }

    async fn lookup_cname(&self, name: &str) -> Result<String, ResolveError> {
        self.query(name, RecordType::CNAME)
            .await?
            .into_iter()
            .find_map(|rdata| match rdata {
                RData::CNAME(cname) => Some(cname.0.to_string()),
                _ => None,
            })
            .ok_or_else(|| ResolveError::NoRecords {
                name: name.to_string(),
                record_type: "CNAME".to_string(),
            })
    }
}

/// Send one query and return the answers of the requested type.
fn query_blocking(
    server: SocketAddr,
    timeout: Duration,
    name: &str,
    record_type: RecordType,
) -> Result<Vec<RData>, ResolveError> {
    let query_failed = |reason: String| ResolveError::QueryFailed {
        name: name.to_string(),
        server: server.to_string(),
        reason,
    };

    let mut fqdn = Name::from_str(name).map_err(|e| ResolveError::InvalidName {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    fqdn.set_fqdn(true);

    let conn = UdpClientConnection::with_timeout(server, timeout)
        .map_err(|e| query_failed(format!("failed to create UDP connection: {e}")))?;
    let client = SyncClient::new(conn);

    let response = client
        .query(&fqdn, DNSClass::IN, record_type)
        .map_err(|e| query_failed(e.to_string()))?;

    let code = response.response_code();
    if code != ResponseCode::NoError {
        return Err(ResolveError::ErrorResponse {
            name: name.to_string(),
            server: server.to_string(),
            response_code: code.to_string(),
        });
    }

    Ok(response
        .answers()
        .iter()
        .filter(|record| record.record_type() == record_type)
        .filter_map(|record| record.data().cloned())
        .collect())
}

/// First usable `nameserver` entry of `/etc/resolv.conf`, or [`FALLBACK_NAMESERVER`].
#[must_use]
pub fn system_nameserver() -> SocketAddr {
    std::fs::read_to_string(RESOLV_CONF_PATH)
        .ok()
        .and_then(|contents| parse_resolv_conf(&contents))
        .unwrap_or_else(fallback_nameserver)
}

/// Extract the first parseable nameserver from resolv.conf contents.
#[must_use]
pub fn parse_resolv_conf(contents: &str) -> Option<SocketAddr> {
    contents.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some("nameserver"), Some(addr)) => addr
                .parse::<IpAddr>()
                .ok()
                .map(|ip| SocketAddr::new(ip, DNS_PORT)),
            _ => None,
        }
    })
}

fn fallback_nameserver() -> SocketAddr {
    FALLBACK_NAMESERVER
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], DNS_PORT)))
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod resolver_tests;

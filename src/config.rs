// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration of the `dnsportal` binary.
//!
//! Every flag can also be set through a `DNSPORTAL_*` environment variable,
//! which is how the Deployment manifest configures it.

use crate::constants::{
    DEFAULT_DNS_TIMEOUT_SECS, DEFAULT_LISTEN_ADDR, DEFAULT_REFRESH_INTERVAL_SECS,
    DEFAULT_STREAM_BUFFER, DNS_PORT,
};
use crate::errors::ConfigError;
use crate::group_mapping::GroupMappingStrategy;
use crate::resolver::system_nameserver;
use clap::Parser;
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// DNS portal service
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "dnsportal", author, version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP API listens on
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR, env = "DNSPORTAL_LISTEN_ADDR")]
    pub listen_addr: SocketAddr,

    /// Seconds between snapshot refreshes
    #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL_SECS, env = "DNSPORTAL_REFRESH_INTERVAL_SECS")]
    pub refresh_interval_secs: u64,

    /// Only read DNSRecordSets from this namespace
    #[arg(long, env = "DNSPORTAL_WATCH_NAMESPACE")]
    pub watch_namespace: Option<String>,

    /// Nameserver used for sync checks (`ip` or `ip:port`); defaults to /etc/resolv.conf
    #[arg(long, env = "DNSPORTAL_NAMESERVER")]
    pub nameserver: Option<String>,

    /// Timeout for a single DNS query, in seconds
    #[arg(long, default_value_t = DEFAULT_DNS_TIMEOUT_SECS, env = "DNSPORTAL_DNS_TIMEOUT_SECS")]
    pub dns_timeout_secs: u64,

    /// Group used when no label or namespace rule applies
    #[arg(long, default_value = "", env = "DNSPORTAL_DEFAULT_GROUP")]
    pub default_group: String,

    /// Label whose value names the group of an object
    #[arg(long, env = "DNSPORTAL_GROUP_LABEL_KEY")]
    pub group_label_key: Option<String>,

    /// Namespace to group mapping as `namespace=group` (repeatable, or comma-separated)
    #[arg(long = "namespace-group", value_delimiter = ',', env = "DNSPORTAL_NAMESPACE_GROUPS")]
    pub namespace_groups: Vec<String>,

    /// Events buffered per stream subscriber
    #[arg(long, default_value_t = DEFAULT_STREAM_BUFFER, env = "DNSPORTAL_STREAM_BUFFER")]
    pub stream_buffer: usize,
}

impl Config {
    /// Check values clap cannot validate on its own.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::InvalidRefreshInterval);
        }
        self.group_mapping()?;
        self.nameserver_addr()?;
        Ok(())
    }

    /// Refresh interval as a [`Duration`].
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// DNS query timeout as a [`Duration`].
    #[must_use]
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    /// Group mapping built from the group flags.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNamespaceGroup`] for a pair without `=`
    /// or with an empty side.
    pub fn group_mapping(&self) -> Result<GroupMappingStrategy, ConfigError> {
        let mut by_namespace = BTreeMap::new();
        for pair in &self.namespace_groups {
            let (namespace, group) = pair
                .split_once('=')
                .map(|(ns, group)| (ns.trim(), group.trim()))
                .filter(|(ns, group)| !ns.is_empty() && !group.is_empty())
                .ok_or_else(|| ConfigError::InvalidNamespaceGroup(pair.clone()))?;
            by_namespace.insert(namespace.to_string(), group.to_string());
        }

        Ok(GroupMappingStrategy {
            default_group: self.default_group.trim().to_string(),
            label_key: self
                .group_label_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            by_namespace,
        })
    }

    /// Nameserver for sync checks; the system resolver when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNameserver`] when the value is neither an
    /// IP address nor a socket address.
    pub fn nameserver_addr(&self) -> Result<SocketAddr, ConfigError> {
        let Some(raw) = self.nameserver.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(system_nameserver());
        };

        raw.parse::<SocketAddr>()
            .or_else(|_| raw.parse::<IpAddr>().map(|ip| SocketAddr::new(ip, DNS_PORT)))
            .map_err(|_| ConfigError::InvalidNameserver(raw.to_string()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

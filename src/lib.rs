// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # dnsportal - Aggregated DNS view for Kubernetes
//!
//! dnsportal reads the FQDN status published in `DNSRecordSet` custom resources,
//! merges it into one deduplicated, sorted view, and serves that view to many
//! clients at once without re-listing the cluster for each of them.
//!
//! ## Overview
//!
//! - A background loop refreshes an in-memory [`cache::SnapshotCache`] on a
//!   fixed interval.
//! - List queries read the cluster directly and fall back to the cache when the
//!   API server is unavailable.
//! - Stream subscribers receive the current view as `added` events, followed by
//!   `added`/`modified`/`deleted` diffs after every refresh.
//!
//! ## Modules
//!
//! - [`fqdn`], [`resource_ref`], [`group_mapping`], [`collection`] - domain model
//! - [`resolver`], [`sync_check`] - live DNS sync-status checks
//! - [`crd`], [`source`], [`pagination`] - the `DNSRecordSet` backing store
//! - [`aggregator`], [`diff`], [`cache`] - aggregation and broadcast
//! - [`service`], [`api`] - the operations and their HTTP binding
//! - [`config`], [`metrics`], [`errors`] - service plumbing
//!
//! ## Example
//!
//! ```rust,no_run
//! use dnsportal::aggregator::{aggregate, FqdnFilters};
//! use dnsportal::crd::DNSRecordSet;
//!
//! fn names(record_sets: &[DNSRecordSet]) -> Vec<String> {
//!     aggregate(record_sets, &FqdnFilters::default())
//!         .iter()
//!         .map(|fqdn| fqdn.key())
//!         .collect()
//! }
//! ```

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod collection;
pub mod config;
pub mod constants;
pub mod crd;
pub mod diff;
pub mod errors;
pub mod fqdn;
pub mod group_mapping;
pub mod labels;
pub mod metrics;
pub mod pagination;
pub mod resolver;
pub mod resource_ref;
pub mod service;
pub mod source;
pub mod sync_check;

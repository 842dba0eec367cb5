// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service layer: the operations exposed at the API boundary.
//!
//! [`FqdnService`] ties together the backing store, the [`SnapshotCache`], the
//! [`SyncChecker`] and the [`GroupMappingStrategy`]. It is format-agnostic; the
//! HTTP binding lives in [`crate::api`].
//!
//! - `list_fqdns` reads the backing store directly, so it is strongly
//!   consistent. When that read fails it falls back to the cached resources,
//!   provided the cache has been filled at least once.
//! - `stream_fqdns` only reads the cache. Each subscriber first receives the
//!   whole filtered view as `added` events, then the diff after every refresh.

use crate::aggregator::{aggregate, paginate, FqdnFilters, Page};
use crate::cache::{Snapshot, SnapshotCache};
use crate::collection::FqdnCollection;
use crate::diff::{diff, FqdnEvent};
use crate::errors::ServiceError;
use crate::group_mapping::GroupMappingStrategy;
use crate::metrics;
use crate::resource_ref::ResourceRef;
use crate::source::{RecordSetSelector, RecordSetSource};
use crate::sync_check::{CheckResult, SyncChecker};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Names and records currently held by the cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// `false` until the first refresh
    pub ready: bool,
    /// Generation of the snapshot the summary was computed from
    pub generation: u64,
    /// When that snapshot was committed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Distinct `name/recordType` records
    pub total_records: usize,
    /// Distinct DNS names
    pub total_names: usize,
    /// Distinct DNS names per source (`manual`, `discovered`)
    pub by_source: BTreeMap<String, usize>,
}

/// Entry point for every portal operation.
#[derive(Clone)]
pub struct FqdnService {
    source: Arc<dyn RecordSetSource>,
    cache: SnapshotCache,
    checker: SyncChecker,
    groups: GroupMappingStrategy,
    stream_buffer: usize,
}

impl FqdnService {
    /// Build the service.
    ///
    /// `stream_buffer` bounds the number of events queued per subscriber.
    #[must_use]
    pub fn new(
        source: Arc<dyn RecordSetSource>,
        cache: SnapshotCache,
        checker: SyncChecker,
        groups: GroupMappingStrategy,
        stream_buffer: usize,
    ) -> Self {
        Self {
            source,
            cache,
            checker,
            groups,
            stream_buffer: stream_buffer.max(1),
        }
    }

    /// The cache backing streams and fallback reads.
    #[must_use]
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// One page of FQDNs matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotReady`] when the backing store fails and the
    /// cache has never been filled.
    pub async fn list_fqdns(
        &self,
        filters: &FqdnFilters,
        page_size: usize,
        page_token: &str,
    ) -> Result<Page, ServiceError> {
        let selector = RecordSetSelector {
            namespace: filters.namespace.clone(),
            portal: filters.portal.clone(),
        };

        let fqdns = match self.source.list_matching(&selector).await {
            Ok(resources) => {
                metrics::record_list_request("live");
                aggregate(&resources, filters)
            }
            Err(e) => {
                let snapshot = self.cache.snapshot();
                if !snapshot.is_ready() {
                    return Err(ServiceError::NotReady(e));
                }
                warn!(
                    error = %e,
                    generation = snapshot.generation,
                    "Listing DNSRecordSets failed, serving cached snapshot"
                );
                metrics::record_list_request("cached");
                aggregate(&snapshot.resources, filters)
            }
        };

        Ok(paginate(fqdns, page_size, page_token))
    }

    /// Live feed of changes to the FQDNs matching `filters`.
    ///
    /// The stream ends when `cancel` fires or the returned stream is dropped.
    #[must_use]
    pub fn stream_fqdns(&self, filters: FqdnFilters, cancel: CancellationToken) -> ReceiverStream<FqdnEvent> {
        let (tx, rx) = mpsc::channel(self.stream_buffer);
        let cache = self.cache.clone();
        tokio::spawn(async move {
            metrics::record_stream_opened();
            run_stream(&cache, &filters, &tx, &cancel).await;
            metrics::record_stream_closed();
            debug!(filters = ?filters, "FQDN stream closed");
        });
        ReceiverStream::new(rx)
    }

    /// Groups for an object with `labels` in `namespace`.
    #[must_use]
    pub fn resolve_groups(&self, labels: Option<&BTreeMap<String, String>>, namespace: &str) -> Vec<String> {
        self.groups.resolve(labels, namespace)
    }

    /// Parse a `kind/namespace/name` reference.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ResourceRef`] carrying the raw input when it does not parse.
    pub fn parse_resource_ref(&self, raw: &str) -> Result<ResourceRef, ServiceError> {
        Ok(ResourceRef::parse(raw)?)
    }

    /// Check `name` against live DNS.
    pub async fn check_fqdn(&self, name: &str, record_type: &str, targets: &[String]) -> CheckResult {
        self.checker.check(name, record_type, targets).await
    }

    /// Counts over the current snapshot.
    ///
    /// Names present both as manual and discovered count once, as manual.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let snapshot = self.cache.snapshot();
        let names: FqdnCollection = snapshot.fqdns.iter().cloned().collect();

        Summary {
            ready: snapshot.is_ready(),
            generation: snapshot.generation,
            refreshed_at: snapshot.refreshed_at,
            total_records: snapshot.fqdns.len(),
            total_names: names.len(),
            by_source: names
                .group_by_source()
                .into_iter()
                .map(|(source, fqdns)| (source.as_str().to_string(), fqdns.len()))
                .collect(),
        }
    }
}

async fn run_stream(
    cache: &SnapshotCache,
    filters: &FqdnFilters,
    tx: &mpsc::Sender<FqdnEvent>,
    cancel: &CancellationToken,
) {
    let mut subscription = cache.subscribe();

    let Some(snapshot) = wait(cancel, tx, subscription.wait_ready()).await else {
        return;
    };
    let mut previous = snapshot.view(filters);
    let initial = previous.iter().cloned().map(FqdnEvent::added).collect();
    if !send_events(cancel, tx, initial).await {
        return;
    }

    while let Some(snapshot) = wait(cancel, tx, subscription.next()).await {
        let current = snapshot.view(filters);
        let events = diff(&previous, &current);
        previous = current;
        if !send_events(cancel, tx, events).await {
            return;
        }
    }
}

/// Wait for the next snapshot unless the subscriber goes away first.
async fn wait<F>(cancel: &CancellationToken, tx: &mpsc::Sender<FqdnEvent>, next: F) -> Option<Arc<Snapshot>>
where
    F: std::future::Future<Output = Option<Arc<Snapshot>>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        () = tx.closed() => None,
        snapshot = next => snapshot,
    }
}

/// Deliver `events` in order. Returns `false` once the subscriber is gone.
async fn send_events(cancel: &CancellationToken, tx: &mpsc::Sender<FqdnEvent>, events: Vec<FqdnEvent>) -> bool {
    for event in events {
        let event_type = event.event_type;
        let sent = tokio::select! {
            biased;
            () = cancel.cancelled() => false,
            result = tx.send(event) => result.is_ok(),
        };
        if !sent {
            return false;
        }
        metrics::record_stream_event(event_type.as_str());
    }
    true
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;

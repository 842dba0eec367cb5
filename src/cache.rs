// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory snapshot of every FQDN, refreshed in the background.
//!
//! # State machine
//!
//! ```text
//!   Empty ──first successful refresh──▶ Ready ──cancel──▶ (frozen)
//!                                        │  ▲
//!                                        └──┘ every successful refresh
//! ```
//!
//! The refresh loop is the only writer. It scans the backing store with no
//! lock held, then swaps the new [`Snapshot`] in behind a `tokio::sync::watch`
//! channel. The swap replaces one `Arc`, so readers only ever see a complete
//! snapshot and are never blocked for longer than a pointer copy.
//!
//! Subscribers get a [`Subscription`], which remembers the snapshot version it
//! has seen. Because that version is captured when the subscription is created,
//! a refresh that lands between "subscribe" and "wait" still wakes the waiter.
//! Refreshes that happen while a subscriber is busy are coalesced: the next
//! wait returns the latest snapshot, never an older one.
//!
//! A failed refresh keeps the previous snapshot.

use crate::aggregator::{aggregate, FqdnFilters};
use crate::crd::DNSRecordSet;
use crate::errors::SourceError;
use crate::fqdn::Fqdn;
use crate::metrics;
use crate::source::RecordSetSource;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One immutable aggregation result.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    /// Number of successful refreshes so far; 0 means the cache is still empty
    pub generation: u64,
    /// When this snapshot was committed
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Resources the snapshot was built from, for filtered views
    pub resources: Arc<Vec<DNSRecordSet>>,
    /// Unfiltered, sorted aggregation of `resources`
    pub fqdns: Arc<Vec<Fqdn>>,
}

impl Snapshot {
    /// `true` once at least one refresh has been committed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.generation > 0
    }

    /// Sorted FQDNs matching `filters`.
    ///
    /// Reuses the unfiltered aggregation when no filter is set.
    #[must_use]
    pub fn view(&self, filters: &FqdnFilters) -> Arc<Vec<Fqdn>> {
        if filters.is_empty() {
            Arc::clone(&self.fqdns)
        } else {
            Arc::new(aggregate(&self.resources, filters))
        }
    }
}

/// Owner of the current [`Snapshot`].
#[derive(Clone)]
pub struct SnapshotCache {
    tx: Arc<watch::Sender<Arc<Snapshot>>>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(Arc::new(Snapshot::default()))),
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.tx.borrow())
    }

    /// `true` once the first refresh has been committed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.tx.borrow().is_ready()
    }

    /// Start watching for refreshes committed from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Aggregate `resources` and publish them as the next snapshot.
    ///
    /// Returns the generation of the committed snapshot.
    pub fn commit(&self, resources: Vec<DNSRecordSet>) -> u64 {
        let fqdns = Arc::new(aggregate(&resources, &FqdnFilters::default()));
        let resources = Arc::new(resources);
        let refreshed_at = Some(Utc::now());

        let mut generation = 0;
        self.tx.send_modify(|current| {
            generation = current.generation + 1;
            *current = Arc::new(Snapshot {
                generation,
                refreshed_at,
                resources,
                fqdns,
            });
        });
        generation
    }

    /// Scan `source` once and commit the result.
    ///
    /// # Errors
    ///
    /// Returns the source error; the previous snapshot is left in place.
    pub async fn refresh(&self, source: &dyn RecordSetSource) -> Result<u64, SourceError> {
        let started = Instant::now();

        let resources = match source.list_all().await {
            Ok(resources) => resources,
            Err(e) => {
                metrics::record_refresh_error(started.elapsed());
                return Err(e);
            }
        };

        let resource_count = resources.len();
        let generation = self.commit(resources);
        let records = self.snapshot().fqdns.len();
        metrics::record_refresh_success(started.elapsed(), records, generation);

        if generation == 1 {
            info!(records, resources = resource_count, "Snapshot cache is ready");
        }
        debug!(
            generation,
            records,
            resources = resource_count,
            duration_ms = started.elapsed().as_millis(),
            "Snapshot refreshed"
        );

        Ok(generation)
    }

    /// Refresh immediately, then every `interval`, until `cancel` fires.
    ///
    /// Scans never overlap. Cancellation also interrupts a scan in flight,
    /// in which case nothing is committed.
    pub async fn run(
        &self,
        source: Arc<dyn RecordSetSource>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = interval.as_secs(), "Starting snapshot refresh loop");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.refresh(source.as_ref()) => {
                    if let Err(e) = result {
                        warn!(error = %e, "Snapshot refresh failed, keeping previous snapshot");
                    }
                }
            }
        }

        info!("Snapshot refresh loop stopped");
    }
}

/// A subscriber's view of the cache.
pub struct Subscription {
    rx: watch::Receiver<Arc<Snapshot>>,
}

impl Subscription {
    /// Wait until the cache is ready and return the snapshot that made it so,
    /// or the current one if it already is.
    ///
    /// Returns `None` if the cache was dropped first.
    pub async fn wait_ready(&mut self) -> Option<Arc<Snapshot>> {
        let snapshot = self.rx.wait_for(|snapshot| snapshot.is_ready()).await.ok()?;
        Some(Arc::clone(&snapshot))
    }

    /// Wait for the next refresh after the last snapshot this subscription
    /// returned, and return the latest snapshot.
    ///
    /// Returns `None` if the cache was dropped first.
    pub async fn next(&mut self) -> Option<Arc<Snapshot>> {
        self.rx.changed().await.ok()?;
        Some(Arc::clone(&self.rx.borrow_and_update()))
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod cache_tests;

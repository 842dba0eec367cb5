// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Backing store for `DNSRecordSet` resources.
//!
//! The portal only ever needs two reads from the store: everything, and
//! everything matching a namespace and/or portal selector. [`RecordSetSource`]
//! captures exactly that, and [`KubeRecordSetSource`] implements it against the
//! Kubernetes API.

use crate::crd::DNSRecordSet;
use crate::errors::SourceError;
use crate::pagination::list_all_paginated;
use async_trait::async_trait;
use kube::{api::ListParams, Api, Client, ResourceExt};
use tracing::debug;

/// Server-side narrowing of a list call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordSetSelector {
    /// Only resources in this namespace
    pub namespace: Option<String>,
    /// Only resources belonging to this portal
    pub portal: Option<String>,
}

impl RecordSetSelector {
    /// `true` if `record_set` satisfies every populated field.
    #[must_use]
    pub fn matches(&self, record_set: &DNSRecordSet) -> bool {
        let namespace_ok = self
            .namespace
            .as_deref()
            .is_none_or(|ns| record_set.namespace().as_deref() == Some(ns));
        let portal_ok = self
            .portal
            .as_deref()
            .is_none_or(|portal| record_set.portal() == portal);
        namespace_ok && portal_ok
    }
}

/// Read access to the `DNSRecordSet` resources the portal aggregates.
///
/// Both calls must succeed with an empty list when no resources exist yet.
#[async_trait]
pub trait RecordSetSource: Send + Sync {
    /// List every resource visible to the portal.
    async fn list_all(&self) -> Result<Vec<DNSRecordSet>, SourceError>;

    /// List the resources matching `selector`.
    async fn list_matching(
        &self,
        selector: &RecordSetSelector,
    ) -> Result<Vec<DNSRecordSet>, SourceError>;
}

/// [`RecordSetSource`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeRecordSetSource {
    client: Client,
    watch_namespace: Option<String>,
}

impl KubeRecordSetSource {
    /// Create a source listing across all namespaces, or only `watch_namespace` when given.
    #[must_use]
    pub fn new(client: Client, watch_namespace: Option<String>) -> Self {
        Self {
            client,
            watch_namespace,
        }
    }

    fn api(&self, namespace: Option<&str>) -> Api<DNSRecordSet> {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

#[async_trait]
impl RecordSetSource for KubeRecordSetSource {
    async fn list_all(&self) -> Result<Vec<DNSRecordSet>, SourceError> {
        let api = self.api(self.watch_namespace.as_deref());
        Ok(list_all_paginated(&api, ListParams::default()).await?)
    }

    async fn list_matching(
        &self,
        selector: &RecordSetSelector,
    ) -> Result<Vec<DNSRecordSet>, SourceError> {
        let namespace = match (self.watch_namespace.as_deref(), selector.namespace.as_deref()) {
            (Some(watched), Some(requested)) if watched != requested => {
                debug!(
                    watched_namespace = watched,
                    requested_namespace = requested,
                    "Requested namespace is outside the watched namespace"
                );
                return Ok(Vec::new());
            }
            (Some(watched), _) => Some(watched),
            (None, requested) => requested,
        };

        let api = self.api(namespace);
        let mut record_sets = list_all_paginated(&api, ListParams::default()).await?;
        record_sets.retain(|rs| selector.matches(rs));

        debug!(
            namespace = ?namespace,
            portal = ?selector.portal,
            count = record_sets.len(),
            "Listed matching DNSRecordSets"
        );

        Ok(record_sets)
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod source_tests;

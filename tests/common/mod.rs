// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dnsportal::crd::{DNSRecordSet, DNSRecordSetSpec, DNSRecordSetStatus, FQDNGroupStatus, FQDNStatus};
use dnsportal::errors::{ResolveError, SourceError};
use dnsportal::resolver::NameResolver;
use dnsportal::source::{RecordSetSelector, RecordSetSource};
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, DeleteParams, PostParams};
use kube::client::Client;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

// ============================================================================
// In-memory collaborators
// ============================================================================

/// Backing store held in memory; can be switched into a failing state.
#[derive(Default)]
pub struct MemorySource {
    resources: Mutex<Vec<DNSRecordSet>>,
    failing: AtomicBool,
}

impl MemorySource {
    pub fn set(&self, resources: Vec<DNSRecordSet>) {
        *self.resources.lock().unwrap() = resources;
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordSetSource for MemorySource {
    async fn list_all(&self) -> Result<Vec<DNSRecordSet>, SourceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("connection refused".to_string()));
        }
        Ok(self.resources.lock().unwrap().clone())
    }

    async fn list_matching(
        &self,
        selector: &RecordSetSelector,
    ) -> Result<Vec<DNSRecordSet>, SourceError> {
        let mut resources = self.list_all().await?;
        resources.retain(|rs| selector.matches(rs));
        Ok(resources)
    }
}

/// Resolver answering from fixed tables; unknown names are NXDOMAIN.
#[derive(Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Vec<String>>,
    cnames: HashMap<String, String>,
}

impl StaticResolver {
    pub fn host(mut self, name: &str, addresses: &[&str]) -> Self {
        self.hosts.insert(
            name.to_string(),
            addresses.iter().map(|a| (*a).to_string()).collect(),
        );
        self
    }

    pub fn cname(mut self, name: &str, canonical: &str) -> Self {
        self.cnames.insert(name.to_string(), canonical.to_string());
        self
    }
}

#[async_trait]
impl NameResolver for StaticResolver {
    async fn lookup_host(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        self.hosts.get(name).cloned().ok_or_else(|| nxdomain(name))
    }

    async fn lookup_cname(&self, name: &str) -> Result<String, ResolveError> {
        self.cnames.get(name).cloned().ok_or_else(|| nxdomain(name))
    }
}

fn nxdomain(name: &str) -> ResolveError {
    ResolveError::ErrorResponse {
        name: name.to_string(),
        server: "static".to_string(),
        response_code: "Non-Existent Domain".to_string(),
    }
}

// ============================================================================
// Resource builders
// ============================================================================

/// An `A` record status entry.
pub fn a_record(fqdn: &str, targets: &[&str]) -> FQDNStatus {
    FQDNStatus {
        fqdn: fqdn.to_string(),
        record_type: "A".to_string(),
        targets: targets.iter().map(|t| (*t).to_string()).collect(),
        last_seen: Some("2025-01-01T00:00:00Z".to_string()),
        ..Default::default()
    }
}

/// A `DNSRecordSet` with the given groups in its status.
pub fn record_set(
    namespace: &str,
    name: &str,
    portal_ref: Option<&str>,
    groups: Vec<(&str, Vec<FQDNStatus>)>,
) -> DNSRecordSet {
    let mut rs = DNSRecordSet::new(
        name,
        DNSRecordSetSpec {
            portal_ref: portal_ref.map(str::to_string),
        },
    );
    rs.metadata.namespace = Some(namespace.to_string());
    rs.status = Some(DNSRecordSetStatus {
        groups: groups
            .into_iter()
            .map(|(group, fqdns)| FQDNGroupStatus {
                name: group.to_string(),
                fqdns,
            })
            .collect(),
        ..Default::default()
    });
    rs
}

// ============================================================================
// Cluster helpers
// ============================================================================

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

/// Create a test namespace
pub async fn create_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    let mut labels = BTreeMap::new();
    labels.insert("test".to_string(), "integration".to_string());
    labels.insert("managed-by".to_string(), "dnsportal-test".to_string());

    let namespace = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &namespace).await {
        Ok(_) => {
            println!("Created test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test namespace already exists: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Cleanup test namespace
pub async fn cleanup_test_namespace(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            println!("Deleted test namespace: {name}");
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            println!("Test namespace already deleted: {name}");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pagination helpers for Kubernetes API list operations.
//!
//! A full scan of every `DNSRecordSet` in the cluster runs on each refresh, so
//! lists are fetched in pages of [`KUBE_LIST_PAGE_SIZE`] to keep individual
//! responses small.

use crate::constants::KUBE_LIST_PAGE_SIZE;
use kube::{api::ListParams, Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

/// List all resources with automatic pagination.
///
/// # Arguments
///
/// * `api` - Kubernetes API client for the resource type
/// * `list_params` - Base list parameters (labels, fields, etc.)
///
/// # Example
///
/// ```no_run
/// use kube::{Api, Client, api::ListParams};
/// use dnsportal::crd::DNSRecordSet;
/// use dnsportal::pagination::list_all_paginated;
///
/// # async fn example() -> Result<(), kube::Error> {
/// let client = Client::try_default().await?;
/// let api: Api<DNSRecordSet> = Api::namespaced(client, "default");
///
/// let record_sets = list_all_paginated(&api, ListParams::default()).await?;
/// println!("Found {} record sets", record_sets.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if any page request fails. Pages fetched before the
/// failure are discarded.
pub async fn list_all_paginated<K>(
    api: &Api<K>,
    mut list_params: ListParams,
) -> Result<Vec<K>, kube::Error>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    list_params.limit = Some(KUBE_LIST_PAGE_SIZE);

    let mut all_items = Vec::new();
    let mut page_count = 0;

    loop {
        page_count += 1;
        let result = api.list(&list_params).await?;

        let item_count = result.items.len();
        all_items.extend(result.items);

        debug!(
            page = page_count,
            items_in_page = item_count,
            total_items = all_items.len(),
            "Fetched page from Kubernetes API"
        );

        match next_continue_token(result.metadata.continue_) {
            Some(token) => list_params.continue_token = Some(token),
            None => break,
        }
    }

    debug!(
        total_pages = page_count,
        total_items = all_items.len(),
        "Completed paginated list operation"
    );

    Ok(all_items)
}

/// The API server signals the last page with a missing or empty token.
pub(crate) fn next_continue_token(token: Option<String>) -> Option<String> {
    token.filter(|token| !token.is_empty())
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod pagination_tests;

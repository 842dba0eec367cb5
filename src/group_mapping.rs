// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Group assignment rules for origin objects.
//!
//! A [`GroupMappingStrategy`] decides which display group(s) an origin object
//! belongs to, from its labels and namespace. Rules are evaluated in priority
//! order and the first rule that yields a group wins:
//!
//! 1. [`GROUPS_ANNOTATION`] label, split on commas (may yield several groups)
//! 2. the configured `label_key`
//! 3. the configured namespace → group mapping
//! 4. the configured default group
//! 5. the literal [`FALLBACK_GROUP`]
//!
//! The result is never empty.
//!
//! # Example
//!
//! ```rust
//! use dnsportal::group_mapping::GroupMappingStrategy;
//! use std::collections::BTreeMap;
//!
//! let strategy = GroupMappingStrategy {
//!     default_group: "Platform".to_string(),
//!     label_key: Some("team".to_string()),
//!     by_namespace: BTreeMap::from([("payments".to_string(), "Payments".to_string())]),
//! };
//!
//! let labels = BTreeMap::from([("team".to_string(), "Search".to_string())]);
//! assert_eq!(strategy.resolve(Some(&labels), "payments"), vec!["Search"]);
//! assert_eq!(strategy.resolve(None, "payments"), vec!["Payments"]);
//! assert_eq!(strategy.resolve(None, "other"), vec!["Platform"]);
//! ```

use crate::constants::FALLBACK_GROUP;
use crate::labels::GROUPS_ANNOTATION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration value mapping origin objects to groups.
///
/// Holds no mutable state, so one instance can be shared by every caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMappingStrategy {
    /// Group used when no label or namespace rule matches
    #[serde(default)]
    pub default_group: String,

    /// Label whose value names the group
    #[serde(default)]
    pub label_key: Option<String>,

    /// Namespace → group mapping
    #[serde(default)]
    pub by_namespace: BTreeMap<String, String>,
}

impl GroupMappingStrategy {
    /// Resolve the groups for an object with the given labels and namespace.
    ///
    /// Absent labels are treated as an empty map.
    #[must_use]
    pub fn resolve(&self, labels: Option<&BTreeMap<String, String>>, namespace: &str) -> Vec<String> {
        let empty = BTreeMap::new();
        let labels = labels.unwrap_or(&empty);

        if let Some(raw) = labels.get(GROUPS_ANNOTATION) {
            let groups: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|group| !group.is_empty())
                .map(str::to_string)
                .collect();
            if !groups.is_empty() {
                return groups;
            }
        }

        if let Some(value) = self
            .label_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .and_then(|key| labels.get(key))
            .filter(|value| !value.is_empty())
        {
            return vec![value.clone()];
        }

        if !namespace.is_empty() {
            if let Some(group) = self.by_namespace.get(namespace).filter(|g| !g.is_empty()) {
                return vec![group.clone()];
            }
        }

        if !self.default_group.is_empty() {
            return vec![self.default_group.clone()];
        }

        vec![FALLBACK_GROUP.to_string()]
    }
}

#[cfg(test)]
#[path = "group_mapping_tests.rs"]
mod group_mapping_tests;

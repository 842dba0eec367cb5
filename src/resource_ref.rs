// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Identity of the Kubernetes object that produced an FQDN.
//!
//! Producers record the origin object as a single `kind/namespace/name` string
//! in `FQDNStatus.resourceRef`. [`ResourceRef::parse`] turns that string into an
//! immutable value type with structural equality. Serde uses the same string
//! form, and deserializing goes through [`ResourceRef::parse`].
//!
//! # Example
//!
//! ```rust
//! use dnsportal::resource_ref::ResourceRef;
//!
//! let origin = ResourceRef::parse("Ingress/shop/storefront").unwrap();
//! assert_eq!(origin.kind(), "Ingress");
//! assert_eq!(origin.namespace(), "shop");
//! assert_eq!(origin.name(), "storefront");
//! assert_eq!(origin.to_string(), "Ingress/shop/storefront");
//! ```

use crate::errors::ResourceRefError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference to an originating Kubernetes object.
///
/// The [`Default`] value (all segments empty) represents "no reference".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceRef {
    kind: String,
    namespace: String,
    name: String,
}

impl ResourceRef {
    /// Parse a `kind/namespace/name` string.
    ///
    /// Each segment is trimmed of surrounding whitespace; case is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceRefError::InvalidResourceRef`] unless the string has
    /// exactly three `/`-separated segments that are all non-empty after trimming.
    pub fn parse(raw: &str) -> Result<Self, ResourceRefError> {
        let invalid = || ResourceRefError::InvalidResourceRef {
            raw: raw.to_string(),
        };

        let mut parts = raw.split('/').map(str::trim);
        let (Some(kind), Some(namespace), Some(name), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if kind.is_empty() || namespace.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Object kind (e.g. `Ingress`)
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Object namespace
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Object name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` for the zero value, which stands for "no reference".
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.kind.is_empty() && self.namespace.is_empty() && self.name.is_empty()
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

impl FromStr for ResourceRef {
    type Err = ResourceRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceRef {
    type Error = ResourceRefError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<ResourceRef> for String {
    fn from(reference: ResourceRef) -> Self {
        reference.to_string()
    }
}

#[cfg(test)]
#[path = "resource_ref_tests.rs"]
mod resource_ref_tests;

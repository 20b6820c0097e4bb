// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor documents.
//!
//! User-defined Normative Types can be declared in YAML (or JSON) and loaded
//! into a [`DescriptorRegistry`].
//!
//! # Example YAML
//!
//! ```yaml
//! # acme_types.yaml
//! types:
//!   - type_id: "acme/NTPoint:1.0"
//!     fields:
//!       - name: x
//!         constraint: { kind: scalar, scalar_type: double }
//!       - name: y
//!         constraint: { kind: scalar, scalar_type: double }
//!       - name: alarm
//!         constraint: { kind: shape, shape: alarm }
//!         optional: true
//!
//!   - type_id: "acme/NTCloud:1.0"
//!     fields:
//!       - name: points
//!         constraint: { kind: nested_array, type_id: "acme/NTPoint:1.0" }
//! ```
//!
//! Types are registered in document order, so a type may nest any type
//! declared before it.

use crate::descriptor::SchemaDescriptor;
use crate::registry::{DescriptorRegistry, RegistryError};
use crate::type_id::{TypeId, TypeIdError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Descriptor loading errors.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid type id in document: {0}")]
    TypeId(#[from] TypeIdError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Root document structure.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DescriptorDocument {
    #[serde(default)]
    pub types: Vec<SchemaDescriptor>,
}

impl DescriptorDocument {
    /// Reject type ids a strict parse would have to guess at.
    pub fn validate(&self) -> Result<(), LoadError> {
        for descriptor in &self.types {
            TypeId::parse_strict(&descriptor.type_id)?;
        }
        Ok(())
    }
}

/// Descriptor document loader.
pub struct DescriptorLoader;

impl DescriptorLoader {
    /// Load a document from a file; `.json` files are read as JSON, anything
    /// else as YAML.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<DescriptorDocument, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::parse_json(&content)
        } else {
            Self::parse_yaml(&content)
        }
    }

    pub fn parse_yaml(content: &str) -> Result<DescriptorDocument, LoadError> {
        let document: DescriptorDocument = serde_yaml::from_str(content)?;
        document.validate()?;
        Ok(document)
    }

    pub fn parse_json(content: &str) -> Result<DescriptorDocument, LoadError> {
        let document: DescriptorDocument = serde_json::from_str(content)?;
        document.validate()?;
        Ok(document)
    }

    /// Register every type of a document, in order.
    ///
    /// Stops at the first rejected type; types registered before it stay.
    pub fn register_all(
        registry: &DescriptorRegistry,
        document: DescriptorDocument,
    ) -> Result<Vec<Arc<SchemaDescriptor>>, LoadError> {
        let mut registered = Vec::with_capacity(document.types.len());
        for descriptor in document.types {
            registered.push(registry.register(descriptor)?);
        }
        log::info!("[loader] registered {} type(s)", registered.len());
        Ok(registered)
    }

    /// Load a file and register its types.
    pub fn load_into<P: AsRef<Path>>(
        registry: &DescriptorRegistry,
        path: P,
    ) -> Result<Vec<Arc<SchemaDescriptor>>, LoadError> {
        let document = Self::load_from_file(path)?;
        Self::register_all(registry, document)
    }
}

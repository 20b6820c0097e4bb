// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry of Normative Type descriptors.
//!
//! The process-wide [`DescriptorRegistry::builtin`] table holds the builtin
//! types and is read-only. User-defined types go into a registry of their
//! own, usually seeded with the builtins via [`DescriptorRegistry::with_builtins`].

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use thiserror::Error;

use crate::builder::SchemaBuilder;
use crate::conformance::ConformanceChecker;
use crate::descriptor::{BuiltinType, SchemaDescriptor};
use crate::pvdata::PvField;
use crate::type_id::{TypeId, TypeIdError};

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Errors produced by the descriptor registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("type id is empty")]
    EmptyTypeId,
    #[error("invalid type id: {0}")]
    InvalidTypeId(#[from] TypeIdError),
    #[error("type already registered: {0}")]
    DuplicateType(String),
    #[error("{type_id}: field '{field}' declared more than once")]
    DuplicateField { type_id: String, field: String },
    #[error("{type_id}: nested type {nested} is not registered")]
    UnknownNestedType { type_id: String, nested: String },
    #[error("type not found: {0}")]
    NotFound(String),
    #[error("the builtin registry is read-only")]
    ReadOnly,
}

// ---------------------------------------------------------------------------
// DescriptorRegistry
// ---------------------------------------------------------------------------

/// Descriptors keyed by type id. Lookups ignore the minor version.
pub struct DescriptorRegistry {
    descriptors: RwLock<HashMap<String, Arc<SchemaDescriptor>>>,
    read_only: bool,
}

impl DescriptorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        DescriptorRegistry {
            descriptors: RwLock::new(HashMap::new()),
            read_only: false,
        }
    }

    /// Create a registry holding every builtin Normative Type.
    pub fn with_builtins() -> Self {
        let descriptors = BuiltinType::ALL
            .iter()
            .map(|t| (t.type_id().to_string(), t.descriptor().clone()))
            .collect();
        DescriptorRegistry {
            descriptors: RwLock::new(descriptors),
            read_only: false,
        }
    }

    /// Shared, read-only registry of the builtin Normative Types.
    pub fn builtin() -> &'static DescriptorRegistry {
        static BUILTIN: OnceLock<DescriptorRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| DescriptorRegistry {
            read_only: true,
            ..Self::with_builtins()
        })
    }

    /// Register a user-defined Normative Type.
    ///
    /// Rejects empty or ambiguous ids, ids naming an existing entry at the
    /// same major version, duplicate field names and references to
    /// unregistered nested types.
    pub fn register(
        &self,
        descriptor: SchemaDescriptor,
    ) -> Result<Arc<SchemaDescriptor>, RegistryError> {
        if self.read_only {
            return Err(RegistryError::ReadOnly);
        }
        let id = match TypeId::parse_strict(&descriptor.type_id) {
            Err(TypeIdError::Empty) => return Err(RegistryError::EmptyTypeId),
            Err(e) => return Err(e.into()),
            Ok(id) => id,
        };
        if let Some(field) = descriptor.duplicate_field() {
            return Err(RegistryError::DuplicateField {
                type_id: descriptor.type_id.clone(),
                field: field.to_string(),
            });
        }

        let mut descriptors = self.descriptors.write();
        if descriptors
            .keys()
            .any(|existing| TypeId::parse(existing).is_same_major(&id))
        {
            return Err(RegistryError::DuplicateType(descriptor.type_id));
        }
        for nested in descriptor.nested_type_ids() {
            if Self::lookup(&descriptors, nested).is_none() {
                return Err(RegistryError::UnknownNestedType {
                    type_id: descriptor.type_id.clone(),
                    nested: nested.to_string(),
                });
            }
        }

        let descriptor = Arc::new(descriptor);
        descriptors.insert(descriptor.type_id.clone(), descriptor.clone());
        log::info!(
            "[registry] registered {} ({} fields)",
            descriptor.type_id,
            descriptor.fields.len()
        );
        Ok(descriptor)
    }

    /// Look up a descriptor; the minor version is ignored.
    pub fn get(&self, type_id: &str) -> Option<Arc<SchemaDescriptor>> {
        Self::lookup(&self.descriptors.read(), type_id)
    }

    fn lookup(
        descriptors: &HashMap<String, Arc<SchemaDescriptor>>,
        type_id: &str,
    ) -> Option<Arc<SchemaDescriptor>> {
        descriptors.get(type_id).cloned().or_else(|| {
            let wanted = TypeId::parse(type_id);
            descriptors
                .iter()
                .find(|(key, _)| TypeId::parse(key).is_same_major(&wanted))
                .map(|(_, d)| d.clone())
        })
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.get(type_id).is_some()
    }

    /// List all registered type ids (sorted for determinism).
    pub fn list_types(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.descriptors.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Total number of registered types.
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Descriptor whose id matches the tree's type tag and which the tree
    /// structurally satisfies.
    pub fn classify(&self, tree: &PvField) -> Option<Arc<SchemaDescriptor>> {
        let descriptor = self.get(&tree.type_tag())?;
        ConformanceChecker::new(self)
            .is_structurally_compatible(tree, &descriptor)
            .then_some(descriptor)
    }

    /// Builder for a registered type.
    pub fn create_builder(&self, type_id: &str) -> Result<SchemaBuilder<'_>, RegistryError> {
        let descriptor = self
            .get(type_id)
            .ok_or_else(|| RegistryError::NotFound(type_id.to_string()))?;
        Ok(SchemaBuilder::new(self, descriptor))
    }
}

impl Default for DescriptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldConstraint;
    use crate::pvdata::ScalarType;
    use crate::shapes::Shape;

    fn point(type_id: &str) -> SchemaDescriptor {
        SchemaDescriptor::new(type_id)
            .required(
                "x",
                FieldConstraint::Scalar {
                    scalar_type: ScalarType::Double,
                },
            )
            .optional("alarm", FieldConstraint::Shape { shape: Shape::Alarm })
    }

    #[test]
    fn builtin_registry_holds_all_types() {
        let reg = DescriptorRegistry::builtin();
        assert_eq!(reg.len(), BuiltinType::ALL.len());
        assert!(reg.is_read_only());
        assert!(reg.contains("epics:nt/NTTable:1.0"));
    }

    #[test]
    fn builtin_registry_is_read_only() {
        let err = DescriptorRegistry::builtin()
            .register(point("acme/Point:1.0"))
            .unwrap_err();
        assert_eq!(err, RegistryError::ReadOnly);
    }

    #[test]
    fn register_and_get() {
        let reg = DescriptorRegistry::new();
        reg.register(point("acme/Point:1.0")).unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("acme/Point:1.0").unwrap().fields.len(), 2);
    }

    #[test]
    fn lookup_ignores_minor_version() {
        let reg = DescriptorRegistry::new();
        reg.register(point("acme/Point:1.0")).unwrap();
        assert!(reg.get("acme/Point:1.4").is_some());
        assert!(reg.get("acme/Point:2.0").is_none());
    }

    #[test]
    fn compatible_duplicate_rejected() {
        let reg = DescriptorRegistry::new();
        reg.register(point("acme/Point:1.0")).unwrap();
        let err = reg.register(point("acme/Point:1.1")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateType("acme/Point:1.1".into()));
        reg.register(point("acme/Point:2.0")).unwrap();
    }

    #[test]
    fn unversioned_ids_only_match_exactly() {
        let reg = DescriptorRegistry::new();
        reg.register(point("org.acme/Point")).unwrap();

        assert!(reg.get("org.acme/Point").is_some());
        assert!(reg.get("org.other/Sensor").is_none());
        assert!(reg.get("org.acme/Point:1.0").is_none());
        assert!(matches!(
            reg.create_builder("org.other/Sensor"),
            Err(RegistryError::NotFound(_))
        ));

        reg.register(point("org.acme/Line")).unwrap();
        reg.register(point("org.acme/Point:1.0")).unwrap();
        assert_eq!(reg.len(), 3);
        assert_eq!(
            reg.register(point("org.acme/Point")).unwrap_err(),
            RegistryError::DuplicateType("org.acme/Point".into())
        );
        assert_eq!(
            reg.get("org.acme/Point:1.3").unwrap().type_id,
            "org.acme/Point:1.0"
        );
    }

    #[test]
    fn empty_and_ambiguous_ids_rejected() {
        let reg = DescriptorRegistry::new();
        assert_eq!(reg.register(point("")).unwrap_err(), RegistryError::EmptyTypeId);
        assert!(matches!(
            reg.register(point("acme/Point:1")).unwrap_err(),
            RegistryError::InvalidTypeId(_)
        ));
    }

    #[test]
    fn duplicate_field_rejected() {
        let reg = DescriptorRegistry::new();
        let d = point("acme/Point:1.0").required("x", FieldConstraint::AnyScalar);
        assert!(matches!(
            reg.register(d).unwrap_err(),
            RegistryError::DuplicateField { .. }
        ));
    }

    #[test]
    fn nested_types_must_exist() {
        let reg = DescriptorRegistry::new();
        let cloud = SchemaDescriptor::new("acme/Cloud:1.0").required(
            "points",
            FieldConstraint::NestedArray {
                type_id: "acme/Point:1.0".into(),
            },
        );
        assert!(matches!(
            reg.register(cloud.clone()).unwrap_err(),
            RegistryError::UnknownNestedType { .. }
        ));

        reg.register(point("acme/Point:1.0")).unwrap();
        reg.register(cloud).unwrap();
        assert_eq!(reg.list_types(), vec!["acme/Cloud:1.0", "acme/Point:1.0"]);
    }

    #[test]
    fn classify_requires_tag_and_structure() {
        let reg = DescriptorRegistry::with_builtins();
        reg.register(point("acme/Point:1.0")).unwrap();

        let tree = reg
            .create_builder("acme/Point:1.0")
            .unwrap()
            .add_alarm()
            .create_instance()
            .unwrap();
        assert_eq!(reg.classify(&tree).unwrap().type_id, "acme/Point:1.0");

        let scalar = reg
            .create_builder("epics:nt/NTScalar:1.0")
            .unwrap()
            .value(ScalarType::Int)
            .create_instance()
            .unwrap();
        assert_eq!(
            reg.classify(&scalar).unwrap().type_id,
            "epics:nt/NTScalar:1.0"
        );
    }

    #[test]
    fn missing_type_builder() {
        let reg = DescriptorRegistry::new();
        assert!(matches!(
            reg.create_builder("acme/Nope:1.0"),
            Err(RegistryError::NotFound(_))
        ));
    }
}

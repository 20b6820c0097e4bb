// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema builder.
//!
//! A [`SchemaBuilder`] accumulates a configuration for one Normative Type
//! (element type, optional fields, extra fields) and emits a conforming
//! structure, a zero-valued instance of it, or a view over that instance.
//!
//! Emission order is fixed: required and requested optional fields in the
//! type's declaration order, then extra fields in the order they were added.
//!
//! Every build consumes the configuration. The builder is back in its fresh
//! state afterwards (even when the build fails), so two consecutive builds
//! without reconfiguring yield the minimal schema twice.
//!
//! # Example
//!
//! ```rust
//! use ntypes::builder::SchemaBuilder;
//! use ntypes::pvdata::ScalarType;
//!
//! let mut builder = SchemaBuilder::builtin("epics:nt/NTScalar:1.0").unwrap();
//! let structure = builder
//!     .value(ScalarType::Double)
//!     .add_alarm()
//!     .add_time_stamp()
//!     .create_structure()
//!     .unwrap();
//!
//! let names: Vec<&str> = structure.field_names().collect();
//! assert_eq!(names, ["value", "alarm", "timeStamp"]);
//! ```

use crate::descriptor::{FieldConstraint, SchemaDescriptor, ValidityRule, DESCRIPTOR_FIELD};
use crate::pvdata::{Field, Member, PvField, ScalarType, Structure, Union};
use crate::registry::{DescriptorRegistry, RegistryError};
use crate::shapes::ND_ARRAY_VALUE;
use crate::view::DynamicView;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported when a configuration cannot produce a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("{type_id}: value type must be set before building")]
    MissingValueType { type_id: String },
    #[error("{type_id}: value type {scalar_type} is not allowed")]
    DisallowedValueType {
        type_id: String,
        scalar_type: ScalarType,
    },
    #[error("{type_id}: no optional field named '{field}'")]
    UnknownOptional { type_id: String, field: String },
    #[error("extra field '{0}' clashes with a schema field")]
    DuplicateField(String),
    #[error("query field '{field}' must be string, double or int, not {scalar_type}")]
    InvalidQueryType {
        field: String,
        scalar_type: ScalarType,
    },
    #[error("{type_id}: {setting} does not apply to this type")]
    NotConfigurable {
        type_id: String,
        setting: &'static str,
    },
    #[error("nested type {0} is not registered")]
    UnknownNestedType(String),
}

/// Accumulated configuration, consumed by each build.
#[derive(Debug, Clone, Default)]
struct Config {
    value_type: Option<ScalarType>,
    value_union: Option<Arc<Union>>,
    columns: Vec<(String, ScalarType)>,
    query: Vec<(String, ScalarType)>,
    optional: Vec<String>,
    extras: Vec<Member>,
}

/// Builder for one Normative Type.
pub struct SchemaBuilder<'r> {
    registry: &'r DescriptorRegistry,
    descriptor: Arc<SchemaDescriptor>,
    config: Config,
}

impl SchemaBuilder<'static> {
    /// Builder for a builtin type.
    pub fn builtin(type_id: &str) -> Result<Self, RegistryError> {
        DescriptorRegistry::builtin().create_builder(type_id)
    }
}

impl<'r> SchemaBuilder<'r> {
    pub fn new(registry: &'r DescriptorRegistry, descriptor: Arc<SchemaDescriptor>) -> Self {
        Self {
            registry,
            descriptor,
            config: Config::default(),
        }
    }

    pub fn descriptor(&self) -> &Arc<SchemaDescriptor> {
        &self.descriptor
    }

    /// Element type of the value field(s) that accept any scalar type.
    pub fn value(&mut self, scalar_type: ScalarType) -> &mut Self {
        self.config.value_type = Some(scalar_type);
        self
    }

    /// Union used by union-valued types; a variant union by default.
    pub fn value_union(&mut self, union: Arc<Union>) -> &mut Self {
        self.config.value_union = Some(union);
        self
    }

    /// Append a table column. Re-adding a column replaces its type in place.
    pub fn add_column(&mut self, name: impl Into<String>, scalar_type: ScalarType) -> &mut Self {
        upsert(&mut self.config.columns, name.into(), scalar_type);
        self
    }

    /// Append a query parameter; this also enables the query field.
    pub fn add_query_field(
        &mut self,
        name: impl Into<String>,
        scalar_type: ScalarType,
    ) -> &mut Self {
        upsert(&mut self.config.query, name.into(), scalar_type);
        self
    }

    pub fn add_descriptor(&mut self) -> &mut Self {
        self.add_optional(DESCRIPTOR_FIELD)
    }

    pub fn add_alarm(&mut self) -> &mut Self {
        self.add_optional("alarm")
    }

    pub fn add_time_stamp(&mut self) -> &mut Self {
        self.add_optional("timeStamp")
    }

    pub fn add_display(&mut self) -> &mut Self {
        self.add_optional("display")
    }

    pub fn add_control(&mut self) -> &mut Self {
        self.add_optional("control")
    }

    /// Request an optional field by name. Idempotent.
    pub fn add_optional(&mut self, name: &str) -> &mut Self {
        if !self.config.optional.iter().any(|n| n == name) {
            self.config.optional.push(name.to_string());
        }
        self
    }

    /// Append an extra, user-defined field after the schema fields.
    ///
    /// Adding a name twice keeps only the last definition, moved to the end.
    pub fn add(&mut self, name: impl Into<String>, field: Field) -> &mut Self {
        let name = name.into();
        if let Some(index) = self.config.extras.iter().position(|m| m.name == name) {
            log::warn!(
                "[builder] {}: extra field '{}' redefined, last definition wins",
                self.descriptor.type_id,
                name
            );
            self.config.extras.remove(index);
        }
        self.config.extras.push(Member::new(name, field));
        self
    }

    /// Build the structure and reset to a fresh configuration.
    pub fn create_structure(&mut self) -> Result<Arc<Structure>, ConfigurationError> {
        let config = std::mem::take(&mut self.config);
        self.assemble(&config)
    }

    /// Consuming form of [`Self::create_structure`].
    pub fn into_structure(mut self) -> Result<Arc<Structure>, ConfigurationError> {
        self.create_structure()
    }

    /// Build the structure and instantiate a zero-valued tree of it.
    pub fn create_instance(&mut self) -> Result<PvField, ConfigurationError> {
        let config = std::mem::take(&mut self.config);
        let structure = self.assemble(&config)?;
        let tree = PvField::new_structure(&structure);
        self.initialise(&tree, &config);
        Ok(tree)
    }

    /// Build an instance and view it without re-checking conformance.
    pub fn create_view(&mut self) -> Result<DynamicView<'r>, ConfigurationError> {
        let tree = self.create_instance()?;
        Ok(DynamicView::from_parts(
            self.registry,
            self.descriptor.clone(),
            tree,
        ))
    }

    fn assemble(&self, config: &Config) -> Result<Arc<Structure>, ConfigurationError> {
        let descriptor = &self.descriptor;
        self.validate(config)?;

        let mut members = Vec::with_capacity(descriptor.fields.len() + config.extras.len());
        for decl in &descriptor.fields {
            let requested = config.optional.iter().any(|n| *n == decl.name)
                || (decl.constraint == FieldConstraint::Query && !config.query.is_empty());
            if decl.optional && !requested {
                continue;
            }
            members.push(Member::new(
                decl.name.clone(),
                self.emit(&decl.constraint, config)?,
            ));
        }
        for extra in &config.extras {
            if descriptor.has_field(&extra.name) {
                return Err(ConfigurationError::DuplicateField(extra.name.clone()));
            }
            members.push(extra.clone());
        }

        log::debug!(
            "[builder] built {} with {} fields",
            descriptor.type_id,
            members.len()
        );
        Ok(Arc::new(Structure::new(descriptor.type_id.clone(), members)))
    }

    fn validate(&self, config: &Config) -> Result<(), ConfigurationError> {
        let descriptor = &self.descriptor;
        let type_id = || descriptor.type_id.clone();
        let uses = |pred: fn(&FieldConstraint) -> bool| {
            descriptor.fields.iter().any(|f| pred(&f.constraint))
        };

        if let Some(name) = config.optional.iter().find(|n| !descriptor.has_field(n)) {
            return Err(ConfigurationError::UnknownOptional {
                type_id: type_id(),
                field: name.clone(),
            });
        }
        if config.value_type.is_some() && !uses(FieldConstraint::needs_value_type) {
            return Err(not_configurable(type_id(), "value type"));
        }
        if config.value_union.is_some()
            && !uses(|c| matches!(c, FieldConstraint::AnyUnion | FieldConstraint::AnyUnionArray))
        {
            return Err(not_configurable(type_id(), "value union"));
        }
        if !config.columns.is_empty() && !uses(|c| *c == FieldConstraint::Columns) {
            return Err(not_configurable(type_id(), "columns"));
        }
        if !config.query.is_empty() && !uses(|c| *c == FieldConstraint::Query) {
            return Err(not_configurable(type_id(), "query fields"));
        }
        if let Some((field, scalar_type)) = config.query.iter().find(|(_, t)| {
            !matches!(t, ScalarType::String | ScalarType::Double | ScalarType::Int)
        }) {
            return Err(ConfigurationError::InvalidQueryType {
                field: field.clone(),
                scalar_type: *scalar_type,
            });
        }
        Ok(())
    }

    fn emit(&self, constraint: &FieldConstraint, config: &Config) -> Result<Field, ConfigurationError> {
        let union = || {
            config
                .value_union
                .clone()
                .unwrap_or_else(|| Arc::new(Union::variant()))
        };
        let field = match constraint {
            FieldConstraint::Scalar { scalar_type } => Field::Scalar(*scalar_type),
            FieldConstraint::AnyScalar => Field::Scalar(self.value_type(constraint, config)?),
            FieldConstraint::ScalarArray { scalar_type } => Field::ScalarArray(*scalar_type),
            FieldConstraint::AnyScalarArray | FieldConstraint::ScalarArrayOneOf { .. } => {
                Field::ScalarArray(self.value_type(constraint, config)?)
            }
            FieldConstraint::Shape { shape } => Field::Structure(shape.create()),
            FieldConstraint::ShapeArray { shape } => Field::StructureArray(shape.create()),
            FieldConstraint::VariantUnion => Field::Union(Arc::new(Union::variant())),
            FieldConstraint::AnyUnion => Field::Union(union()),
            FieldConstraint::AnyUnionArray => Field::UnionArray(union()),
            FieldConstraint::ArrayUnion => Field::Union(ND_ARRAY_VALUE.create_union()),
            FieldConstraint::Columns => Field::Structure(scalar_structure(&config.columns, true)),
            FieldConstraint::Query => Field::Structure(scalar_structure(&config.query, false)),
            FieldConstraint::NestedArray { type_id } => {
                let nested = self
                    .registry
                    .get(type_id)
                    .ok_or_else(|| ConfigurationError::UnknownNestedType(type_id.clone()))?;
                let element = SchemaBuilder::new(self.registry, nested).assemble(&Config::default())?;
                Field::StructureArray(element)
            }
        };
        Ok(field)
    }

    fn value_type(
        &self,
        constraint: &FieldConstraint,
        config: &Config,
    ) -> Result<ScalarType, ConfigurationError> {
        let scalar_type = config
            .value_type
            .ok_or_else(|| ConfigurationError::MissingValueType {
                type_id: self.descriptor.type_id.clone(),
            })?;
        if !constraint.allows_value_type(scalar_type) {
            return Err(ConfigurationError::DisallowedValueType {
                type_id: self.descriptor.type_id.clone(),
                scalar_type,
            });
        }
        Ok(scalar_type)
    }

    /// Fill in data the type expects from its configuration.
    fn initialise(&self, tree: &PvField, config: &Config) {
        if !self.descriptor.validity.contains(&ValidityRule::TableShape) {
            return;
        }
        let Some(labels) = tree.get_sub_field("labels") else {
            return;
        };
        let names = config.columns.iter().map(|(name, _)| name.as_str());
        if let Err(e) = labels.put_array(names) {
            log::warn!("[builder] {}: cannot set labels: {}", self.descriptor.type_id, e);
        }
    }
}

fn upsert(list: &mut Vec<(String, ScalarType)>, name: String, scalar_type: ScalarType) {
    match list.iter_mut().find(|(n, _)| *n == name) {
        Some(entry) => entry.1 = scalar_type,
        None => list.push((name, scalar_type)),
    }
}

fn scalar_structure(members: &[(String, ScalarType)], arrays: bool) -> Arc<Structure> {
    let members = members
        .iter()
        .map(|(name, t)| {
            let field = if arrays {
                Field::ScalarArray(*t)
            } else {
                Field::Scalar(*t)
            };
            Member::new(name.clone(), field)
        })
        .collect();
    Arc::new(Structure::new("", members))
}

fn not_configurable(type_id: String, setting: &'static str) -> ConfigurationError {
    ConfigurationError::NotConfigurable { type_id, setting }
}

#[cfg(test)]
mod tests;

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Table-driven Normative Type descriptors.
//!
//! A [`SchemaDescriptor`] is plain data: a type id, an ordered list of field
//! declarations and a list of data-level validity rules. The conformance
//! checker, the schema builder and the views are all driven by it, so a new
//! Normative Type is a new table entry, not new code.
//!
//! Descriptors are serde-friendly and can be declared in YAML:
//!
//! ```yaml
//! type_id: "acme/NTPoint:1.0"
//! fields:
//!   - name: x
//!     constraint: { kind: scalar, scalar_type: double }
//!   - name: alarm
//!     constraint: { kind: shape, shape: alarm }
//!     optional: true
//! ```

mod catalog;

pub use catalog::BuiltinType;

use crate::pvdata::{Field, ScalarType};
use crate::shapes::{Shape, ND_ARRAY_VALUE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace of the builtin Normative Types.
pub const NT_NAMESPACE: &str = "epics:nt";

/// Name of the plain-string description field shared by most types.
pub const DESCRIPTOR_FIELD: &str = "descriptor";

// ---------------------------------------------------------------------------
// FieldConstraint
// ---------------------------------------------------------------------------

/// Structural constraint a field must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldConstraint {
    /// Scalar of exactly this type.
    Scalar { scalar_type: ScalarType },
    /// Scalar of any type; the builder needs a value type.
    AnyScalar,
    /// Scalar array of exactly this element type.
    ScalarArray { scalar_type: ScalarType },
    /// Scalar array of any element type; the builder needs a value type.
    AnyScalarArray,
    /// Scalar array whose element type is one of `types`.
    ScalarArrayOneOf { types: Vec<ScalarType> },
    /// Structure conforming to a shape template.
    Shape { shape: Shape },
    /// Structure array whose element conforms to a shape template.
    ShapeArray { shape: Shape },
    /// Variant (any-type) union.
    VariantUnion,
    /// Any union, variant or restricted.
    AnyUnion,
    /// Array of any union.
    AnyUnionArray,
    /// Restricted union of scalar arrays (NTNDArray value).
    ArrayUnion,
    /// Structure whose members are all scalar arrays (NTTable value).
    Columns,
    /// Structure whose members are string, double or int scalars (NTURI query).
    Query,
    /// Structure array whose element conforms to another Normative Type.
    NestedArray { type_id: String },
}

impl FieldConstraint {
    /// Whether the builder must be told an element type before emitting this field.
    pub fn needs_value_type(&self) -> bool {
        matches!(
            self,
            Self::AnyScalar | Self::AnyScalarArray | Self::ScalarArrayOneOf { .. }
        )
    }

    /// Whether `scalar_type` is an acceptable element type for this field.
    pub fn allows_value_type(&self, scalar_type: ScalarType) -> bool {
        match self {
            Self::AnyScalar | Self::AnyScalarArray => true,
            Self::ScalarArrayOneOf { types } => types.contains(&scalar_type),
            _ => false,
        }
    }

    /// Human-readable description of what is expected, used in reports.
    pub fn expected(&self) -> String {
        match self {
            Self::Scalar { scalar_type } => scalar_type.name().to_string(),
            Self::AnyScalar => "scalar".to_string(),
            Self::ScalarArray { scalar_type } => format!("{}[]", scalar_type),
            Self::AnyScalarArray => "scalar array".to_string(),
            Self::ScalarArrayOneOf { types } => {
                let names: Vec<String> = types.iter().map(|t| format!("{}[]", t)).collect();
                names.join(" | ")
            }
            Self::Shape { shape } => shape.tag().to_string(),
            Self::ShapeArray { shape } => format!("{}[]", shape.tag()),
            Self::VariantUnion => "variant union".to_string(),
            Self::AnyUnion => "union".to_string(),
            Self::AnyUnionArray => "union[]".to_string(),
            Self::ArrayUnion => format!(
                "union of {}",
                ND_ARRAY_VALUE
                    .members
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Columns => "structure of scalar arrays".to_string(),
            Self::Query => "structure of string, double or int".to_string(),
            Self::NestedArray { type_id } => format!("{}[]", type_id),
        }
    }

    /// Kind-level match that does not need to resolve other descriptors.
    ///
    /// Returns `None` for [`FieldConstraint::NestedArray`], which the
    /// conformance checker resolves itself.
    pub fn matches_local(&self, field: &Field) -> Option<bool> {
        let ok = match (self, field) {
            (Self::Scalar { scalar_type }, Field::Scalar(t)) => t == scalar_type,
            (Self::AnyScalar, Field::Scalar(_)) => true,
            (Self::ScalarArray { scalar_type }, Field::ScalarArray(t)) => t == scalar_type,
            (Self::AnyScalarArray, Field::ScalarArray(_)) => true,
            (Self::ScalarArrayOneOf { types }, Field::ScalarArray(t)) => types.contains(t),
            (Self::Shape { shape }, field) => shape.matches(field),
            (Self::ShapeArray { shape }, Field::StructureArray(s)) => {
                shape.template().matches_structure(s)
            }
            (Self::VariantUnion, Field::Union(u)) => u.is_variant(),
            (Self::AnyUnion, Field::Union(_)) => true,
            (Self::AnyUnionArray, Field::UnionArray(_)) => true,
            (Self::ArrayUnion, Field::Union(u)) => ND_ARRAY_VALUE.matches_union(u),
            (Self::Columns, Field::Structure(s)) => s
                .members()
                .iter()
                .all(|m| matches!(m.field, Field::ScalarArray(_))),
            (Self::Query, Field::Structure(s)) => s.members().iter().all(|m| {
                matches!(
                    m.field,
                    Field::Scalar(ScalarType::String | ScalarType::Double | ScalarType::Int)
                )
            }),
            (Self::NestedArray { .. }, _) => return None,
            _ => false,
        };
        Some(ok)
    }
}

// ---------------------------------------------------------------------------
// FieldDecl
// ---------------------------------------------------------------------------

/// One field of a Normative Type, in canonical declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub constraint: FieldConstraint,
    #[serde(default)]
    pub optional: bool,
}

impl FieldDecl {
    pub fn required(name: impl Into<String>, constraint: FieldConstraint) -> Self {
        Self {
            name: name.into(),
            constraint,
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>, constraint: FieldConstraint) -> Self {
        Self {
            name: name.into(),
            constraint,
            optional: true,
        }
    }
}

// ---------------------------------------------------------------------------
// ValidityRule
// ---------------------------------------------------------------------------

/// Data-level consistency rule, checked only on demand by `is_valid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidityRule {
    /// Every listed array that is present has the same length.
    EqualLengths { fields: Vec<String> },
    /// Columns of `value` have equal lengths and `labels` names each column.
    TableShape,
    /// The product of `dim` equals the length of `value`.
    MatrixDims,
    /// `ranges` has one more element than `value`.
    HistogramRanges,
    /// `units` has one more element than `base`, `value` is a multiple of `base`.
    ContinuumUnits,
    /// compressedSize / uncompressedSize agree with the value and dimensions.
    NdArraySizes,
}

// ---------------------------------------------------------------------------
// SchemaDescriptor
// ---------------------------------------------------------------------------

/// Complete description of one Normative Type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub type_id: String,
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub validity: Vec<ValidityRule>,
}

impl SchemaDescriptor {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            fields: Vec::new(),
            validity: Vec::new(),
        }
    }

    pub fn required(mut self, name: &str, constraint: FieldConstraint) -> Self {
        self.fields.push(FieldDecl::required(name, constraint));
        self
    }

    pub fn optional(mut self, name: &str, constraint: FieldConstraint) -> Self {
        self.fields.push(FieldDecl::optional(name, constraint));
        self
    }

    pub fn rule(mut self, rule: ValidityRule) -> Self {
        self.validity.push(rule);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.fields.iter().filter(|f| !f.optional)
    }

    pub fn optional_fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.fields.iter().filter(|f| f.optional)
    }

    /// Type ids of other Normative Types this one nests.
    pub fn nested_type_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|f| match &f.constraint {
            FieldConstraint::NestedArray { type_id } => Some(type_id.as_str()),
            _ => None,
        })
    }

    /// First field name declared more than once, if any.
    pub fn duplicate_field(&self) -> Option<&str> {
        self.fields.iter().enumerate().find_map(|(i, f)| {
            self.fields[..i]
                .iter()
                .any(|g| g.name == f.name)
                .then_some(f.name.as_str())
        })
    }
}

impl fmt::Display for SchemaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.type_id)?;
        for decl in &self.fields {
            writeln!(
                f,
                "  {}{}: {}",
                decl.name,
                if decl.optional { "?" } else { "" },
                decl.constraint.expected()
            )?;
        }
        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Introspection interfaces: the shape of a field tree, independent of its data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Default type tag of a structure built without an explicit id.
pub const DEFAULT_STRUCTURE_ID: &str = "structure";
/// Type tag of a variant (any-type) union.
pub const VARIANT_UNION_ID: &str = "any";
/// Default type tag of a restricted union built without an explicit id.
pub const DEFAULT_UNION_ID: &str = "union";

/// Scalar element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
}

impl ScalarType {
    /// All scalar types, in declaration order.
    pub const ALL: [ScalarType; 8] = [
        Self::Boolean,
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::String,
    ];

    /// Type name as it appears in type tags.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }

    /// Size of one element in bytes (None for strings).
    pub const fn size(self) -> Option<usize> {
        match self {
            Self::Boolean | Self::Byte => Some(1),
            Self::Short => Some(2),
            Self::Int | Self::Float => Some(4),
            Self::Long | Self::Double => Some(8),
            Self::String => None,
        }
    }

    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Boolean | Self::String)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown scalar type: {}", s))
    }
}

/// Introspection interface of one node of a field tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Scalar(ScalarType),
    ScalarArray(ScalarType),
    Structure(Arc<Structure>),
    /// Array whose elements all share the given structure.
    StructureArray(Arc<Structure>),
    Union(Arc<Union>),
    /// Array whose elements all share the given union.
    UnionArray(Arc<Union>),
}

impl Field {
    /// Type tag: the id of structures and unions, the type name of scalars.
    ///
    /// Arrays carry a `[]` suffix, e.g. `double[]` or `alarm_t[]`.
    pub fn type_tag(&self) -> String {
        match self {
            Self::Scalar(t) => t.name().to_string(),
            Self::ScalarArray(t) => format!("{}[]", t.name()),
            Self::Structure(s) => s.id.clone(),
            Self::StructureArray(s) => format!("{}[]", s.id),
            Self::Union(u) => u.id.clone(),
            Self::UnionArray(u) => format!("{}[]", u.id),
        }
    }

    pub fn as_structure(&self) -> Option<&Arc<Structure>> {
        match self {
            Self::Structure(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&Arc<Union>> {
        match self {
            Self::Union(u) => Some(u),
            _ => None,
        }
    }

    /// Scalar type if this is a scalar.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Self::Scalar(t) => Some(*t),
            _ => None,
        }
    }

    /// Element type if this is a scalar array.
    pub fn element_type(&self) -> Option<ScalarType> {
        match self {
            Self::ScalarArray(t) => Some(*t),
            _ => None,
        }
    }

    /// Short kind label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::ScalarArray(_) => "scalarArray",
            Self::Structure(_) => "structure",
            Self::StructureArray(_) => "structureArray",
            Self::Union(_) => "union",
            Self::UnionArray(_) => "unionArray",
        }
    }
}

impl From<Arc<Structure>> for Field {
    fn from(s: Arc<Structure>) -> Self {
        Self::Structure(s)
    }
}

impl From<Arc<Union>> for Field {
    fn from(u: Arc<Union>) -> Self {
        Self::Union(u)
    }
}

/// Named member of a structure or union.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub field: Field,
}

impl Member {
    pub fn new(name: impl Into<String>, field: Field) -> Self {
        Self {
            name: name.into(),
            field,
        }
    }
}

/// Structure: a type tag plus an ordered list of members.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    id: String,
    members: Vec<Member>,
}

impl Structure {
    /// Create a structure. An empty id falls back to [`DEFAULT_STRUCTURE_ID`].
    pub fn new(id: impl Into<String>, members: Vec<Member>) -> Self {
        let id = id.into();
        Self {
            id: if id.is_empty() {
                DEFAULT_STRUCTURE_ID.to_string()
            } else {
                id
            },
            members,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }

    /// Get a direct member by name (first match wins).
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| &m.field)
    }

    /// Get member index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }

    /// Resolve a dotted path through nested structures, e.g. `alarm.severity`.
    pub fn sub_field(&self, path: &str) -> Option<&Field> {
        let mut segments = path.split('.');
        let mut current = self.field(segments.next()?)?;
        for segment in segments {
            current = current.as_structure()?.field(segment)?;
        }
        Some(current)
    }
}

/// Union: either variant (no members, any field may be stored) or restricted
/// to a fixed, ordered list of members.
#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    id: String,
    members: Vec<Member>,
}

impl Union {
    /// Variant union accepting any field.
    pub fn variant() -> Self {
        Self {
            id: VARIANT_UNION_ID.to_string(),
            members: Vec::new(),
        }
    }

    /// Restricted union. An empty id falls back to [`DEFAULT_UNION_ID`].
    pub fn restricted(id: impl Into<String>, members: Vec<Member>) -> Self {
        let id = id.into();
        Self {
            id: if id.is_empty() {
                DEFAULT_UNION_ID.to_string()
            } else {
                id
            },
            members,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_variant(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| &m.field)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == name)
    }
}

/// Fluent builder for structures and restricted unions.
#[derive(Debug, Default)]
pub struct FieldBuilder {
    id: String,
    members: Vec<Member>,
}

impl FieldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the type tag of the structure or union being built.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Add a scalar member.
    pub fn add(mut self, name: impl Into<String>, scalar_type: ScalarType) -> Self {
        self.members
            .push(Member::new(name, Field::Scalar(scalar_type)));
        self
    }

    /// Add a scalar array member.
    pub fn add_array(mut self, name: impl Into<String>, element_type: ScalarType) -> Self {
        self.members
            .push(Member::new(name, Field::ScalarArray(element_type)));
        self
    }

    /// Add a member of arbitrary kind.
    pub fn add_field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.members.push(Member::new(name, field));
        self
    }

    /// Add a nested structure member.
    pub fn add_nested(self, name: impl Into<String>, nested: Arc<Structure>) -> Self {
        self.add_field(name, Field::Structure(nested))
    }

    /// Add a variant union member.
    pub fn add_variant(self, name: impl Into<String>) -> Self {
        self.add_field(name, Field::Union(Arc::new(Union::variant())))
    }

    pub fn create_structure(self) -> Arc<Structure> {
        Arc::new(Structure::new(self.id, self.members))
    }

    pub fn create_union(self) -> Arc<Union> {
        Arc::new(Union::restricted(self.id, self.members))
    }
}

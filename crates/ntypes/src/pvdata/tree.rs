// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data trees: shared handles to typed field nodes.
//!
//! A [`PvField`] is a cheap, clonable handle onto one node of a tree. The
//! layout of a tree is fixed at creation by its introspection [`Field`]; only
//! leaf data, array contents and union selections change afterwards. Every
//! clone of a handle observes the same node, so views and adapters that keep
//! handles always see the current data.

use crate::pvdata::{Field, ScalarType, ScalarValue, Structure};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors for data tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Field not found: {0}")]
    FieldNotFound(String),
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("Invalid operation for {kind}: {operation}")]
    InvalidOperation {
        kind: &'static str,
        operation: &'static str,
    },
}

/// Handle onto a node of a data tree.
#[derive(Clone)]
pub struct PvField {
    node: Arc<Node>,
}

struct Node {
    field: Field,
    content: Content,
}

enum Content {
    Scalar(RwLock<ScalarValue>),
    ScalarArray(RwLock<Vec<ScalarValue>>),
    Structure(Vec<PvField>),
    StructureArray(RwLock<Vec<PvField>>),
    Union(RwLock<Option<UnionSlot>>),
    UnionArray(RwLock<Vec<PvField>>),
}

#[derive(Clone)]
struct UnionSlot {
    /// Member name for restricted unions, None for variant unions.
    selector: Option<String>,
    value: PvField,
}

/// Instantiate a zero-valued tree for the given introspection interface.
pub fn create_tree(field: &Field) -> PvField {
    PvField::create(field)
}

impl PvField {
    /// Instantiate a zero-valued tree for the given introspection interface.
    pub fn create(field: &Field) -> Self {
        let content = match field {
            Field::Scalar(t) => Content::Scalar(RwLock::new(ScalarValue::zero(*t))),
            Field::ScalarArray(_) => Content::ScalarArray(RwLock::new(Vec::new())),
            Field::Structure(s) => Content::Structure(
                s.members()
                    .iter()
                    .map(|m| Self::create(&m.field))
                    .collect(),
            ),
            Field::StructureArray(_) => Content::StructureArray(RwLock::new(Vec::new())),
            Field::Union(_) => Content::Union(RwLock::new(None)),
            Field::UnionArray(_) => Content::UnionArray(RwLock::new(Vec::new())),
        };
        Self {
            node: Arc::new(Node {
                field: field.clone(),
                content,
            }),
        }
    }

    /// Instantiate a zero-valued structure.
    pub fn new_structure(structure: &Arc<Structure>) -> Self {
        Self::create(&Field::Structure(structure.clone()))
    }

    /// Introspection interface of this node.
    pub fn field(&self) -> &Field {
        &self.node.field
    }

    /// Type tag of this node (see [`Field::type_tag`]).
    pub fn type_tag(&self) -> String {
        self.node.field.type_tag()
    }

    /// Structure introspection if this node is a structure.
    pub fn structure(&self) -> Option<&Arc<Structure>> {
        self.node.field.as_structure()
    }

    /// True if both handles refer to the same node.
    pub fn is_same(&self, other: &PvField) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Look up a descendant by dotted path (`alarm.severity`).
    ///
    /// Returns a handle onto the node inside this tree, never a copy.
    pub fn get_sub_field(&self, path: &str) -> Option<PvField> {
        let mut current = self.clone();
        for segment in path.split('.') {
            let index = current.structure()?.field_index(segment)?;
            let next = match &current.node.content {
                Content::Structure(children) => children.get(index)?.clone(),
                _ => return None,
            };
            current = next;
        }
        Some(current)
    }

    /// Iterate over the direct members of a structure node.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &PvField)> {
        match (&self.node.field, &self.node.content) {
            (Field::Structure(s), Content::Structure(children)) => Box::new(
                s.members()
                    .iter()
                    .map(|m| m.name.as_str())
                    .zip(children.iter()),
            ) as Box<dyn Iterator<Item = _>>,
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Read a scalar value.
    pub fn get(&self) -> Option<ScalarValue> {
        match &self.node.content {
            Content::Scalar(v) => Some(v.read().clone()),
            _ => None,
        }
    }

    /// Write a scalar value. The value must have the node's exact scalar type.
    pub fn put(&self, value: impl Into<ScalarValue>) -> Result<(), TreeError> {
        let value = value.into();
        match (&self.node.field, &self.node.content) {
            (Field::Scalar(t), Content::Scalar(slot)) => {
                check_scalar_type(*t, &value)?;
                *slot.write() = value;
                Ok(())
            }
            _ => Err(self.invalid("put")),
        }
    }

    /// Read the contents of a scalar array.
    pub fn get_array(&self) -> Option<Vec<ScalarValue>> {
        match &self.node.content {
            Content::ScalarArray(v) => Some(v.read().clone()),
            _ => None,
        }
    }

    /// Replace the contents of a scalar array. Every element must have the
    /// array's element type.
    pub fn put_array<T: Into<ScalarValue>>(
        &self,
        values: impl IntoIterator<Item = T>,
    ) -> Result<(), TreeError> {
        match (&self.node.field, &self.node.content) {
            (Field::ScalarArray(t), Content::ScalarArray(slot)) => {
                let values: Vec<ScalarValue> = values.into_iter().map(Into::into).collect();
                for value in &values {
                    check_scalar_type(*t, value)?;
                }
                *slot.write() = values;
                Ok(())
            }
            _ => Err(self.invalid("put_array")),
        }
    }

    /// Length of a scalar, structure or union array.
    pub fn array_len(&self) -> Option<usize> {
        match &self.node.content {
            Content::ScalarArray(v) => Some(v.read().len()),
            Content::StructureArray(v) | Content::UnionArray(v) => Some(v.read().len()),
            _ => None,
        }
    }

    /// Handles onto the elements of a structure or union array.
    pub fn elements(&self) -> Option<Vec<PvField>> {
        match &self.node.content {
            Content::StructureArray(v) | Content::UnionArray(v) => Some(v.read().clone()),
            _ => None,
        }
    }

    /// Append a zero-valued element to a structure or union array.
    pub fn append_element(&self) -> Result<PvField, TreeError> {
        match (&self.node.field, &self.node.content) {
            (Field::StructureArray(s), Content::StructureArray(slot)) => {
                let element = Self::new_structure(s);
                slot.write().push(element.clone());
                Ok(element)
            }
            (Field::UnionArray(u), Content::UnionArray(slot)) => {
                let element = Self::create(&Field::Union(u.clone()));
                slot.write().push(element.clone());
                Ok(element)
            }
            _ => Err(self.invalid("append_element")),
        }
    }

    /// Current value of a union, if one is stored.
    pub fn union_value(&self) -> Option<PvField> {
        match &self.node.content {
            Content::Union(slot) => slot.read().as_ref().map(|s| s.value.clone()),
            _ => None,
        }
    }

    /// Selected member name of a restricted union.
    pub fn selected_name(&self) -> Option<String> {
        match &self.node.content {
            Content::Union(slot) => slot.read().as_ref().and_then(|s| s.selector.clone()),
            _ => None,
        }
    }

    /// Select a member of a restricted union, storing a zero value for it.
    pub fn select(&self, name: &str) -> Result<PvField, TreeError> {
        match (&self.node.field, &self.node.content) {
            (Field::Union(u), Content::Union(slot)) if !u.is_variant() => {
                let field = u
                    .field(name)
                    .ok_or_else(|| TreeError::FieldNotFound(name.to_string()))?;
                let value = Self::create(field);
                *slot.write() = Some(UnionSlot {
                    selector: Some(name.to_string()),
                    value: value.clone(),
                });
                Ok(value)
            }
            _ => Err(self.invalid("select")),
        }
    }

    /// Store any value in a variant union.
    pub fn set_variant(&self, value: PvField) -> Result<(), TreeError> {
        match (&self.node.field, &self.node.content) {
            (Field::Union(u), Content::Union(slot)) if u.is_variant() => {
                *slot.write() = Some(UnionSlot {
                    selector: None,
                    value,
                });
                Ok(())
            }
            _ => Err(self.invalid("set_variant")),
        }
    }

    fn invalid(&self, operation: &'static str) -> TreeError {
        TreeError::InvalidOperation {
            kind: self.node.field.kind_name(),
            operation,
        }
    }
}

fn check_scalar_type(expected: ScalarType, value: &ScalarValue) -> Result<(), TreeError> {
    let got = value.scalar_type();
    if got == expected {
        Ok(())
    } else {
        Err(TreeError::TypeMismatch {
            expected: expected.name().to_string(),
            got: got.name().to_string(),
        })
    }
}

impl fmt::Debug for PvField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node.content {
            Content::Scalar(v) => write!(f, "{} {:?}", self.type_tag(), v.read()),
            Content::ScalarArray(v) => write!(f, "{} {:?}", self.type_tag(), v.read()),
            Content::Structure(_) => f
                .debug_map()
                .entries(self.fields())
                .finish(),
            Content::StructureArray(v) | Content::UnionArray(v) => {
                write!(f, "{} ", self.type_tag())?;
                f.debug_list().entries(v.read().iter()).finish()
            }
            Content::Union(slot) => match slot.read().as_ref() {
                Some(s) => write!(f, "{} {:?}", self.type_tag(), s.value),
                None => write!(f, "{} (empty)", self.type_tag()),
            },
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural conformance and data-level validity.
//!
//! Conformance is decided on introspection alone:
//!
//! - every required field must be present with a matching kind;
//! - an optional field may be absent, but if present it must match too.
//!
//! A tree whose optional `alarm` is a bare string is therefore rejected,
//! while the same tree without any `alarm` is accepted.
//!
//! Validity ([`is_valid`]) is a separate, data-level check (equal column
//! lengths, consistent sizes) that is never implied by conformance.

use crate::descriptor::{FieldConstraint, FieldDecl, SchemaDescriptor, ValidityRule};
use crate::pvdata::{Field, PvField, ScalarValue, Structure};
use crate::registry::DescriptorRegistry;
use crate::type_id;
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Why a single field failed conformance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// A required field is absent.
    Missing,
    /// The field is present with the wrong kind or shape.
    WrongKind { expected: String, found: String },
    /// The field nests a Normative Type the registry does not know.
    UnknownNestedType(String),
    /// The candidate itself is not a structure.
    NotAStructure { found: String },
}

/// One failed field, addressed by dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub path: String,
    pub optional: bool,
    pub reason: FailureReason,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.optional { "optional" } else { "required" };
        match &self.reason {
            FailureReason::Missing => write!(f, "{} field '{}' is missing", label, self.path),
            FailureReason::WrongKind { expected, found } => write!(
                f,
                "{} field '{}': expected {}, found {}",
                label, self.path, expected, found
            ),
            FailureReason::UnknownNestedType(type_id) => write!(
                f,
                "{} field '{}': unknown nested type {}",
                label, self.path, type_id
            ),
            FailureReason::NotAStructure { found } => {
                write!(f, "expected a structure, found {}", found)
            }
        }
    }
}

/// Result of checking one candidate against one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceReport {
    type_id: String,
    failures: Vec<Failure>,
}

impl ConformanceReport {
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn is_conformant(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure recorded for a given field path, if any.
    pub fn failure(&self, path: &str) -> Option<&Failure> {
        self.failures.iter().find(|f| f.path == path)
    }

    pub fn into_result(self) -> Result<(), ConformanceError> {
        if self.is_conformant() {
            Ok(())
        } else {
            Err(ConformanceError::NotConformant(self))
        }
    }
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "conforms to {}", self.type_id);
        }
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

/// Errors raised when a tree cannot be viewed as a Normative Type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConformanceError {
    #[error("tree does not conform to {}: {}", .0.type_id(), .0)]
    NotConformant(ConformanceReport),
    #[error("unknown normative type: {0}")]
    UnknownType(String),
}

impl ConformanceError {
    pub fn report(&self) -> Option<&ConformanceReport> {
        match self {
            Self::NotConformant(report) => Some(report),
            Self::UnknownType(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Checker
// ---------------------------------------------------------------------------

/// True if the declared type tag is compatible with the schema's type id.
pub fn is_compatible_id(candidate_tag: &str, schema_uri: &str) -> bool {
    type_id::is_compatible(candidate_tag, schema_uri)
}

/// Checks candidates against descriptors, resolving nested types through a registry.
#[derive(Clone, Copy)]
pub struct ConformanceChecker<'r> {
    registry: &'r DescriptorRegistry,
}

impl ConformanceChecker<'static> {
    /// Checker over the builtin Normative Types.
    pub fn builtin() -> Self {
        Self::new(DescriptorRegistry::builtin())
    }
}

impl<'r> ConformanceChecker<'r> {
    pub fn new(registry: &'r DescriptorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r DescriptorRegistry {
        self.registry
    }

    /// Full report for an introspection interface.
    pub fn check_field(&self, descriptor: &SchemaDescriptor, field: &Field) -> ConformanceReport {
        match field {
            Field::Structure(structure) => self.check(descriptor, structure),
            other => ConformanceReport {
                type_id: descriptor.type_id.clone(),
                failures: vec![Failure {
                    path: String::new(),
                    optional: false,
                    reason: FailureReason::NotAStructure {
                        found: other.type_tag(),
                    },
                }],
            },
        }
    }

    /// Full report for a structure.
    pub fn check(&self, descriptor: &SchemaDescriptor, structure: &Structure) -> ConformanceReport {
        let mut failures = Vec::new();
        self.collect(descriptor, structure, "", &mut failures);
        ConformanceReport {
            type_id: descriptor.type_id.clone(),
            failures,
        }
    }

    /// Structural compatibility of a data tree; the type tag is not consulted.
    pub fn is_structurally_compatible(&self, tree: &PvField, descriptor: &SchemaDescriptor) -> bool {
        let report = self.check_field(descriptor, tree.field());
        if !report.is_conformant() {
            log::debug!("[conformance] {} rejected: {}", descriptor.type_id, report);
        }
        report.is_conformant()
    }

    /// Same as [`Self::is_structurally_compatible`], naming the schema by type id.
    ///
    /// An unknown schema name is never compatible.
    pub fn is_structurally_compatible_with(&self, tree: &PvField, schema_name: &str) -> bool {
        match self.registry.get(schema_name) {
            Some(descriptor) => self.is_structurally_compatible(tree, &descriptor),
            None => {
                log::debug!("[conformance] unknown schema {}", schema_name);
                false
            }
        }
    }

    fn collect(
        &self,
        descriptor: &SchemaDescriptor,
        structure: &Structure,
        prefix: &str,
        failures: &mut Vec<Failure>,
    ) {
        for decl in &descriptor.fields {
            let path = format!("{}{}", prefix, decl.name);
            match structure.field(&decl.name) {
                None if decl.optional => {}
                None => failures.push(Failure {
                    path,
                    optional: false,
                    reason: FailureReason::Missing,
                }),
                Some(field) => self.check_decl(decl, field, path, failures),
            }
        }
    }

    fn check_decl(&self, decl: &FieldDecl, field: &Field, path: String, failures: &mut Vec<Failure>) {
        let wrong_kind = |path: String| Failure {
            path,
            optional: decl.optional,
            reason: FailureReason::WrongKind {
                expected: decl.constraint.expected(),
                found: field.type_tag(),
            },
        };

        if let Some(ok) = decl.constraint.matches_local(field) {
            if !ok {
                failures.push(wrong_kind(path));
            }
            return;
        }

        let FieldConstraint::NestedArray { type_id } = &decl.constraint else {
            return;
        };
        let Field::StructureArray(element) = field else {
            failures.push(wrong_kind(path));
            return;
        };
        let Some(nested) = self.registry.get(type_id) else {
            failures.push(Failure {
                path,
                optional: decl.optional,
                reason: FailureReason::UnknownNestedType(type_id.clone()),
            });
            return;
        };
        self.collect(&nested, element, &format!("{}.", path), failures);
    }
}

// ---------------------------------------------------------------------------
// Validity
// ---------------------------------------------------------------------------

/// Data-level validity of a tree against the descriptor's rules.
///
/// Only meaningful on a conformant tree; types without rules are always valid.
pub fn is_valid(tree: &PvField, descriptor: &SchemaDescriptor) -> bool {
    descriptor.validity.iter().all(|rule| {
        let ok = check_rule(tree, rule);
        if !ok {
            log::debug!("[validity] {} failed {:?}", descriptor.type_id, rule);
        }
        ok
    })
}

fn check_rule(tree: &PvField, rule: &ValidityRule) -> bool {
    match rule {
        ValidityRule::EqualLengths { fields } => {
            let mut lengths = fields.iter().filter_map(|name| array_len(tree, name));
            match lengths.next() {
                Some(first) => lengths.all(|len| len == first),
                None => true,
            }
        }
        ValidityRule::TableShape => table_shape(tree).unwrap_or(false),
        ValidityRule::MatrixDims => matrix_dims(tree).unwrap_or(false),
        ValidityRule::HistogramRanges => {
            match (array_len(tree, "ranges"), array_len(tree, "value")) {
                (Some(ranges), Some(value)) => ranges == value + 1,
                _ => false,
            }
        }
        ValidityRule::ContinuumUnits => {
            match (
                array_len(tree, "base"),
                array_len(tree, "value"),
                array_len(tree, "units"),
            ) {
                (Some(base), Some(value), Some(units)) => {
                    units == base + 1 && (base == 0 || value % base == 0)
                }
                _ => false,
            }
        }
        ValidityRule::NdArraySizes => nd_array_sizes(tree).unwrap_or(false),
    }
}

fn array_len(tree: &PvField, name: &str) -> Option<usize> {
    tree.get_sub_field(name)?.array_len()
}

fn table_shape(tree: &PvField) -> Option<bool> {
    let value = tree.get_sub_field("value")?;
    let lengths: Vec<usize> = value
        .fields()
        .map(|(_, column)| column.array_len())
        .collect::<Option<_>>()?;
    let labels = array_len(tree, "labels")?;
    let equal = lengths.windows(2).all(|w| w[0] == w[1]);
    Some(equal && labels == lengths.len())
}

fn matrix_dims(tree: &PvField) -> Option<bool> {
    let value = array_len(tree, "value")?;
    let Some(dim) = tree.get_sub_field("dim") else {
        return Some(true);
    };
    let mut product: i64 = 1;
    for d in dim.get_array()? {
        product = product.checked_mul(i64::from(d.as_i32()?))?;
    }
    Some(i64::try_from(value).ok()? == product)
}

fn nd_array_sizes(tree: &PvField) -> Option<bool> {
    let (value_size, element_size) = match tree.get_sub_field("value")?.union_value() {
        Some(array) => {
            let element = array.field().element_type()?.size().unwrap_or(0) as i64;
            (array.array_len()? as i64 * element, element)
        }
        None => (0, 0),
    };

    let compressed = read_long(tree, "compressedSize")?;
    if value_size != compressed {
        return Some(false);
    }

    let dimensions = tree.get_sub_field("dimension")?.elements()?;
    let mut expected = 0i64;
    if !dimensions.is_empty() {
        expected = element_size;
        for dimension in dimensions {
            let size = dimension.get_sub_field("size")?.get()?.as_i32()?;
            expected = expected.checked_mul(i64::from(size))?;
        }
    }
    let uncompressed = read_long(tree, "uncompressedSize")?;
    if uncompressed != expected {
        return Some(false);
    }

    let codec = tree.get_sub_field("codec.name")?.get()?;
    let uncoded = codec.as_str().map_or(false, str::is_empty);
    Some(!(uncoded && value_size < uncompressed))
}

fn read_long(tree: &PvField, name: &str) -> Option<i64> {
    tree.get_sub_field(name)?.get().as_ref().and_then(ScalarValue::as_i64)
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builtin Normative Types.
//!
//! The table is built once per process and shared by reference afterwards.

use super::{FieldConstraint, SchemaDescriptor, ValidityRule, DESCRIPTOR_FIELD};
use crate::pvdata::ScalarType;
use crate::shapes::Shape;
use crate::type_id::TypeId;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// The builtin Normative Types, all at version 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    NtScalar,
    NtScalarArray,
    NtEnum,
    NtMatrix,
    NtUri,
    NtNameValue,
    NtTable,
    NtAttribute,
    NtNdArrayAttribute,
    NtMultiChannel,
    NtScalarMultiChannel,
    NtNdArray,
    NtHistogram,
    NtAggregate,
    NtContinuum,
    NtUnion,
    NtUnionArray,
}

impl BuiltinType {
    /// Every builtin type. Nested types come before the types nesting them.
    pub const ALL: [BuiltinType; 17] = [
        Self::NtScalar,
        Self::NtScalarArray,
        Self::NtEnum,
        Self::NtMatrix,
        Self::NtUri,
        Self::NtNameValue,
        Self::NtTable,
        Self::NtAttribute,
        Self::NtNdArrayAttribute,
        Self::NtMultiChannel,
        Self::NtScalarMultiChannel,
        Self::NtNdArray,
        Self::NtHistogram,
        Self::NtAggregate,
        Self::NtContinuum,
        Self::NtUnion,
        Self::NtUnionArray,
    ];

    /// Fully qualified type id, e.g. `epics:nt/NTScalar:1.0`.
    pub const fn type_id(self) -> &'static str {
        match self {
            Self::NtScalar => "epics:nt/NTScalar:1.0",
            Self::NtScalarArray => "epics:nt/NTScalarArray:1.0",
            Self::NtEnum => "epics:nt/NTEnum:1.0",
            Self::NtMatrix => "epics:nt/NTMatrix:1.0",
            Self::NtUri => "epics:nt/NTURI:1.0",
            Self::NtNameValue => "epics:nt/NTNameValue:1.0",
            Self::NtTable => "epics:nt/NTTable:1.0",
            Self::NtAttribute => "epics:nt/NTAttribute:1.0",
            Self::NtNdArrayAttribute => "epics:nt/NTNDArrayAttribute:1.0",
            Self::NtMultiChannel => "epics:nt/NTMultiChannel:1.0",
            Self::NtScalarMultiChannel => "epics:nt/NTScalarMultiChannel:1.0",
            Self::NtNdArray => "epics:nt/NTNDArray:1.0",
            Self::NtHistogram => "epics:nt/NTHistogram:1.0",
            Self::NtAggregate => "epics:nt/NTAggregate:1.0",
            Self::NtContinuum => "epics:nt/NTContinuum:1.0",
            Self::NtUnion => "epics:nt/NTUnion:1.0",
            Self::NtUnionArray => "epics:nt/NTUnionArray:1.0",
        }
    }

    /// Shared descriptor of this type.
    pub fn descriptor(self) -> &'static Arc<SchemaDescriptor> {
        static TABLE: OnceLock<Vec<Arc<SchemaDescriptor>>> = OnceLock::new();
        let table = TABLE.get_or_init(|| {
            BuiltinType::ALL
                .iter()
                .map(|t| Arc::new(t.build()))
                .collect()
        });
        &table[self as usize]
    }

    /// Find the builtin whose type id is compatible with `type_id`.
    pub fn from_type_id(type_id: &str) -> Option<Self> {
        let wanted = TypeId::parse(type_id);
        Self::ALL
            .into_iter()
            .find(|t| TypeId::parse(t.type_id()).is_same_major(&wanted))
    }

    fn build(self) -> SchemaDescriptor {
        let d = SchemaDescriptor::new(self.type_id());
        match self {
            Self::NtScalar => d
                .required("value", FieldConstraint::AnyScalar)
                .with_common()
                .optional("display", shape(Shape::Display))
                .optional("control", shape(Shape::Control)),
            Self::NtScalarArray => d
                .required("value", FieldConstraint::AnyScalarArray)
                .with_common()
                .optional("display", shape(Shape::Display))
                .optional("control", shape(Shape::Control)),
            Self::NtEnum => d
                .required("value", shape(Shape::Enumerated))
                .with_common(),
            Self::NtMatrix => d
                .required("value", array(ScalarType::Double))
                .optional("dim", array(ScalarType::Int))
                .with_common()
                .optional("display", shape(Shape::Display))
                .rule(ValidityRule::MatrixDims),
            Self::NtUri => d
                .required("scheme", scalar(ScalarType::String))
                .optional("authority", scalar(ScalarType::String))
                .required("path", scalar(ScalarType::String))
                .optional("query", FieldConstraint::Query),
            Self::NtNameValue => d
                .required("name", array(ScalarType::String))
                .required("value", FieldConstraint::AnyScalarArray)
                .with_common()
                .rule(ValidityRule::EqualLengths {
                    fields: vec!["name".into(), "value".into()],
                }),
            Self::NtTable => d
                .required("labels", array(ScalarType::String))
                .required("value", FieldConstraint::Columns)
                .with_common()
                .rule(ValidityRule::TableShape),
            Self::NtAttribute => d
                .required("name", scalar(ScalarType::String))
                .required("value", FieldConstraint::VariantUnion)
                .optional("tags", array(ScalarType::String))
                .with_common(),
            Self::NtNdArrayAttribute => d
                .required("name", scalar(ScalarType::String))
                .required("value", FieldConstraint::VariantUnion)
                .optional("tags", array(ScalarType::String))
                .required(DESCRIPTOR_FIELD, scalar(ScalarType::String))
                .optional("alarm", shape(Shape::Alarm))
                .optional("timeStamp", shape(Shape::TimeStamp))
                .required("sourceType", scalar(ScalarType::Int))
                .required("source", scalar(ScalarType::String)),
            Self::NtMultiChannel => d
                .required("value", FieldConstraint::AnyUnionArray)
                .with_channels(),
            Self::NtScalarMultiChannel => d
                .required("value", FieldConstraint::AnyScalarArray)
                .with_channels(),
            Self::NtNdArray => d
                .required("value", FieldConstraint::ArrayUnion)
                .required("codec", shape(Shape::Codec))
                .required("compressedSize", scalar(ScalarType::Long))
                .required("uncompressedSize", scalar(ScalarType::Long))
                .required(
                    "dimension",
                    FieldConstraint::ShapeArray {
                        shape: Shape::Dimension,
                    },
                )
                .required("uniqueId", scalar(ScalarType::Int))
                .required("dataTimeStamp", shape(Shape::TimeStamp))
                .required(
                    "attribute",
                    FieldConstraint::NestedArray {
                        type_id: Self::NtNdArrayAttribute.type_id().to_string(),
                    },
                )
                .with_common()
                .optional("display", shape(Shape::Display))
                .rule(ValidityRule::NdArraySizes),
            Self::NtHistogram => d
                .required("ranges", array(ScalarType::Double))
                .required(
                    "value",
                    FieldConstraint::ScalarArrayOneOf {
                        types: vec![ScalarType::Short, ScalarType::Int, ScalarType::Long],
                    },
                )
                .with_common()
                .rule(ValidityRule::HistogramRanges),
            Self::NtAggregate => d
                .required("value", scalar(ScalarType::Double))
                .required("N", scalar(ScalarType::Long))
                .optional("dispersion", scalar(ScalarType::Double))
                .optional("first", scalar(ScalarType::Double))
                .optional("firstTimeStamp", shape(Shape::TimeStamp))
                .optional("last", scalar(ScalarType::Double))
                .optional("lastTimeStamp", shape(Shape::TimeStamp))
                .optional("max", scalar(ScalarType::Double))
                .optional("min", scalar(ScalarType::Double))
                .with_common(),
            Self::NtContinuum => d
                .required("base", array(ScalarType::Double))
                .required("value", array(ScalarType::Double))
                .required("units", array(ScalarType::String))
                .with_common()
                .rule(ValidityRule::ContinuumUnits),
            Self::NtUnion => d
                .required("value", FieldConstraint::AnyUnion)
                .with_common(),
            Self::NtUnionArray => d
                .required("value", FieldConstraint::AnyUnionArray)
                .with_common(),
        }
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_id())
    }
}

fn scalar(scalar_type: ScalarType) -> FieldConstraint {
    FieldConstraint::Scalar { scalar_type }
}

fn array(scalar_type: ScalarType) -> FieldConstraint {
    FieldConstraint::ScalarArray { scalar_type }
}

fn shape(shape: Shape) -> FieldConstraint {
    FieldConstraint::Shape { shape }
}

/// Per-channel arrays of the multi-channel types.
const CHANNEL_ARRAYS: [(&str, ScalarType); 7] = [
    ("severity", ScalarType::Int),
    ("status", ScalarType::Int),
    ("message", ScalarType::String),
    ("secondsPastEpoch", ScalarType::Long),
    ("nanoseconds", ScalarType::Int),
    ("userTag", ScalarType::Int),
    ("isConnected", ScalarType::Boolean),
];

impl SchemaDescriptor {
    /// descriptor, alarm and timeStamp, in that order, all optional.
    fn with_common(self) -> Self {
        self.optional(DESCRIPTOR_FIELD, scalar(ScalarType::String))
            .optional("alarm", shape(Shape::Alarm))
            .optional("timeStamp", shape(Shape::TimeStamp))
    }

    fn with_channels(self) -> Self {
        let mut d = self
            .required("channelName", array(ScalarType::String))
            .with_common();
        let mut lengths = vec!["value".to_string(), "channelName".to_string()];
        for (name, scalar_type) in CHANNEL_ARRAYS {
            d = d.optional(name, array(scalar_type));
            lengths.push(name.to_string());
        }
        d.rule(ValidityRule::EqualLengths { fields: lengths })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::NT_NAMESPACE;

    #[test]
    fn test_builtin_ids_are_strict_and_namespaced() {
        for t in BuiltinType::ALL {
            let id = TypeId::parse_strict(t.type_id()).unwrap();
            assert_eq!(id.namespace(), Some(NT_NAMESPACE));
            assert_eq!(id.major(), Some(1));
            assert_eq!(t.descriptor().type_id, t.type_id());
        }
    }

    #[test]
    fn test_table_is_indexed_by_variant() {
        for (i, t) in BuiltinType::ALL.iter().enumerate() {
            assert_eq!(*t as usize, i);
        }
    }

    #[test]
    fn test_no_duplicate_fields() {
        for t in BuiltinType::ALL {
            assert_eq!(t.descriptor().duplicate_field(), None, "{}", t);
        }
    }

    #[test]
    fn test_nested_types_are_declared_first() {
        for (i, t) in BuiltinType::ALL.iter().enumerate() {
            for nested in t.descriptor().nested_type_ids() {
                let position = BuiltinType::ALL
                    .iter()
                    .position(|b| b.type_id() == nested)
                    .unwrap();
                assert!(position < i);
            }
        }
    }

    #[test]
    fn test_from_type_id_ignores_minor() {
        assert_eq!(
            BuiltinType::from_type_id("epics:nt/NTScalar:1.3"),
            Some(BuiltinType::NtScalar)
        );
        assert_eq!(BuiltinType::from_type_id("epics:nt/NTScalar:2.0"), None);
        assert_eq!(BuiltinType::from_type_id("acme/NTScalar:1.0"), None);
        assert_eq!(BuiltinType::from_type_id("epics:nt/NTScalar"), None);
    }

    #[test]
    fn test_ntscalar_layout() {
        let d = BuiltinType::NtScalar.descriptor();
        let names: Vec<&str> = d.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["value", "descriptor", "alarm", "timeStamp", "display", "control"]
        );
        assert_eq!(d.required_fields().count(), 1);
    }

    #[test]
    fn test_ndarray_attribute_requires_descriptor() {
        let d = BuiltinType::NtNdArrayAttribute.descriptor();
        assert!(!d.field("descriptor").unwrap().optional);
        assert!(d.field("tags").unwrap().optional);
    }
}

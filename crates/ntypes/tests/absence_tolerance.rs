// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Optional fields never cause rejection by absence, and always cause
//! rejection when present but malformed.

use std::sync::Arc;

use ntypes::pvdata::{Field, FieldBuilder, Member, PvField, ScalarType, Structure};
use ntypes::shapes;
use ntypes::view::NTScalar;
use ntypes::{BuiltinType, ConformanceChecker, DescriptorRegistry, FieldConstraint};

/// Structure of `t` with every optional field present.
fn full_structure(t: BuiltinType) -> Arc<Structure> {
    let mut builder = DescriptorRegistry::builtin()
        .create_builder(t.type_id())
        .unwrap();
    if t.descriptor()
        .fields
        .iter()
        .any(|f| f.constraint.needs_value_type())
    {
        builder.value(ScalarType::Int);
    }
    for decl in t.descriptor().optional_fields() {
        builder.add_optional(&decl.name);
    }
    builder.create_structure().unwrap()
}

fn with_member(structure: &Structure, name: &str, replacement: Option<Field>) -> Structure {
    let members = structure
        .members()
        .iter()
        .filter_map(|m| {
            if m.name != name {
                return Some(m.clone());
            }
            replacement.clone().map(|field| Member::new(name, field))
        })
        .collect();
    Structure::new(structure.id(), members)
}

fn malformed(constraint: &FieldConstraint) -> Field {
    match constraint {
        FieldConstraint::Scalar {
            scalar_type: ScalarType::String,
        } => Field::Scalar(ScalarType::Int),
        _ => Field::Scalar(ScalarType::String),
    }
}

#[test]
fn test_removing_any_optional_field_keeps_conformance() {
    let checker = ConformanceChecker::builtin();
    for t in BuiltinType::ALL {
        let full = full_structure(t);
        assert!(checker.check(t.descriptor(), &full).is_conformant(), "{}", t);

        for decl in t.descriptor().optional_fields() {
            let without = with_member(&full, &decl.name, None);
            let report = checker.check(t.descriptor(), &without);
            assert!(report.is_conformant(), "{} without {}: {}", t, decl.name, report);
        }
    }
}

#[test]
fn test_malformed_optional_field_breaks_conformance() {
    let checker = ConformanceChecker::builtin();
    for t in BuiltinType::ALL {
        let full = full_structure(t);
        for decl in t.descriptor().optional_fields() {
            let broken = with_member(&full, &decl.name, Some(malformed(&decl.constraint)));
            let report = checker.check(t.descriptor(), &broken);
            let failure = report
                .failure(&decl.name)
                .unwrap_or_else(|| panic!("{} accepted malformed {}", t, decl.name));
            assert!(failure.optional);
        }
    }
}

#[test]
fn test_removing_required_field_breaks_conformance() {
    let checker = ConformanceChecker::builtin();
    for t in BuiltinType::ALL {
        let full = full_structure(t);
        for decl in t.descriptor().required_fields() {
            let without = with_member(&full, &decl.name, None);
            assert!(!checker.check(t.descriptor(), &without).is_conformant());
        }
    }
}

#[test]
fn test_alarm_missing_message() {
    let partial_alarm = FieldBuilder::new()
        .id("alarm_t")
        .add("severity", ScalarType::Int)
        .add("status", ScalarType::Int)
        .create_structure();
    let tree = PvField::new_structure(
        &FieldBuilder::new()
            .id(BuiltinType::NtScalar.type_id())
            .add("value", ScalarType::Double)
            .add_nested("alarm", partial_alarm)
            .add_field("timeStamp", shapes::create_time_stamp())
            .create_structure(),
    );
    assert!(!NTScalar::is_compatible(&tree));
}

#[test]
fn test_nested_attribute_element_is_checked() {
    let checker = ConformanceChecker::builtin();
    let full = full_structure(BuiltinType::NtNdArray);

    // attribute elements that lack the required 'source' field
    let bad_element = FieldBuilder::new()
        .id(BuiltinType::NtNdArrayAttribute.type_id())
        .add("name", ScalarType::String)
        .add_variant("value")
        .add("descriptor", ScalarType::String)
        .add("sourceType", ScalarType::Int)
        .create_structure();
    let broken = with_member(&full, "attribute", Some(Field::StructureArray(bad_element)));

    let report = checker.check(BuiltinType::NtNdArray.descriptor(), &broken);
    assert!(report.failure("attribute.source").is_some(), "{}", report);
}

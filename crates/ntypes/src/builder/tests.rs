// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::conformance::ConformanceChecker;
use crate::descriptor::BuiltinType;
use crate::pvdata::FieldBuilder;
use crate::shapes::{self, Shape};

fn builder(t: BuiltinType) -> SchemaBuilder<'static> {
    SchemaBuilder::builtin(t.type_id()).unwrap()
}

fn names(structure: &Structure) -> Vec<&str> {
    structure.field_names().collect()
}

#[test]
fn test_ntscalar_scenario() {
    let structure = builder(BuiltinType::NtScalar)
        .value(ScalarType::Double)
        .add_alarm()
        .add_time_stamp()
        .create_structure()
        .unwrap();
    assert_eq!(names(&structure), vec!["value", "alarm", "timeStamp"]);
    assert_eq!(structure.id(), "epics:nt/NTScalar:1.0");

    let checker = ConformanceChecker::builtin();
    let descriptor = BuiltinType::NtScalar.descriptor();

    let hand_built = FieldBuilder::new()
        .id("epics:nt/NTScalar:1.0")
        .add("value", ScalarType::Double)
        .add_field("alarm", shapes::create_alarm())
        .add_field("timeStamp", shapes::create_time_stamp())
        .create_structure();
    assert!(checker.check(descriptor, &hand_built).is_conformant());

    let broken = FieldBuilder::new()
        .id("epics:nt/NTScalar:1.0")
        .add("value", ScalarType::Double)
        .add("alarm", ScalarType::String)
        .add_field("timeStamp", shapes::create_time_stamp())
        .create_structure();
    assert!(!checker.check(descriptor, &broken).is_conformant());
}

#[test]
fn test_optional_fields_follow_declaration_order() {
    let structure = builder(BuiltinType::NtScalar)
        .value(ScalarType::Int)
        .add_control()
        .add_time_stamp()
        .add_descriptor()
        .add_display()
        .add_alarm()
        .create_structure()
        .unwrap();
    assert_eq!(
        names(&structure),
        vec!["value", "descriptor", "alarm", "timeStamp", "display", "control"]
    );
}

#[test]
fn test_add_optional_is_idempotent() {
    let structure = builder(BuiltinType::NtEnum)
        .add_alarm()
        .add_alarm()
        .create_structure()
        .unwrap();
    assert_eq!(names(&structure), vec!["value", "alarm"]);
}

#[test]
fn test_build_resets_configuration() {
    let mut b = builder(BuiltinType::NtEnum);
    let first = b
        .add_descriptor()
        .add_alarm()
        .add("extra", Field::Scalar(ScalarType::Int))
        .create_structure()
        .unwrap();
    assert_eq!(first.len(), 4);

    let second = b.create_structure().unwrap();
    let third = b.create_structure().unwrap();
    assert_eq!(names(&second), vec!["value"]);
    assert_eq!(second, third);
}

#[test]
fn test_extra_fields_keep_declaration_order() {
    let structure = builder(BuiltinType::NtScalarArray)
        .add("zeta", Field::Scalar(ScalarType::Int))
        .value(ScalarType::Float)
        .add("alpha", Field::ScalarArray(ScalarType::String))
        .add_alarm()
        .add("mid", Field::Structure(Shape::Control.create()))
        .create_structure()
        .unwrap();
    assert_eq!(names(&structure), vec!["value", "alarm", "zeta", "alpha", "mid"]);
    assert_eq!(structure.field("value"), Some(&Field::ScalarArray(ScalarType::Float)));
}

#[test]
fn test_redefined_extra_field_last_wins() {
    let structure = builder(BuiltinType::NtEnum)
        .add("a", Field::Scalar(ScalarType::Int))
        .add("b", Field::Scalar(ScalarType::Int))
        .add("a", Field::Scalar(ScalarType::Double))
        .create_structure()
        .unwrap();
    assert_eq!(names(&structure), vec!["value", "b", "a"]);
    assert_eq!(structure.field("a"), Some(&Field::Scalar(ScalarType::Double)));
}

#[test]
fn test_extra_field_clashing_with_schema_field() {
    let err = builder(BuiltinType::NtEnum)
        .add("alarm", Field::Scalar(ScalarType::String))
        .create_structure()
        .unwrap_err();
    assert_eq!(err, ConfigurationError::DuplicateField("alarm".into()));
}

#[test]
fn test_missing_value_type_then_recover() {
    let mut b = builder(BuiltinType::NtScalar);
    let err = b.add_alarm().create_structure().unwrap_err();
    assert!(matches!(err, ConfigurationError::MissingValueType { .. }));

    let structure = b.value(ScalarType::Long).create_structure().unwrap();
    assert_eq!(names(&structure), vec!["value"]);
}

#[test]
fn test_disallowed_value_type() {
    let err = builder(BuiltinType::NtHistogram)
        .value(ScalarType::Double)
        .create_structure()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::DisallowedValueType {
            scalar_type: ScalarType::Double,
            ..
        }
    ));

    let structure = builder(BuiltinType::NtHistogram)
        .value(ScalarType::Long)
        .create_structure()
        .unwrap();
    assert_eq!(structure.field("value"), Some(&Field::ScalarArray(ScalarType::Long)));
}

#[test]
fn test_settings_that_do_not_apply() {
    let err = builder(BuiltinType::NtEnum)
        .value(ScalarType::Int)
        .create_structure()
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::NotConfigurable { .. }));

    let err = builder(BuiltinType::NtUri)
        .add_display()
        .create_structure()
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::UnknownOptional { .. }));

    let err = builder(BuiltinType::NtScalar)
        .value(ScalarType::Int)
        .add_column("x", ScalarType::Double)
        .create_structure()
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::NotConfigurable { .. }));
}

#[test]
fn test_table_columns_and_labels() {
    let tree = builder(BuiltinType::NtTable)
        .add_column("x", ScalarType::Double)
        .add_column("name", ScalarType::String)
        .add_column("x", ScalarType::Float)
        .add_descriptor()
        .create_instance()
        .unwrap();

    let value = tree.get_sub_field("value").unwrap();
    let columns: Vec<(String, String)> = value
        .fields()
        .map(|(name, f)| (name.to_string(), f.type_tag()))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("x".to_string(), "float[]".to_string()),
            ("name".to_string(), "string[]".to_string())
        ]
    );

    let labels = tree.get_sub_field("labels").unwrap().get_array().unwrap();
    let labels: Vec<&str> = labels.iter().filter_map(|v| v.as_str()).collect();
    assert_eq!(labels, vec!["x", "name"]);
}

#[test]
fn test_uri_query_enables_query_field() {
    let structure = builder(BuiltinType::NtUri)
        .add_query_field("filter", ScalarType::String)
        .add_query_field("limit", ScalarType::Int)
        .create_structure()
        .unwrap();
    assert_eq!(names(&structure), vec!["scheme", "path", "query"]);
    assert_eq!(
        structure.sub_field("query.limit"),
        Some(&Field::Scalar(ScalarType::Int))
    );

    let err = builder(BuiltinType::NtUri)
        .add_query_field("flag", ScalarType::Boolean)
        .create_structure()
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidQueryType { .. }));
}

#[test]
fn test_union_types_default_to_variant() {
    let structure = builder(BuiltinType::NtUnion).create_structure().unwrap();
    assert!(structure.field("value").unwrap().as_union().unwrap().is_variant());

    let restricted = FieldBuilder::new()
        .add("i", ScalarType::Int)
        .add("s", ScalarType::String)
        .create_union();
    let structure = builder(BuiltinType::NtMultiChannel)
        .value_union(restricted.clone())
        .create_structure()
        .unwrap();
    assert_eq!(structure.field("value"), Some(&Field::UnionArray(restricted)));
    assert_eq!(names(&structure), vec!["value", "channelName"]);
}

#[test]
fn test_ndarray_builds_and_conforms() {
    let tree = builder(BuiltinType::NtNdArray)
        .add_display()
        .create_instance()
        .unwrap();
    let checker = ConformanceChecker::builtin();
    assert!(checker.is_structurally_compatible(&tree, BuiltinType::NtNdArray.descriptor()));

    let attribute = tree.get_sub_field("attribute").unwrap();
    let element = attribute.append_element().unwrap();
    let element_names: Vec<&str> = element.fields().map(|(name, _)| name).collect();
    assert_eq!(
        element_names,
        vec!["name", "value", "descriptor", "sourceType", "source"]
    );
    assert!(checker.is_structurally_compatible(&element, BuiltinType::NtNdArrayAttribute.descriptor()));
}

#[test]
fn test_into_structure_consumes_builder() {
    let mut b = builder(BuiltinType::NtContinuum);
    b.add_time_stamp();
    let structure = b.into_structure().unwrap();
    assert_eq!(names(&structure), vec!["base", "value", "units", "timeStamp"]);
}

#[test]
fn test_every_builtin_builds_minimal_schema() {
    for t in BuiltinType::ALL {
        let mut b = builder(t);
        if t.descriptor().fields.iter().any(|f| f.constraint.needs_value_type()) {
            b.value(ScalarType::Int);
        }
        let structure = b.create_structure().unwrap();
        let required = t.descriptor().required_fields().count();
        assert_eq!(structure.len(), required, "{}", t);
    }
}

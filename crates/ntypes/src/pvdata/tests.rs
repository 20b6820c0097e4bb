// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Integration tests for the value store.

use super::*;
use std::sync::Arc;

#[test]
fn test_full_workflow() {
    // 1. Build introspection at runtime
    let time = FieldBuilder::new()
        .id("time_t")
        .add("secondsPastEpoch", ScalarType::Long)
        .add("nanoseconds", ScalarType::Int)
        .add("userTag", ScalarType::Int)
        .create_structure();
    let reading = FieldBuilder::new()
        .id("reading_t")
        .add("value", ScalarType::Double)
        .add_nested("timeStamp", time)
        .add("location", ScalarType::String)
        .create_structure();

    // 2. Instantiate and populate
    let data = create_tree(&Field::Structure(reading.clone()));
    data.get_sub_field("value").expect("value").put(23.5f64).expect("put value");
    data.get_sub_field("timeStamp.secondsPastEpoch")
        .expect("seconds")
        .put(1_702_900_000i64)
        .expect("put seconds");
    data.get_sub_field("location")
        .expect("location")
        .put("Building A")
        .expect("put location");

    // 3. Verify through fresh lookups
    assert_eq!(
        data.get_sub_field("value").and_then(|f| f.get()),
        Some(ScalarValue::Double(23.5))
    );
    assert_eq!(
        data.get_sub_field("timeStamp")
            .and_then(|t| t.get_sub_field("secondsPastEpoch"))
            .and_then(|f| f.get())
            .and_then(|v| v.as_i64()),
        Some(1_702_900_000)
    );
    assert_eq!(data.structure(), Some(&reading));
}

#[test]
fn test_nested_arrays_of_structures() {
    let dimension = FieldBuilder::new()
        .id("dimension_t")
        .add("size", ScalarType::Int)
        .add("reverse", ScalarType::Boolean)
        .create_structure();
    let image = FieldBuilder::new()
        .add_field("dimension", Field::StructureArray(dimension))
        .create_structure();

    let data = PvField::new_structure(&image);
    let dims = data.get_sub_field("dimension").expect("dimension");
    for size in [640i32, 480] {
        let element = dims.append_element().expect("append");
        element.get_sub_field("size").expect("size").put(size).expect("put");
    }

    let sizes: Vec<i32> = dims
        .elements()
        .expect("elements")
        .iter()
        .filter_map(|e| e.get_sub_field("size"))
        .filter_map(|f| f.get())
        .filter_map(|v| v.as_i32())
        .collect();
    assert_eq!(sizes, vec![640, 480]);
}

#[test]
fn test_union_arrays_hold_independent_elements() {
    let values = PvField::create(&Field::UnionArray(Arc::new(Union::variant())));
    for text in ["a", "b"] {
        let element = values.append_element().expect("append");
        let payload = PvField::create(&Field::Scalar(ScalarType::String));
        payload.put(text).expect("put");
        element.set_variant(payload).expect("set_variant");
    }

    let texts: Vec<String> = values
        .elements()
        .expect("elements")
        .iter()
        .filter_map(|e| e.union_value())
        .filter_map(|v| v.get())
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    assert_eq!(texts, vec!["a".to_string(), "b".to_string()]);
}

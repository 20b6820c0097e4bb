// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! User-defined types loaded from YAML behave exactly like builtin ones.

#![cfg(feature = "loaders")]

use std::io::Write;

use ntypes::loader::{DescriptorLoader, LoadError};
use ntypes::property::{Alarm, AlarmSeverity, AlarmStatus, PvAlarm};
use ntypes::{DescriptorRegistry, DynamicView, RegistryError};

const TYPES: &str = r#"
types:
  - type_id: "acme/NTPoint:1.0"
    fields:
      - name: value
        constraint: { kind: scalar, scalar_type: double }
      - name: alarm
        constraint: { kind: shape, shape: alarm }
        optional: true
      - name: timeStamp
        constraint: { kind: shape, shape: time_stamp }
        optional: true
  - type_id: "acme/NTTrace:1.0"
    fields:
      - name: x
        constraint: { kind: scalar_array, scalar_type: double }
      - name: y
        constraint: { kind: scalar_array, scalar_type: double }
      - name: points
        constraint: { kind: nested_array, type_id: "acme/NTPoint:1.0" }
    validity:
      - rule: equal_lengths
        fields: [x, y]
"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn load() -> (DescriptorRegistry, tempfile::NamedTempFile) {
    init_logging();
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(TYPES.as_bytes()).unwrap();

    let registry = DescriptorRegistry::with_builtins();
    let registered = DescriptorLoader::load_into(&registry, file.path()).unwrap();
    assert_eq!(registered.len(), 2);
    (registry, file)
}

#[test]
fn test_loaded_type_builds_and_wraps() {
    let (registry, _file) = load();
    let tree = registry
        .create_builder("acme/NTPoint:1.0")
        .unwrap()
        .add_alarm()
        .create_instance()
        .unwrap();

    let view = DynamicView::wrap(&registry, "acme/NTPoint:1.0", &tree).unwrap();
    assert!(view.value().is_some());
    assert!(view.time_stamp().is_none());
    view.value().unwrap().put(2.5f64).unwrap();

    let mut alarm = PvAlarm::new();
    assert!(view.attach_alarm(&mut alarm));
    alarm
        .set(&Alarm::new(AlarmSeverity::Minor, AlarmStatus::Record, "high"))
        .unwrap();
    assert_eq!(alarm.get().unwrap().severity, AlarmSeverity::Minor);
}

#[test]
fn test_loaded_type_nests_and_validates() {
    let (registry, _file) = load();
    let view = registry
        .create_builder("acme/NTTrace:1.0")
        .unwrap()
        .create_view()
        .unwrap();
    assert!(view.report().is_conformant());

    view.sub_field("x").unwrap().put_array([1.0f64, 2.0]).unwrap();
    assert!(!view.is_valid());
    view.sub_field("y").unwrap().put_array([3.0f64, 4.0]).unwrap();
    assert!(view.is_valid());

    let classified = DynamicView::classify(&registry, view.root()).unwrap();
    assert_eq!(classified.type_id(), "acme/NTTrace:1.0");
}

#[test]
fn test_minor_version_lookup() {
    let (registry, _file) = load();
    let tree = registry
        .create_builder("acme/NTPoint:1.0")
        .unwrap()
        .create_instance()
        .unwrap();
    assert!(DynamicView::wrap(&registry, "acme/NTPoint:1.7", &tree).is_ok());
    assert!(DynamicView::wrap(&registry, "acme/NTPoint:2.0", &tree).is_err());
}

#[test]
fn test_loading_twice_is_rejected() {
    let (registry, file) = load();
    let err = DescriptorLoader::load_into(&registry, file.path()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Registry(RegistryError::DuplicateType(_))
    ));
}

#[test]
fn test_builtin_registry_is_read_only() {
    init_logging();
    let document = DescriptorLoader::parse_yaml(TYPES).unwrap();
    let err = DescriptorLoader::register_all(DescriptorRegistry::builtin(), document).unwrap_err();
    assert!(matches!(err, LoadError::Registry(RegistryError::ReadOnly)));
}

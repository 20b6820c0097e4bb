// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Views over conforming data trees.
//!
//! A view holds handles into a tree (never copies) resolved once when it is
//! created: the tree itself, `value`, `descriptor` and each well-known
//! optional sub-field that was present. Accessors for absent sub-fields return
//! `None`, and attaching an adapter to one returns `false`.
//!
//! - [`TypedView<T>`] covers the builtin types. Capability accessors
//!   (`alarm()`, `display()`, ...) only exist for types declaring the field.
//! - [`DynamicView`] covers any registry descriptor, including user-defined
//!   ones, and exposes every capability accessor.

mod dynamic;
mod typed;

pub use dynamic::DynamicView;
pub use typed::{
    HasAlarm, HasControl, HasDisplay, HasTimeStamp, Normative, NtAggregate, NtAttribute,
    NtContinuum, NtEnum, NtHistogram, NtMatrix, NtMultiChannel, NtNameValue, NtNdArray,
    NtNdArrayAttribute, NtScalar, NtScalarArray, NtScalarMultiChannel, NtTable, NtUnion,
    NtUnionArray, NtUri, TypedBuilder, TypedView, NTAggregate, NTAttribute, NTContinuum, NTEnum,
    NTHistogram, NTMatrix, NTMultiChannel, NTNDArray, NTNDArrayAttribute, NTNameValue,
    NTScalar, NTScalarArray, NTScalarMultiChannel, NTTable, NTUnion, NTUnionArray, NTURI,
};

use crate::conformance;
use crate::descriptor::{SchemaDescriptor, DESCRIPTOR_FIELD};
use crate::pvdata::PvField;
use std::sync::Arc;

/// Handles cached at view creation.
#[derive(Debug, Clone)]
pub(crate) struct ViewCore {
    schema: Arc<SchemaDescriptor>,
    root: PvField,
    value: Option<PvField>,
    descriptor: Option<PvField>,
    alarm: Option<PvField>,
    time_stamp: Option<PvField>,
    display: Option<PvField>,
    control: Option<PvField>,
}

impl ViewCore {
    pub(crate) fn new(schema: Arc<SchemaDescriptor>, root: PvField) -> Self {
        Self {
            value: root.get_sub_field("value"),
            descriptor: root.get_sub_field(DESCRIPTOR_FIELD),
            alarm: root.get_sub_field("alarm"),
            time_stamp: root.get_sub_field("timeStamp"),
            display: root.get_sub_field("display"),
            control: root.get_sub_field("control"),
            schema,
            root,
        }
    }

    fn description(&self) -> Option<String> {
        self.descriptor
            .as_ref()?
            .get()?
            .as_str()
            .map(str::to_string)
    }

    fn is_valid(&self) -> bool {
        conformance::is_valid(&self.root, &self.schema)
    }
}

/// Attach `adapter` to a cached sub-field, failing when it is absent.
macro_rules! attach_to {
    ($slot:expr, $adapter:expr) => {
        match $slot {
            Some(field) => $adapter.attach(field),
            None => false,
        }
    };
}
pub(crate) use attach_to;

/// Accessors shared by every view type.
macro_rules! view_accessors {
    () => {
        /// The viewed tree.
        pub fn root(&self) -> &$crate::pvdata::PvField {
            &self.core.root
        }

        /// Type id of the descriptor this view was created for.
        pub fn type_id(&self) -> &str {
            &self.core.schema.type_id
        }

        pub fn schema(&self) -> &std::sync::Arc<$crate::descriptor::SchemaDescriptor> {
            &self.core.schema
        }

        /// The `value` field, if the type has one.
        pub fn value(&self) -> Option<&$crate::pvdata::PvField> {
            self.core.value.as_ref()
        }

        /// The `descriptor` field, if present.
        pub fn descriptor(&self) -> Option<&$crate::pvdata::PvField> {
            self.core.descriptor.as_ref()
        }

        /// Contents of the `descriptor` field, if present.
        pub fn description(&self) -> Option<String> {
            self.core.description()
        }

        /// Any sub-field by dotted path.
        pub fn sub_field(&self, path: &str) -> Option<$crate::pvdata::PvField> {
            self.core.root.get_sub_field(path)
        }

        /// Data-level validity; never implied by conformance.
        pub fn is_valid(&self) -> bool {
            self.core.is_valid()
        }
    };
}
pub(crate) use view_accessors;

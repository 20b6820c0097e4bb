// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Statically typed views over the builtin Normative Types.

use super::{attach_to, view_accessors, ViewCore};
use crate::builder::{ConfigurationError, SchemaBuilder};
use crate::conformance::{self, ConformanceChecker, ConformanceError, ConformanceReport};
use crate::descriptor::{BuiltinType, SchemaDescriptor};
use crate::property::{PvAlarm, PvControl, PvDisplay, PvEnumerated, PvTimeStamp};
use crate::pvdata::{Field, PvField, ScalarType, Structure, Union};
use crate::registry::DescriptorRegistry;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A builtin Normative Type, identified by a zero-sized marker.
pub trait Normative: Send + Sync + 'static {
    const BUILTIN: BuiltinType;

    fn descriptor() -> &'static Arc<SchemaDescriptor> {
        Self::BUILTIN.descriptor()
    }
}

/// Types declaring an optional `alarm` field.
pub trait HasAlarm: Normative {}
/// Types declaring an optional `timeStamp` field.
pub trait HasTimeStamp: Normative {}
/// Types declaring an optional `display` field.
pub trait HasDisplay: Normative {}
/// Types declaring an optional `control` field.
pub trait HasControl: Normative {}

macro_rules! normative {
    ($(#[$doc:meta])* $marker:ident => $alias:ident, $builtin:ident $(, $cap:ident)*) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $marker;

        impl Normative for $marker {
            const BUILTIN: BuiltinType = BuiltinType::$builtin;
        }

        $(impl $cap for $marker {})*

        $(#[$doc])*
        #[allow(clippy::upper_case_acronyms)]
        pub type $alias = TypedView<$marker>;
    };
}

normative!(
    /// A single scalar value with optional metadata.
    NtScalar => NTScalar, NtScalar, HasAlarm, HasTimeStamp, HasDisplay, HasControl
);
normative!(
    /// An array of scalars with optional metadata.
    NtScalarArray => NTScalarArray, NtScalarArray, HasAlarm, HasTimeStamp, HasDisplay, HasControl
);
normative!(
    /// An enumerated value: index plus choices.
    NtEnum => NTEnum, NtEnum, HasAlarm, HasTimeStamp
);
normative!(
    /// A matrix of doubles with optional dimensions.
    NtMatrix => NTMatrix, NtMatrix, HasAlarm, HasTimeStamp, HasDisplay
);
normative!(
    /// A URI: scheme, authority, path and query.
    NtUri => NTURI, NtUri
);
normative!(NtNameValue => NTNameValue, NtNameValue, HasAlarm, HasTimeStamp);
normative!(
    /// A table of named, equally sized columns.
    NtTable => NTTable, NtTable, HasAlarm, HasTimeStamp
);
normative!(NtAttribute => NTAttribute, NtAttribute, HasAlarm, HasTimeStamp);
normative!(NtNdArrayAttribute => NTNDArrayAttribute, NtNdArrayAttribute, HasAlarm, HasTimeStamp);
normative!(NtMultiChannel => NTMultiChannel, NtMultiChannel, HasAlarm, HasTimeStamp);
normative!(
    NtScalarMultiChannel => NTScalarMultiChannel, NtScalarMultiChannel, HasAlarm, HasTimeStamp
);
normative!(
    /// An N-dimensional array with codec, dimensions and attributes.
    NtNdArray => NTNDArray, NtNdArray, HasAlarm, HasTimeStamp, HasDisplay
);
normative!(NtHistogram => NTHistogram, NtHistogram, HasAlarm, HasTimeStamp);
normative!(NtAggregate => NTAggregate, NtAggregate, HasAlarm, HasTimeStamp);
normative!(NtContinuum => NTContinuum, NtContinuum, HasAlarm, HasTimeStamp);
normative!(NtUnion => NTUnion, NtUnion, HasAlarm, HasTimeStamp);
normative!(NtUnionArray => NTUnionArray, NtUnionArray, HasAlarm, HasTimeStamp);

// ---------------------------------------------------------------------------
// TypedView
// ---------------------------------------------------------------------------

/// View over a tree conforming to the builtin type `T`.
pub struct TypedView<T: Normative> {
    core: ViewCore,
    _marker: PhantomData<T>,
}

impl<T: Normative> TypedView<T> {
    /// True if `tag` names this type (minor version ignored).
    pub fn is_a(tag: &str) -> bool {
        conformance::is_compatible_id(tag, T::BUILTIN.type_id())
    }

    /// Structural conformance of a data tree.
    pub fn is_compatible(tree: &PvField) -> bool {
        ConformanceChecker::builtin().is_structurally_compatible(tree, T::descriptor())
    }

    /// Structural conformance of an introspection structure.
    pub fn is_compatible_structure(structure: &Structure) -> bool {
        Self::check_structure(structure).is_conformant()
    }

    /// Per-field conformance report for a structure.
    pub fn check_structure(structure: &Structure) -> ConformanceReport {
        ConformanceChecker::builtin().check(T::descriptor(), structure)
    }

    /// View a tree after checking conformance.
    pub fn wrap(tree: &PvField) -> Result<Self, ConformanceError> {
        ConformanceChecker::builtin()
            .check_field(T::descriptor(), tree.field())
            .into_result()?;
        Ok(Self::wrap_unsafe(tree))
    }

    /// View a tree without checking conformance.
    ///
    /// Accessors still return `None` for fields the tree lacks, but a
    /// malformed sub-field will be handed out as is.
    pub fn wrap_unsafe(tree: &PvField) -> Self {
        Self {
            core: ViewCore::new(T::descriptor().clone(), tree.clone()),
            _marker: PhantomData,
        }
    }

    pub fn create_builder() -> TypedBuilder<T> {
        TypedBuilder {
            inner: SchemaBuilder::new(DescriptorRegistry::builtin(), T::descriptor().clone()),
            _marker: PhantomData,
        }
    }

    view_accessors!();
}

impl<T: HasAlarm> TypedView<T> {
    pub fn alarm(&self) -> Option<&PvField> {
        self.core.alarm.as_ref()
    }

    /// Bind `adapter` to the alarm field; false if the tree has none.
    pub fn attach_alarm(&self, adapter: &mut PvAlarm) -> bool {
        attach_to!(&self.core.alarm, adapter)
    }
}

impl<T: HasTimeStamp> TypedView<T> {
    pub fn time_stamp(&self) -> Option<&PvField> {
        self.core.time_stamp.as_ref()
    }

    pub fn attach_time_stamp(&self, adapter: &mut PvTimeStamp) -> bool {
        attach_to!(&self.core.time_stamp, adapter)
    }
}

impl<T: HasDisplay> TypedView<T> {
    pub fn display(&self) -> Option<&PvField> {
        self.core.display.as_ref()
    }

    pub fn attach_display(&self, adapter: &mut PvDisplay) -> bool {
        attach_to!(&self.core.display, adapter)
    }
}

impl<T: HasControl> TypedView<T> {
    pub fn control(&self) -> Option<&PvField> {
        self.core.control.as_ref()
    }

    pub fn attach_control(&self, adapter: &mut PvControl) -> bool {
        attach_to!(&self.core.control, adapter)
    }
}

impl TypedView<NtEnum> {
    /// Bind `adapter` to the enumerated value.
    pub fn attach_value(&self, adapter: &mut PvEnumerated) -> bool {
        attach_to!(&self.core.value, adapter)
    }
}

impl TypedView<NtTable> {
    /// Column names, in order.
    pub fn column_names(&self) -> Vec<String> {
        self.core
            .value
            .as_ref()
            .map(|value| value.fields().map(|(name, _)| name.to_string()).collect())
            .unwrap_or_default()
    }

    pub fn column(&self, name: &str) -> Option<PvField> {
        self.core.value.as_ref()?.get_sub_field(name)
    }
}

impl<T: Normative> Clone for TypedView<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Normative> fmt::Debug for TypedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedView")
            .field("type_id", &T::BUILTIN.type_id())
            .field("root", &self.core.root)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TypedBuilder
// ---------------------------------------------------------------------------

/// [`SchemaBuilder`] for a builtin type that hands out typed views.
pub struct TypedBuilder<T: Normative> {
    inner: SchemaBuilder<'static>,
    _marker: PhantomData<T>,
}

/// Forward chainable setters to the inner builder.
macro_rules! forward {
    ($($name:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            pub fn $name(&mut self, $($arg: $ty),*) -> &mut Self {
                self.inner.$name($($arg),*);
                self
            }
        )*
    };
}

impl<T: Normative> TypedBuilder<T> {
    forward! {
        value(scalar_type: ScalarType);
        value_union(union: Arc<Union>);
        add_column(name: &str, scalar_type: ScalarType);
        add_query_field(name: &str, scalar_type: ScalarType);
        add_descriptor();
        add_alarm();
        add_time_stamp();
        add_display();
        add_control();
        add_optional(name: &str);
        add(name: &str, field: Field);
    }

    pub fn create_structure(&mut self) -> Result<Arc<Structure>, ConfigurationError> {
        self.inner.create_structure()
    }

    pub fn create_instance(&mut self) -> Result<PvField, ConfigurationError> {
        self.inner.create_instance()
    }

    /// Build an instance and view it.
    pub fn create_view(&mut self) -> Result<TypedView<T>, ConfigurationError> {
        let tree = self.inner.create_instance()?;
        Ok(TypedView::wrap_unsafe(&tree))
    }

    pub fn into_inner(self) -> SchemaBuilder<'static> {
        self.inner
    }
}

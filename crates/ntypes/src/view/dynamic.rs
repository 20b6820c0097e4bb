// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{attach_to, view_accessors, ViewCore};
use crate::conformance::{ConformanceChecker, ConformanceError, ConformanceReport};
use crate::descriptor::SchemaDescriptor;
use crate::property::{PvAlarm, PvControl, PvDisplay, PvTimeStamp};
use crate::pvdata::PvField;
use crate::registry::DescriptorRegistry;
use std::sync::Arc;

/// View over a tree conforming to any registered descriptor.
///
/// Every capability accessor is available; those naming a field the tree
/// does not have return `None` / `false`.
#[derive(Clone)]
pub struct DynamicView<'r> {
    registry: &'r DescriptorRegistry,
    core: ViewCore,
}

impl<'r> DynamicView<'r> {
    /// View `tree` as the registered type `type_id`, checking conformance.
    pub fn wrap(
        registry: &'r DescriptorRegistry,
        type_id: &str,
        tree: &PvField,
    ) -> Result<Self, ConformanceError> {
        let descriptor = registry
            .get(type_id)
            .ok_or_else(|| ConformanceError::UnknownType(type_id.to_string()))?;
        Self::wrap_descriptor(registry, descriptor, tree)
    }

    pub fn wrap_descriptor(
        registry: &'r DescriptorRegistry,
        descriptor: Arc<SchemaDescriptor>,
        tree: &PvField,
    ) -> Result<Self, ConformanceError> {
        ConformanceChecker::new(registry)
            .check_field(&descriptor, tree.field())
            .into_result()?;
        Ok(Self::from_parts(registry, descriptor, tree.clone()))
    }

    /// View `tree` without checking conformance.
    pub fn wrap_unsafe(
        registry: &'r DescriptorRegistry,
        descriptor: Arc<SchemaDescriptor>,
        tree: &PvField,
    ) -> Self {
        Self::from_parts(registry, descriptor, tree.clone())
    }

    /// View `tree` as whatever registered type its type tag names.
    pub fn classify(registry: &'r DescriptorRegistry, tree: &PvField) -> Option<Self> {
        let descriptor = registry.classify(tree)?;
        Some(Self::from_parts(registry, descriptor, tree.clone()))
    }

    pub(crate) fn from_parts(
        registry: &'r DescriptorRegistry,
        descriptor: Arc<SchemaDescriptor>,
        tree: PvField,
    ) -> Self {
        Self {
            registry,
            core: ViewCore::new(descriptor, tree),
        }
    }

    /// Re-run the conformance check against the current tree.
    pub fn report(&self) -> ConformanceReport {
        ConformanceChecker::new(self.registry).check_field(&self.core.schema, self.core.root.field())
    }

    view_accessors!();

    pub fn alarm(&self) -> Option<&PvField> {
        self.core.alarm.as_ref()
    }

    pub fn time_stamp(&self) -> Option<&PvField> {
        self.core.time_stamp.as_ref()
    }

    pub fn display(&self) -> Option<&PvField> {
        self.core.display.as_ref()
    }

    pub fn control(&self) -> Option<&PvField> {
        self.core.control.as_ref()
    }

    pub fn attach_alarm(&self, adapter: &mut PvAlarm) -> bool {
        attach_to!(&self.core.alarm, adapter)
    }

    pub fn attach_time_stamp(&self, adapter: &mut PvTimeStamp) -> bool {
        attach_to!(&self.core.time_stamp, adapter)
    }

    pub fn attach_display(&self, adapter: &mut PvDisplay) -> bool {
        attach_to!(&self.core.display, adapter)
    }

    pub fn attach_control(&self, adapter: &mut PvControl) -> bool {
        attach_to!(&self.core.control, adapter)
    }
}

impl std::fmt::Debug for DynamicView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicView")
            .field("type_id", &self.core.schema.type_id)
            .field("root", &self.core.root)
            .finish()
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{Binding, PropertyError};
use crate::pvdata::{PvField, ScalarValue};
use crate::shapes::Shape;

/// Display limits and formatting hints of a value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Display {
    pub limit_low: f64,
    pub limit_high: f64,
    pub description: String,
    pub format: String,
    pub units: String,
}

/// Adapter reading and writing a `display_t` sub-field.
#[derive(Debug, Clone, Default)]
pub struct PvDisplay {
    binding: Binding,
}

impl PvDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, field: &PvField) -> bool {
        self.binding.attach(Shape::Display, field)
    }

    pub fn detach(&mut self) {
        self.binding.detach();
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_attached()
    }

    pub fn get(&self) -> Result<Display, PropertyError> {
        let string = |v: &ScalarValue| v.as_str().map(str::to_string);
        Ok(Display {
            limit_low: self.binding.read("limitLow", ScalarValue::as_f64)?,
            limit_high: self.binding.read("limitHigh", ScalarValue::as_f64)?,
            description: self.binding.read("description", string)?,
            format: self.binding.read("format", string)?,
            units: self.binding.read("units", string)?,
        })
    }

    pub fn set(&self, display: &Display) -> Result<(), PropertyError> {
        self.binding.write("limitLow", display.limit_low)?;
        self.binding.write("limitHigh", display.limit_high)?;
        self.binding.write("description", display.description.as_str())?;
        self.binding.write("format", display.format.as_str())?;
        self.binding.write("units", display.units.as_str())
    }
}

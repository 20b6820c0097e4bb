// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{Binding, PropertyError};
use crate::pvdata::{PvField, ScalarValue};
use crate::shapes::Shape;

/// Control limits of a settable value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Control {
    pub limit_low: f64,
    pub limit_high: f64,
    pub min_step: f64,
}

impl Control {
    /// Clamp `value` into `[limit_low, limit_high]` when the limits are ordered.
    pub fn clamp(&self, value: f64) -> f64 {
        if self.limit_low < self.limit_high {
            value.clamp(self.limit_low, self.limit_high)
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PvControl {
    binding: Binding,
}

impl PvControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, field: &PvField) -> bool {
        self.binding.attach(Shape::Control, field)
    }

    pub fn detach(&mut self) {
        self.binding.detach();
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_attached()
    }

    pub fn get(&self) -> Result<Control, PropertyError> {
        Ok(Control {
            limit_low: self.binding.read("limitLow", ScalarValue::as_f64)?,
            limit_high: self.binding.read("limitHigh", ScalarValue::as_f64)?,
            min_step: self.binding.read("minStep", ScalarValue::as_f64)?,
        })
    }

    pub fn set(&self, control: &Control) -> Result<(), PropertyError> {
        self.binding.write("limitLow", control.limit_low)?;
        self.binding.write("limitHigh", control.limit_high)?;
        self.binding.write("minStep", control.min_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    #[test]
    fn test_control_round_trip() {
        let field = PvField::create(&shapes::create_control());
        let mut adapter = PvControl::new();
        assert!(adapter.attach(&field));
        let control = Control {
            limit_low: 0.0,
            limit_high: 5.0,
            min_step: 0.1,
        };
        adapter.set(&control).unwrap();
        assert_eq!(adapter.get().unwrap(), control);
        assert_eq!(control.clamp(7.0), 5.0);
        assert_eq!(Control::default().clamp(7.0), 7.0);
    }
}

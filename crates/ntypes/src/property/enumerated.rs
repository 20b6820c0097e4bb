// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enumerated property: an index into a list of choices.

use super::{Binding, PropertyError};
use crate::pvdata::{PvField, ScalarValue};
use crate::shapes::Shape;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Enumerated {
    pub index: i32,
    pub choices: Vec<String>,
}

impl Enumerated {
    pub fn new(index: i32, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            index,
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    /// Selected choice, if the index is in range.
    pub fn choice(&self) -> Option<&str> {
        usize::try_from(self.index)
            .ok()
            .and_then(|i| self.choices.get(i))
            .map(String::as_str)
    }
}

/// Adapter reading and writing an `enum_t` sub-field.
///
/// The index is not range-checked against the choices; [`Enumerated::choice`]
/// returns `None` for an out-of-range index.
#[derive(Debug, Clone, Default)]
pub struct PvEnumerated {
    binding: Binding,
}

impl PvEnumerated {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, field: &PvField) -> bool {
        self.binding.attach(Shape::Enumerated, field)
    }

    pub fn detach(&mut self) {
        self.binding.detach();
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_attached()
    }

    pub fn get(&self) -> Result<Enumerated, PropertyError> {
        let choices = self
            .binding
            .member("choices")?
            .get_array()
            .unwrap_or_default()
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        Ok(Enumerated {
            index: self.binding.read("index", ScalarValue::as_i32)?,
            choices,
        })
    }

    pub fn set(&self, enumerated: &Enumerated) -> Result<(), PropertyError> {
        self.set_index(enumerated.index)?;
        self.set_choices(&enumerated.choices)
    }

    pub fn set_index(&self, index: i32) -> Result<(), PropertyError> {
        self.binding.write("index", index)
    }

    pub fn set_choices(&self, choices: &[String]) -> Result<(), PropertyError> {
        self.binding
            .member("choices")?
            .put_array(choices.iter().map(String::as_str))?;
        Ok(())
    }

    pub fn choice(&self) -> Result<Option<String>, PropertyError> {
        Ok(self.get()?.choice().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    #[test]
    fn test_enumerated_round_trip() {
        let field = PvField::create(&shapes::create_enumerated());
        let mut adapter = PvEnumerated::new();
        assert!(adapter.attach(&field));

        let state = Enumerated::new(1, ["OFF", "ON", "FAULT"]);
        adapter.set(&state).unwrap();
        assert_eq!(adapter.get().unwrap(), state);
        assert_eq!(adapter.choice().unwrap().as_deref(), Some("ON"));

        adapter.set_index(5).unwrap();
        assert_eq!(adapter.choice().unwrap(), None);
    }

    #[test]
    fn test_negative_index_has_no_choice() {
        assert_eq!(Enumerated::new(-1, ["A"]).choice(), None);
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structured value store.
//!
//! A tree of named, typed field nodes: the substrate every Normative Type is
//! expressed in. The Normative Type engine only relies on a small surface of
//! this module (path lookup, introspection, zero-valued instantiation); the
//! adapters additionally read and write leaf values.
//!
//! # Features
//!
//! - **Introspection**: [`Field`], [`Structure`] and [`Union`] describe shape and type tags
//! - **Data trees**: [`PvField`] handles share nodes, so sub-field lookups are references
//! - **Builder API**: [`FieldBuilder`] for assembling structures and restricted unions
//!
//! # Example
//!
//! ```rust
//! use ntypes::pvdata::{FieldBuilder, PvField, ScalarType};
//!
//! let structure = FieldBuilder::new()
//!     .id("reading_t")
//!     .add("value", ScalarType::Double)
//!     .add_array("history", ScalarType::Double)
//!     .create_structure();
//!
//! let reading = PvField::new_structure(&structure);
//! let value = reading.get_sub_field("value").unwrap();
//! value.put(23.5f64).unwrap();
//!
//! assert_eq!(reading.get_sub_field("value").unwrap().get().unwrap().as_f64(), Some(23.5));
//! ```

mod introspection;
mod tree;
mod value;

pub use introspection::{
    Field, FieldBuilder, Member, ScalarType, Structure, Union, DEFAULT_STRUCTURE_ID,
    DEFAULT_UNION_ID, VARIANT_UNION_ID,
};
pub use tree::{create_tree, PvField, TreeError};
pub use value::ScalarValue;

#[cfg(test)]
mod tests;

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # ntypes - Normative Types
//!
//! Named, versioned, self-describing record schemas (scalar, table, image,
//! URI, ...) layered over a generic structured-value tree, with one
//! table-driven engine for identifying, checking and building them.
//!
//! ## Quick Start
//!
//! ```rust
//! use ntypes::property::{Alarm, AlarmSeverity, AlarmStatus, PvAlarm};
//! use ntypes::pvdata::ScalarType;
//! use ntypes::view::NTScalar;
//!
//! fn main() -> ntypes::Result<()> {
//!     // Build a zero-valued NTScalar with alarm and timeStamp
//!     let view = NTScalar::create_builder()
//!         .value(ScalarType::Double)
//!         .add_alarm()
//!         .add_time_stamp()
//!         .create_view()?;
//!
//!     view.value().unwrap().put(21.5f64)?;
//!
//!     let mut alarm = PvAlarm::new();
//!     if view.attach_alarm(&mut alarm) {
//!         alarm.set(&Alarm::new(AlarmSeverity::Minor, AlarmStatus::Device, "warm"))?;
//!     }
//!
//!     // Any tree can be checked and viewed
//!     let again = NTScalar::wrap(view.root())?;
//!     assert!(again.time_stamp().is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  TypedView<T> / DynamicView      PvAlarm, PvTimeStamp, ...    |
//! +---------------------------------------------------------------+
//! |  SchemaBuilder                   ConformanceChecker           |
//! +---------------------------------------------------------------+
//! |  SchemaDescriptor table  |  DescriptorRegistry  |  loader     |
//! +---------------------------------------------------------------+
//! |  TypeId                  |  shapes (alarm_t, time_t, ...)     |
//! +---------------------------------------------------------------+
//! |  pvdata: Field / Structure / Union / PvField                  |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`type_id`] - parsing and minor-version compatibility of type ids
//! - [`shapes`] - canonical sub-structures and their predicates
//! - [`descriptor`] - the builtin Normative Type table
//! - [`conformance`] - structural conformance and data-level validity
//! - [`builder`] - schema and instance construction
//! - [`view`] - typed and dynamic views, capability traits
//! - [`property`] - alarm / timeStamp / display / control / enumerated adapters
//! - [`registry`] - builtin and user-defined descriptors
//! - `loader` - YAML / JSON descriptor documents (feature `loaders`)

pub mod builder;
pub mod conformance;
pub mod descriptor;
pub mod error;
#[cfg(feature = "loaders")]
pub mod loader;
pub mod property;
pub mod pvdata;
pub mod registry;
pub mod shapes;
pub mod type_id;
pub mod view;

pub use builder::{ConfigurationError, SchemaBuilder};
pub use conformance::{ConformanceChecker, ConformanceError, ConformanceReport};
pub use descriptor::{BuiltinType, FieldConstraint, FieldDecl, SchemaDescriptor, ValidityRule};
pub use error::{Error, Result};
pub use registry::{DescriptorRegistry, RegistryError};
pub use shapes::Shape;
pub use type_id::TypeId;
pub use view::{DynamicView, Normative, TypedView};

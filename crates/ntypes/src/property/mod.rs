// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property adapters.
//!
//! The well-known sub-structures have plain domain types ([`Alarm`],
//! [`TimeStamp`], ...) and adapters ([`PvAlarm`], [`PvTimeStamp`], ...) that
//! bind to a sub-field of a data tree and read or write it. An adapter only
//! binds to a field matching the canonical shape; binding to anything else
//! fails and leaves the adapter detached.

mod alarm;
mod control;
mod display;
mod enumerated;
mod time_stamp;

pub use alarm::{Alarm, AlarmSeverity, AlarmStatus, PvAlarm};
pub use control::{Control, PvControl};
pub use display::{Display, PvDisplay};
pub use enumerated::{Enumerated, PvEnumerated};
pub use time_stamp::{PvTimeStamp, TimeStamp};

use crate::pvdata::{PvField, ScalarValue, TreeError};
use crate::shapes::Shape;
use thiserror::Error;

/// Errors for property adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("adapter is not attached")]
    NotAttached,
    #[error("invalid {kind} code: {code}")]
    InvalidCode { kind: &'static str, code: i32 },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Bound sub-field of one adapter.
#[derive(Debug, Clone, Default)]
struct Binding {
    field: Option<PvField>,
}

impl Binding {
    fn attach(&mut self, shape: Shape, field: &PvField) -> bool {
        if shape.matches(field.field()) {
            self.field = Some(field.clone());
            true
        } else {
            log::debug!(
                "[property] cannot attach {} adapter to {}",
                shape.tag(),
                field.type_tag()
            );
            false
        }
    }

    fn detach(&mut self) {
        self.field = None;
    }

    fn is_attached(&self) -> bool {
        self.field.is_some()
    }

    fn field(&self) -> Result<&PvField, PropertyError> {
        self.field.as_ref().ok_or(PropertyError::NotAttached)
    }

    fn member(&self, name: &str) -> Result<PvField, PropertyError> {
        self.field()?
            .get_sub_field(name)
            .ok_or_else(|| TreeError::FieldNotFound(name.to_string()).into())
    }

    fn read<T, F>(&self, name: &str, convert: F) -> Result<T, PropertyError>
    where
        F: FnOnce(&ScalarValue) -> Option<T>,
    {
        let member = self.member(name)?;
        let value = member
            .get()
            .ok_or_else(|| TreeError::FieldNotFound(name.to_string()))?;
        convert(&value).ok_or_else(|| {
            TreeError::TypeMismatch {
                expected: name.to_string(),
                got: value.scalar_type().to_string(),
            }
            .into()
        })
    }

    fn write(&self, name: &str, value: impl Into<ScalarValue>) -> Result<(), PropertyError> {
        self.member(name)?.put(value)?;
        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Alarm property: severity, status and message of a value.

use super::{Binding, PropertyError};
use crate::pvdata::{PvField, ScalarValue};
use crate::shapes::Shape;
use std::fmt;

/// Alarm severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(i32)]
pub enum AlarmSeverity {
    #[default]
    NoAlarm = 0,
    Minor = 1,
    Major = 2,
    Invalid = 3,
    Undefined = 4,
}

impl AlarmSeverity {
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoAlarm => "NONE",
            Self::Minor => "MINOR",
            Self::Major => "MAJOR",
            Self::Invalid => "INVALID",
            Self::Undefined => "UNDEFINED",
        }
    }
}

impl TryFrom<i32> for AlarmSeverity {
    type Error = PropertyError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::NoAlarm),
            1 => Ok(Self::Minor),
            2 => Ok(Self::Major),
            3 => Ok(Self::Invalid),
            4 => Ok(Self::Undefined),
            _ => Err(PropertyError::InvalidCode {
                kind: "alarm severity",
                code,
            }),
        }
    }
}

impl fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an alarm originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum AlarmStatus {
    #[default]
    NoStatus = 0,
    Device = 1,
    Driver = 2,
    Record = 3,
    Db = 4,
    Conf = 5,
    Undefined = 6,
    Client = 7,
}

impl AlarmStatus {
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoStatus => "NONE",
            Self::Device => "DEVICE",
            Self::Driver => "DRIVER",
            Self::Record => "RECORD",
            Self::Db => "DB",
            Self::Conf => "CONF",
            Self::Undefined => "UNDEFINED",
            Self::Client => "CLIENT",
        }
    }
}

impl TryFrom<i32> for AlarmStatus {
    type Error = PropertyError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::NoStatus),
            1 => Ok(Self::Device),
            2 => Ok(Self::Driver),
            3 => Ok(Self::Record),
            4 => Ok(Self::Db),
            5 => Ok(Self::Conf),
            6 => Ok(Self::Undefined),
            7 => Ok(Self::Client),
            _ => Err(PropertyError::InvalidCode {
                kind: "alarm status",
                code,
            }),
        }
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Alarm state of a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alarm {
    pub severity: AlarmSeverity,
    pub status: AlarmStatus,
    pub message: String,
}

impl Alarm {
    pub fn new(severity: AlarmSeverity, status: AlarmStatus, message: impl Into<String>) -> Self {
        Self {
            severity,
            status,
            message: message.into(),
        }
    }

    /// True unless the severity is [`AlarmSeverity::NoAlarm`].
    pub fn is_active(&self) -> bool {
        self.severity != AlarmSeverity::NoAlarm
    }
}

/// Adapter reading and writing an `alarm_t` sub-field.
///
/// ```rust
/// use ntypes::property::{Alarm, AlarmSeverity, AlarmStatus, PvAlarm};
/// use ntypes::pvdata::PvField;
/// use ntypes::shapes;
///
/// let field = PvField::create(&shapes::create_alarm());
/// let mut adapter = PvAlarm::new();
/// assert!(adapter.attach(&field));
///
/// let alarm = Alarm::new(AlarmSeverity::Major, AlarmStatus::Device, "overheat");
/// adapter.set(&alarm).unwrap();
/// assert_eq!(adapter.get().unwrap(), alarm);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PvAlarm {
    binding: Binding,
}

impl PvAlarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `field` if it is an alarm structure.
    pub fn attach(&mut self, field: &PvField) -> bool {
        self.binding.attach(Shape::Alarm, field)
    }

    pub fn detach(&mut self) {
        self.binding.detach();
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_attached()
    }

    pub fn get(&self) -> Result<Alarm, PropertyError> {
        Ok(Alarm {
            severity: self.binding.read("severity", ScalarValue::as_i32)?.try_into()?,
            status: self.binding.read("status", ScalarValue::as_i32)?.try_into()?,
            message: self
                .binding
                .read("message", |v| v.as_str().map(str::to_string))?,
        })
    }

    pub fn set(&self, alarm: &Alarm) -> Result<(), PropertyError> {
        self.binding.write("severity", alarm.severity as i32)?;
        self.binding.write("status", alarm.status as i32)?;
        self.binding.write("message", alarm.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pvdata::{Field, ScalarType};
    use crate::shapes;

    #[test]
    fn test_detached_adapter() {
        let adapter = PvAlarm::new();
        assert!(!adapter.is_attached());
        assert_eq!(adapter.get(), Err(PropertyError::NotAttached));
    }

    #[test]
    fn test_refuses_wrong_shape() {
        let mut adapter = PvAlarm::new();
        assert!(!adapter.attach(&PvField::create(&Field::Scalar(ScalarType::String))));
        assert!(!adapter.attach(&PvField::create(&shapes::create_time_stamp())));
        assert!(!adapter.is_attached());
    }

    #[test]
    fn test_writes_are_visible_through_tree() {
        let field = PvField::create(&shapes::create_alarm());
        let mut adapter = PvAlarm::new();
        assert!(adapter.attach(&field));
        adapter
            .set(&Alarm::new(AlarmSeverity::Minor, AlarmStatus::Record, "low"))
            .unwrap();

        let severity = field.get_sub_field("severity").unwrap().get().unwrap();
        assert_eq!(severity.as_i32(), Some(1));
        assert!(adapter.get().unwrap().is_active());

        adapter.detach();
        assert!(!adapter.is_attached());
    }

    #[test]
    fn test_invalid_codes() {
        let field = PvField::create(&shapes::create_alarm());
        field.get_sub_field("severity").unwrap().put(9i32).unwrap();
        let mut adapter = PvAlarm::new();
        adapter.attach(&field);
        assert_eq!(
            adapter.get(),
            Err(PropertyError::InvalidCode {
                kind: "alarm severity",
                code: 9
            })
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(AlarmSeverity::Major > AlarmSeverity::Minor);
        assert_eq!(AlarmSeverity::default(), AlarmSeverity::NoAlarm);
        assert_eq!(AlarmStatus::try_from(7).unwrap(), AlarmStatus::Client);
        assert_eq!(AlarmStatus::Db.to_string(), "DB");
    }
}

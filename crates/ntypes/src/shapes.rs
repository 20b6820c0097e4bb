// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical sub-structure shapes.
//!
//! Well-known sub-structures (alarm, timeStamp, display, ...) are reused by
//! many Normative Types. Each is a fixed [`Template`]: a type tag plus an
//! ordered list of `(name, kind)` pairs. A candidate conforms to a template if
//! it is a structure with that tag whose *first* N members match the template
//! name-for-name and kind-for-kind. Trailing extra members are allowed.
//!
//! | Shape | Tag | Members |
//! |-------|-----|---------|
//! | alarm | `alarm_t` | severity int, status int, message string |
//! | timeStamp | `time_t` | secondsPastEpoch long, nanoseconds int, userTag int |
//! | enumerated | `enum_t` | index int, choices string[] |
//! | display | `display_t` | limitLow, limitHigh double, description, format, units string |
//! | control | `control_t` | limitLow, limitHigh, minStep double |
//! | alarmLimit | `alarmLimit_t` | active boolean, 4 limits double, 4 severities int, hysteresis double |
//!
//! `codec_t` and `dimension_t` (NTNDArray) use the same mechanism but are not
//! part of the canonical set.

use crate::pvdata::{Field, Member, ScalarType, Structure, Union};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Kind of a template member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Scalar(ScalarType),
    ScalarArray(ScalarType),
    VariantUnion,
}

impl MemberKind {
    /// Exact kind match (no scalar widening).
    pub fn matches(self, field: &Field) -> bool {
        match (self, field) {
            (Self::Scalar(expected), Field::Scalar(actual)) => expected == *actual,
            (Self::ScalarArray(expected), Field::ScalarArray(actual)) => expected == *actual,
            (Self::VariantUnion, Field::Union(u)) => u.is_variant(),
            _ => false,
        }
    }

    pub fn create(self) -> Field {
        match self {
            Self::Scalar(t) => Field::Scalar(t),
            Self::ScalarArray(t) => Field::ScalarArray(t),
            Self::VariantUnion => Field::Union(Arc::new(Union::variant())),
        }
    }
}

/// Fixed sub-structure definition.
#[derive(Debug)]
pub struct Template {
    pub tag: &'static str,
    pub members: &'static [(&'static str, MemberKind)],
}

impl Template {
    /// Structure conformance: tag, member count, then positional members.
    pub fn matches(&self, field: &Field) -> bool {
        match field {
            Field::Structure(s) => self.matches_structure(s),
            _ => false,
        }
    }

    pub fn matches_structure(&self, structure: &Structure) -> bool {
        structure.id() == self.tag && self.matches_members(structure.members())
    }

    /// Union conformance: positional members only, the union id is free.
    pub fn matches_union(&self, union: &Union) -> bool {
        !union.is_variant() && self.matches_members(union.members())
    }

    fn matches_members(&self, members: &[Member]) -> bool {
        members.len() >= self.members.len()
            && self
                .members
                .iter()
                .zip(members)
                .all(|((name, kind), member)| member.name == *name && kind.matches(&member.field))
    }

    fn fields(&self) -> Vec<Member> {
        self.members
            .iter()
            .map(|(name, kind)| Member::new(*name, kind.create()))
            .collect()
    }

    /// Freshly built structure with the template's tag and members.
    pub fn create(&self) -> Arc<Structure> {
        Arc::new(Structure::new(self.tag, self.fields()))
    }

    /// Freshly built restricted union with the template's members.
    pub fn create_union(&self) -> Arc<Union> {
        Arc::new(Union::restricted(self.tag, self.fields()))
    }
}

use MemberKind::{Scalar, ScalarArray, VariantUnion};
use ScalarType::{Boolean, Byte, Double, Float, Int, Long, Short};

static ALARM: Template = Template {
    tag: "alarm_t",
    members: &[
        ("severity", Scalar(Int)),
        ("status", Scalar(Int)),
        ("message", Scalar(ScalarType::String)),
    ],
};

static TIME_STAMP: Template = Template {
    tag: "time_t",
    members: &[
        ("secondsPastEpoch", Scalar(Long)),
        ("nanoseconds", Scalar(Int)),
        ("userTag", Scalar(Int)),
    ],
};

static ENUMERATED: Template = Template {
    tag: "enum_t",
    members: &[
        ("index", Scalar(Int)),
        ("choices", ScalarArray(ScalarType::String)),
    ],
};

static DISPLAY: Template = Template {
    tag: "display_t",
    members: &[
        ("limitLow", Scalar(Double)),
        ("limitHigh", Scalar(Double)),
        ("description", Scalar(ScalarType::String)),
        ("format", Scalar(ScalarType::String)),
        ("units", Scalar(ScalarType::String)),
    ],
};

static CONTROL: Template = Template {
    tag: "control_t",
    members: &[
        ("limitLow", Scalar(Double)),
        ("limitHigh", Scalar(Double)),
        ("minStep", Scalar(Double)),
    ],
};

static ALARM_LIMIT: Template = Template {
    tag: "alarmLimit_t",
    members: &[
        ("active", Scalar(Boolean)),
        ("lowAlarmLimit", Scalar(Double)),
        ("lowWarningLimit", Scalar(Double)),
        ("highWarningLimit", Scalar(Double)),
        ("highAlarmLimit", Scalar(Double)),
        ("lowAlarmSeverity", Scalar(Int)),
        ("lowWarningSeverity", Scalar(Int)),
        ("highWarningSeverity", Scalar(Int)),
        ("highAlarmSeverity", Scalar(Int)),
        ("hysteresis", Scalar(Double)),
    ],
};

static CODEC: Template = Template {
    tag: "codec_t",
    members: &[
        ("name", Scalar(ScalarType::String)),
        ("parameters", VariantUnion),
    ],
};

static DIMENSION: Template = Template {
    tag: "dimension_t",
    members: &[
        ("size", Scalar(Int)),
        ("offset", Scalar(Int)),
        ("fullSize", Scalar(Int)),
        ("binning", Scalar(Int)),
        ("reverse", Scalar(Boolean)),
    ],
};

/// Members of the NTNDArray `value` union: one array per element type.
pub static ND_ARRAY_VALUE: Template = Template {
    tag: "union",
    members: &[
        ("booleanValue", ScalarArray(Boolean)),
        ("byteValue", ScalarArray(Byte)),
        ("shortValue", ScalarArray(Short)),
        ("intValue", ScalarArray(Int)),
        ("longValue", ScalarArray(Long)),
        ("floatValue", ScalarArray(Float)),
        ("doubleValue", ScalarArray(Double)),
    ],
};

/// Named sub-structure shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Alarm,
    #[serde(alias = "timeStamp")]
    TimeStamp,
    Enumerated,
    Display,
    Control,
    #[serde(alias = "alarmLimit")]
    AlarmLimit,
    Codec,
    Dimension,
}

impl Shape {
    /// The canonical, cross-type shapes.
    pub const CANONICAL: [Shape; 6] = [
        Self::Alarm,
        Self::TimeStamp,
        Self::Enumerated,
        Self::Display,
        Self::Control,
        Self::AlarmLimit,
    ];

    pub fn template(self) -> &'static Template {
        match self {
            Self::Alarm => &ALARM,
            Self::TimeStamp => &TIME_STAMP,
            Self::Enumerated => &ENUMERATED,
            Self::Display => &DISPLAY,
            Self::Control => &CONTROL,
            Self::AlarmLimit => &ALARM_LIMIT,
            Self::Codec => &CODEC,
            Self::Dimension => &DIMENSION,
        }
    }

    pub fn tag(self) -> &'static str {
        self.template().tag
    }

    pub fn matches(self, field: &Field) -> bool {
        self.template().matches(field)
    }

    pub fn create(self) -> Arc<Structure> {
        self.template().create()
    }
}

pub fn is_alarm(field: &Field) -> bool {
    Shape::Alarm.matches(field)
}

pub fn is_time_stamp(field: &Field) -> bool {
    Shape::TimeStamp.matches(field)
}

pub fn is_enumerated(field: &Field) -> bool {
    Shape::Enumerated.matches(field)
}

pub fn is_display(field: &Field) -> bool {
    Shape::Display.matches(field)
}

pub fn is_control(field: &Field) -> bool {
    Shape::Control.matches(field)
}

pub fn is_alarm_limit(field: &Field) -> bool {
    Shape::AlarmLimit.matches(field)
}

pub fn create_alarm() -> Field {
    Field::Structure(Shape::Alarm.create())
}

pub fn create_time_stamp() -> Field {
    Field::Structure(Shape::TimeStamp.create())
}

pub fn create_enumerated() -> Field {
    Field::Structure(Shape::Enumerated.create())
}

pub fn create_display() -> Field {
    Field::Structure(Shape::Display.create())
}

pub fn create_control() -> Field {
    Field::Structure(Shape::Control.create())
}

pub fn create_alarm_limit() -> Field {
    Field::Structure(Shape::AlarmLimit.create())
}

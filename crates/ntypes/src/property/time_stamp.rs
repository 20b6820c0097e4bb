// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Time stamp property.

use super::{Binding, PropertyError};
use crate::pvdata::{PvField, ScalarValue};
use crate::shapes::Shape;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Seconds and nanoseconds past the POSIX epoch, plus a user tag.
///
/// Constructors normalise so that `0 <= nanoseconds < 1e9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeStamp {
    pub seconds_past_epoch: i64,
    pub nanoseconds: i32,
    pub user_tag: i32,
}

impl TimeStamp {
    /// Seconds saturate at the `i64` range.
    pub fn new(seconds_past_epoch: i64, nanoseconds: i64) -> Self {
        let seconds = seconds_past_epoch.saturating_add(nanoseconds.div_euclid(NANOS_PER_SECOND));
        let nanos = nanoseconds.rem_euclid(NANOS_PER_SECOND);
        Self {
            seconds_past_epoch: seconds,
            nanoseconds: nanos as i32,
            user_tag: 0,
        }
    }

    pub fn with_user_tag(mut self, user_tag: i32) -> Self {
        self.user_tag = user_tag;
        self
    }

    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Seconds past the epoch as a float.
    pub fn as_seconds_f64(&self) -> f64 {
        self.seconds_past_epoch as f64 + f64::from(self.nanoseconds) / 1e9
    }

    /// Signed difference `self - other` in seconds.
    ///
    /// Fields read from a tree are not normalised, so any `i64` / `i32`
    /// combination is accepted.
    pub fn diff(&self, other: &TimeStamp) -> f64 {
        let seconds = i128::from(self.seconds_past_epoch) - i128::from(other.seconds_past_epoch);
        let nanos = i64::from(self.nanoseconds) - i64::from(other.nanoseconds);
        seconds as f64 + nanos as f64 / 1e9
    }

    /// Shift by `seconds`, saturating at the `i64` range.
    pub fn add_seconds(&mut self, seconds: f64) {
        let whole = seconds.trunc() as i64;
        let nanos = ((seconds - seconds.trunc()) * 1e9).round() as i64;
        let user_tag = self.user_tag;
        *self = Self::new(
            self.seconds_past_epoch.saturating_add(whole),
            i64::from(self.nanoseconds) + nanos,
        )
        .with_user_tag(user_tag);
    }
}

impl From<SystemTime> for TimeStamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self::new(after.as_secs() as i64, i64::from(after.subsec_nanos())),
            Err(e) => {
                let before: Duration = e.duration();
                Self::new(-(before.as_secs() as i64), -i64::from(before.subsec_nanos()))
            }
        }
    }
}

/// Adapter reading and writing a `time_t` sub-field.
#[derive(Debug, Clone, Default)]
pub struct PvTimeStamp {
    binding: Binding,
}

impl PvTimeStamp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, field: &PvField) -> bool {
        self.binding.attach(Shape::TimeStamp, field)
    }

    pub fn detach(&mut self) {
        self.binding.detach();
    }

    pub fn is_attached(&self) -> bool {
        self.binding.is_attached()
    }

    pub fn get(&self) -> Result<TimeStamp, PropertyError> {
        Ok(TimeStamp {
            seconds_past_epoch: self.binding.read("secondsPastEpoch", ScalarValue::as_i64)?,
            nanoseconds: self.binding.read("nanoseconds", ScalarValue::as_i32)?,
            user_tag: self.binding.read("userTag", ScalarValue::as_i32)?,
        })
    }

    pub fn set(&self, time_stamp: &TimeStamp) -> Result<(), PropertyError> {
        self.binding
            .write("secondsPastEpoch", time_stamp.seconds_past_epoch)?;
        self.binding.write("nanoseconds", time_stamp.nanoseconds)?;
        self.binding.write("userTag", time_stamp.user_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    #[test]
    fn test_normalisation() {
        let ts = TimeStamp::new(10, 2_500_000_000);
        assert_eq!(ts.seconds_past_epoch, 12);
        assert_eq!(ts.nanoseconds, 500_000_000);

        let ts = TimeStamp::new(10, -1);
        assert_eq!(ts.seconds_past_epoch, 9);
        assert_eq!(ts.nanoseconds, 999_999_999);
    }

    #[test]
    fn test_arithmetic() {
        let mut ts = TimeStamp::new(100, 0).with_user_tag(3);
        ts.add_seconds(1.5);
        assert_eq!(ts, TimeStamp::new(101, 500_000_000).with_user_tag(3));
        assert!((ts.diff(&TimeStamp::new(100, 0)) - 1.5).abs() < 1e-9);
        assert!((ts.as_seconds_f64() - 101.5).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_seconds_do_not_overflow() {
        let field = PvField::create(&shapes::create_time_stamp());
        field
            .get_sub_field("secondsPastEpoch")
            .unwrap()
            .put(i64::MIN)
            .unwrap();
        field
            .get_sub_field("nanoseconds")
            .unwrap()
            .put(i32::MIN)
            .unwrap();
        let mut adapter = PvTimeStamp::new();
        assert!(adapter.attach(&field));
        let low = adapter.get().unwrap();

        let d = low.diff(&TimeStamp::new(1, 0));
        assert!(d < -9.2e18);
        let high = TimeStamp::new(i64::MAX, 0);
        assert!(high.diff(&low) > 1.8e19);
        assert!(low.diff(&high) < -1.8e19);

        let mut ts = high;
        ts.add_seconds(10.5);
        assert_eq!(ts.seconds_past_epoch, i64::MAX);
        let mut ts = low;
        ts.add_seconds(-1e30);
        assert_eq!(ts.seconds_past_epoch, i64::MIN);

        let ts = TimeStamp::new(i64::MAX, 3 * NANOS_PER_SECOND);
        assert_eq!(ts.seconds_past_epoch, i64::MAX);
        let ts = TimeStamp::new(i64::MIN, -NANOS_PER_SECOND - 1);
        assert_eq!(ts.seconds_past_epoch, i64::MIN);
        assert_eq!(ts.nanoseconds, 999_999_999);
    }

    #[test]
    fn test_from_system_time() {
        let t = UNIX_EPOCH + Duration::new(5, 7);
        assert_eq!(TimeStamp::from(t), TimeStamp::new(5, 7));
        assert!(TimeStamp::now().seconds_past_epoch > 0);
    }

    #[test]
    fn test_adapter_round_trip() {
        let field = PvField::create(&shapes::create_time_stamp());
        let mut adapter = PvTimeStamp::new();
        assert!(adapter.attach(&field));
        let ts = TimeStamp::new(1_700_000_000, 42).with_user_tag(7);
        adapter.set(&ts).unwrap();
        assert_eq!(adapter.get().unwrap(), ts);
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::tz::{AmbiguousOffset, TimeZone};
use jiff::{SignedDuration, Span, Unit, Zoned, civil};

use crate::datetime::DateTime;
use crate::duration::Duration;
use crate::error::{Error, Result};
use crate::interval::IntervalSpec;

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

/// What can be added to or subtracted from a [`DateTime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addend {
    /// Calendar components, applied on the wall clock.
    Interval(IntervalSpec),

    /// An exact number of seconds, applied on the absolute timeline.
    Duration(Duration),
}

impl From<IntervalSpec> for Addend {
    fn from(interval: IntervalSpec) -> Self {
        Addend::Interval(interval)
    }
}

impl From<&IntervalSpec> for Addend {
    fn from(interval: &IntervalSpec) -> Self {
        Addend::Interval(*interval)
    }
}

impl From<Duration> for Addend {
    fn from(duration: Duration) -> Self {
        Addend::Duration(duration)
    }
}

impl From<&Duration> for Addend {
    fn from(duration: &Duration) -> Self {
        Addend::Duration(duration.clone())
    }
}

impl DateTime {
    /// Adds an interval or a duration.
    ///
    /// An interval moves the wall clock: `2025-03-30 01:00 Europe/Berlin`
    /// plus `PT3H` is `04:00` local, even though only two hours pass. A
    /// duration moves the instant: plus `10800` seconds is `05:00` local.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is outside the supported range.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, addend: impl Into<Addend>) -> Result<Self> {
        match addend.into() {
            Addend::Interval(interval) => self.apply_interval(&interval, 1),
            Addend::Duration(duration) => self.with_duration(&(&self.to_duration() + &duration)),
        }
    }

    /// Subtracts an interval or a duration, the inverse of [`DateTime::add`].
    ///
    /// # Errors
    ///
    /// Returns an error if the result is outside the supported range.
    #[allow(clippy::should_implement_trait)]
    pub fn sub(&self, addend: impl Into<Addend>) -> Result<Self> {
        match addend.into() {
            Addend::Interval(interval) => self.apply_interval(&interval, -1),
            Addend::Duration(duration) => self.with_duration(&(&self.to_duration() - &duration)),
        }
    }

    /// The calendar interval from `self` to `target`, as read on the wall
    /// clock of `self`'s time zone.
    ///
    /// Components are non-negative; `invert` is set when `target` is
    /// earlier, unless `absolute` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if either wall clock cannot be expressed in UTC.
    pub fn diff(&self, target: &DateTime, absolute: bool) -> Result<IntervalSpec> {
        let target = target.with_time_zone(self.time_zone().clone());
        let from = self.shadow()?;
        let to = target.shadow()?;
        let span = from.until((Unit::Year, &to))?;

        let interval = IntervalSpec::from_span(span);
        Ok(if absolute {
            interval.with_invert(false)
        } else {
            interval
        })
    }

    /// The exact number of seconds from `self` to `target`.
    ///
    /// Negative when `target` is earlier, unless `absolute` is given.
    #[must_use]
    pub fn diff_accurate(&self, target: &DateTime, absolute: bool) -> Duration {
        let start = self.to_duration();
        let end = target.to_duration();
        let elapsed = if absolute && start > end {
            &start - &end
        } else {
            &end - &start
        };
        tracing::debug!(from = %self, to = %target, %elapsed, "accurate diff");
        elapsed
    }

    /// The same wall clock in UTC, where every day lasts 24 hours.
    fn shadow(&self) -> Result<Zoned> {
        Ok(self.datetime().to_zoned(TimeZone::UTC)?)
    }

    /// Applies the components of `interval` on the UTC shadow, months
    /// first, then days, then the exact time part.
    fn apply_interval(&self, interval: &IntervalSpec, sign: i64) -> Result<Self> {
        let sign = if interval.invert() { -sign } else { sign };
        let out_of_range = || Error::OutOfRange(format!("interval {interval}"));

        let months = interval
            .years()
            .checked_mul(12)
            .and_then(|m| m.checked_add(interval.months()))
            .and_then(|m| m.checked_mul(sign))
            .ok_or_else(out_of_range)?;
        let days = interval.days().checked_mul(sign).ok_or_else(out_of_range)?;
        let micros = time_part(interval)
            .and_then(|m| m.checked_mul(sign))
            .ok_or_else(out_of_range)?;

        let mut shadow = self.shadow()?;
        if months != 0 {
            shadow = shadow.checked_add(Span::new().try_months(months)?)?;
        }
        if days != 0 {
            shadow = shadow.checked_add(Span::new().try_days(days)?)?;
        }
        if micros != 0 {
            shadow = shadow.checked_add(SignedDuration::from_micros(micros))?;
        }

        self.with_wall_clock(shadow.datetime())
    }

    /// Attaches `dt` to the time zone of `self`. A wall clock in a gap
    /// moves forward by the gap length, one in a fold takes the earlier
    /// offset.
    fn with_wall_clock(&self, dt: civil::DateTime) -> Result<Self> {
        let ambiguous = self.time_zone().to_ambiguous_zoned(dt);
        match ambiguous.offset() {
            AmbiguousOffset::Gap { before, after } => {
                tracing::debug!(%dt, %before, %after, "wall clock in a gap, moving forward");
            }
            AmbiguousOffset::Fold { before, after } => {
                tracing::debug!(%dt, %before, %after, "wall clock in a fold, taking earlier offset");
            }
            _ => {}
        }
        Ok(Self::from(ambiguous.compatible()?))
    }
}

/// Hours, minutes, seconds and microseconds summed to microseconds.
fn time_part(interval: &IntervalSpec) -> Option<i64> {
    interval
        .hours()
        .checked_mul(MICROS_PER_HOUR)?
        .checked_add(interval.minutes().checked_mul(MICROS_PER_MINUTE)?)?
        .checked_add(interval.seconds().checked_mul(MICROS_PER_SECOND)?)?
        .checked_add(i64::from(interval.microseconds()))
}

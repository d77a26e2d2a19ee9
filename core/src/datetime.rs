// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

mod arithmetic;

pub use crate::datetime::arithmetic::Addend;

use std::fmt;
use std::str::FromStr;

use jiff::civil::{self, Time};
use jiff::fmt::temporal::{Pieces, PiecesOffset};
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};

use crate::duration::Duration;
use crate::error::{Error, Result};

/// A civil timestamp bound to a time zone.
///
/// Wraps a [`jiff::Zoned`] and forwards its accessors, while calendar
/// arithmetic goes through [`DateTime::add`], [`DateTime::sub`] and
/// [`DateTime::diff`], which stay correct across daylight saving
/// transitions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime {
    zoned: Zoned,
}

impl DateTime {
    /// Builds a timestamp from wall-clock fields in the given time zone.
    ///
    /// A wall clock inside a gap is moved forward, one inside a fold takes
    /// the earlier offset.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is out of range.
    #[allow(clippy::too_many_arguments)]
    pub fn from_fields(
        year: i16,
        month: i8,
        day: i8,
        hour: i8,
        minute: i8,
        second: i8,
        microsecond: i32,
        tz: TimeZone,
    ) -> Result<Self> {
        let nanosecond = microsecond
            .checked_mul(1_000)
            .ok_or_else(|| Error::OutOfRange(format!("microsecond {microsecond}")))?;
        let dt = civil::DateTime::new(year, month, day, hour, minute, second, nanosecond)?;
        Ok(Self::from(dt.to_zoned(tz)?))
    }

    /// Parses an ISO 8601 date time in basic or extended format.
    ///
    /// `Z` and numeric offsets give a fixed zone, a bracketed annotation like
    /// `[Europe/Berlin]` gives that zone, and a floating time is placed in
    /// `default_tz`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedDateTimeString`] if the text cannot be
    /// parsed or does not describe a valid instant.
    #[tracing::instrument(level = "debug", skip(default_tz))]
    pub fn parse(text: &str, default_tz: &TimeZone) -> Result<Self> {
        let malformed = |source| Error::MalformedDateTimeString {
            literal: text.to_owned(),
            source,
        };

        let pieces = Pieces::parse(text).map_err(malformed)?;
        if pieces.time_zone_annotation().is_some() {
            return text.parse::<Zoned>().map(Self::from).map_err(malformed);
        }

        let time = pieces.time().unwrap_or_else(Time::midnight);
        let tz = match pieces.offset() {
            None => default_tz.clone(),
            Some(PiecesOffset::Numeric(numeric)) => TimeZone::fixed(numeric.offset()),
            Some(_) => TimeZone::UTC,
        };
        pieces
            .date()
            .to_datetime(time)
            .to_zoned(tz)
            .map(Self::from)
            .map_err(malformed)
    }

    /// Borrows the underlying engine value.
    #[must_use]
    pub fn as_zoned(&self) -> &Zoned {
        &self.zoned
    }

    /// Unwraps the underlying engine value.
    #[must_use]
    pub fn into_zoned(self) -> Zoned {
        self.zoned
    }

    /// The year of the wall clock.
    #[must_use]
    pub fn year(&self) -> i16 {
        self.zoned.year()
    }

    /// The month of the wall clock, `1..=12`.
    #[must_use]
    pub fn month(&self) -> i8 {
        self.zoned.month()
    }

    /// The day of the month.
    #[must_use]
    pub fn day(&self) -> i8 {
        self.zoned.day()
    }

    /// The hour of the wall clock, `0..=23`.
    #[must_use]
    pub fn hour(&self) -> i8 {
        self.zoned.hour()
    }

    /// The minute of the wall clock.
    #[must_use]
    pub fn minute(&self) -> i8 {
        self.zoned.minute()
    }

    /// The second of the wall clock.
    #[must_use]
    pub fn second(&self) -> i8 {
        self.zoned.second()
    }

    /// The fractional second in microseconds, `0..=999_999`.
    #[must_use]
    pub fn microsecond(&self) -> i32 {
        i32::from(self.zoned.millisecond()) * 1_000 + i32::from(self.zoned.microsecond())
    }

    /// The wall-clock fields without a time zone.
    #[must_use]
    pub fn datetime(&self) -> civil::DateTime {
        self.zoned.datetime()
    }

    /// The time zone the wall clock is read in.
    #[must_use]
    pub fn time_zone(&self) -> &TimeZone {
        self.zoned.time_zone()
    }

    /// The same instant seen from another time zone.
    #[must_use]
    pub fn with_time_zone(&self, tz: TimeZone) -> Self {
        Self::from(self.zoned.with_time_zone(tz))
    }

    /// The absolute instant.
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.zoned.timestamp()
    }

    /// Seconds since the Unix epoch, truncated to microseconds.
    #[must_use]
    pub fn to_duration(&self) -> Duration {
        Duration::from_microseconds(self.zoned.timestamp().as_microsecond())
    }

    /// The instant `duration` after the Unix epoch, in this time zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the instant cannot be represented.
    pub fn with_duration(&self, duration: &Duration) -> Result<Self> {
        let out_of_range = || Error::OutOfRange(format!("{duration} seconds since epoch"));
        let micros = duration.as_microseconds().ok_or_else(out_of_range)?;
        let timestamp = Timestamp::from_microsecond(micros).map_err(|_| out_of_range())?;
        Ok(Self::from(timestamp.to_zoned(self.time_zone().clone())))
    }

    /// Formats the wall clock as `Y-m-d H:M:S.ffffff`.
    #[must_use]
    pub fn format_wall_clock(&self) -> String {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second(),
            self.microsecond(),
        )
    }
}

impl From<Zoned> for DateTime {
    fn from(zoned: Zoned) -> Self {
        Self { zoned }
    }
}

impl From<DateTime> for Zoned {
    fn from(dt: DateTime) -> Self {
        dt.zoned
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.zoned, f)
    }
}

impl FromStr for DateTime {
    type Err = Error;

    /// Parses with UTC for floating times.
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, &TimeZone::UTC)
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar-component intervals parsed from ISO 8601 duration strings.

mod relative;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use jiff::Span;
use regex::{Captures, Regex};
use serde::de;

use crate::duration::round_fraction;
use crate::error::{Error, Result};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// An interval of calendar components, like `P1Y2M3DT4H5M6.123456S`.
///
/// Each component carries its own sign. A leading `-` on the whole string
/// sets [`IntervalSpec::invert`] and is not distributed onto the
/// components, so `-P1Y-2M` is inverted with one year and minus two months.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IntervalSpec {
    invert: bool,
    years: i64,
    months: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    microseconds: i32,
}

impl IntervalSpec {
    /// The empty interval, `PT0S`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an ISO 8601 duration string.
    ///
    /// Weeks are folded into days. Both `.` and `,` are accepted as decimal
    /// separator of the seconds, which are rounded to microseconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedIntervalString`] for strings outside the
    /// grammar, including the precedence representation (`P3DP1MP1Y`) whose
    /// evaluation order across month and year boundaries is ambiguous.
    #[tracing::instrument(level = "debug")]
    pub fn parse(text: &str) -> Result<Self> {
        const RE_PRECEDENCE: &str = r"(P[^P]+){2,}";
        const RE_BASIC: &str = r"^-?P(.+[YMWD]|T.+[HMS]|.+[YMWD]T.+[HMS])$";
        const RE_UNITS: &str = concat!(
            r"^(-)?P(?:(-?[0-9]+)Y)?(?:(-?[0-9]+)M)?(?:(-?[0-9]+)W)?(?:(-?[0-9]+)D)?",
            r"(?:T(?:(-?[0-9]+)H)?(?:(-?[0-9]+)M)?(?:(-?[0-9]+)(?:[.,]([0-9]+))?S)?)?$",
        );
        static PRECEDENCE: OnceLock<Regex> = OnceLock::new();
        static BASIC: OnceLock<Regex> = OnceLock::new();
        static UNITS: OnceLock<Regex> = OnceLock::new();

        let precedence = PRECEDENCE.get_or_init(|| Regex::new(RE_PRECEDENCE).unwrap());
        if precedence.is_match(text) {
            return Err(Error::malformed_interval(
                text,
                "precedence representation is not supported",
            ));
        }

        let basic = BASIC.get_or_init(|| Regex::new(RE_BASIC).unwrap());
        if !basic.is_match(text) {
            return Err(Error::malformed_interval(text, "no designated unit found"));
        }

        let units = UNITS.get_or_init(|| Regex::new(RE_UNITS).unwrap());
        let Some(captures) = units.captures(text) else {
            return Err(Error::malformed_interval(text, "unexpected unit or order"));
        };

        let component = |i: usize| -> Result<i64> {
            captures.get(i).map_or(Ok(0), |m| {
                m.as_str()
                    .parse::<i64>()
                    .map_err(|_| Error::malformed_interval(text, "component out of range"))
            })
        };
        let weeks = component(4)?;
        let days = weeks
            .checked_mul(7)
            .and_then(|w| w.checked_add(component(5).ok()?))
            .ok_or_else(|| Error::malformed_interval(text, "component out of range"))?;
        let (seconds, microseconds) = parse_seconds(text, &captures)?;

        Ok(Self {
            invert: captures.get(1).is_some(),
            years: component(2)?,
            months: component(3)?,
            days,
            hours: component(6)?,
            minutes: component(7)?,
            seconds,
            microseconds,
        })
    }

    /// Builds the interval between two points from a span produced by the
    /// calendar engine. Components are made non-negative and the sign of the
    /// span moves into `invert`.
    pub(crate) fn from_span(span: Span) -> Self {
        let microseconds = span.get_milliseconds() * 1_000
            + span.get_microseconds()
            + span.get_nanoseconds() / 1_000;
        let days = i64::from(span.get_days()) + i64::from(span.get_weeks()) * 7;

        Self {
            invert: span.is_negative(),
            years: i64::from(span.get_years()).abs(),
            months: i64::from(span.get_months()).abs(),
            days: days.abs(),
            hours: i64::from(span.get_hours()).abs(),
            minutes: span.get_minutes().abs(),
            seconds: span.get_seconds().abs(),
            microseconds: 0,
        }
        .with_microseconds(microseconds.abs())
    }

    /// Whether the whole interval is negated.
    #[must_use]
    pub fn invert(&self) -> bool {
        self.invert
    }

    /// The years component.
    #[must_use]
    pub fn years(&self) -> i64 {
        self.years
    }

    /// The months component.
    #[must_use]
    pub fn months(&self) -> i64 {
        self.months
    }

    /// The days component, weeks included.
    #[must_use]
    pub fn days(&self) -> i64 {
        self.days
    }

    /// The hours component.
    #[must_use]
    pub fn hours(&self) -> i64 {
        self.hours
    }

    /// The minutes component.
    #[must_use]
    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    /// The whole seconds component.
    #[must_use]
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// The sub-second component in microseconds, within `-999_999..=999_999`.
    #[must_use]
    pub fn microseconds(&self) -> i32 {
        self.microseconds
    }

    /// The sub-second component as a fraction of a second, for example
    /// `0.123456`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        f64::from(self.microseconds) / 1_000_000.0
    }

    /// Whether every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
            && self.microseconds == 0
    }

    /// The same interval pointing the other way.
    #[must_use]
    pub fn negated(&self) -> Self {
        self.with_invert(!self.invert)
    }

    /// Returns a copy with the invert flag set to `invert`.
    #[must_use]
    pub fn with_invert(self, invert: bool) -> Self {
        Self { invert, ..self }
    }

    /// Returns a copy with the years set to `years`.
    #[must_use]
    pub fn with_years(self, years: i64) -> Self {
        Self { years, ..self }
    }

    /// Returns a copy with the months set to `months`.
    #[must_use]
    pub fn with_months(self, months: i64) -> Self {
        Self { months, ..self }
    }

    /// Returns a copy with the days set to `days`.
    #[must_use]
    pub fn with_days(self, days: i64) -> Self {
        Self { days, ..self }
    }

    /// Returns a copy with the hours set to `hours`.
    #[must_use]
    pub fn with_hours(self, hours: i64) -> Self {
        Self { hours, ..self }
    }

    /// Returns a copy with the minutes set to `minutes`.
    #[must_use]
    pub fn with_minutes(self, minutes: i64) -> Self {
        Self { minutes, ..self }
    }

    /// Returns a copy with the seconds set to `seconds`.
    #[must_use]
    pub fn with_seconds(self, seconds: i64) -> Self {
        Self { seconds, ..self }
    }

    /// Returns a copy with the sub-second part set to `microseconds`.
    /// Whole seconds beyond `±999_999` move into the seconds component.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_microseconds(self, microseconds: i64) -> Self {
        let carry = microseconds / MICROS_PER_SECOND;
        // |remainder| < 1_000_000 always fits into an i32.
        let remainder = (microseconds % MICROS_PER_SECOND) as i32;
        Self {
            seconds: self.seconds.saturating_add(carry),
            microseconds: remainder,
            ..self
        }
    }
}

/// Splits the seconds group into whole seconds and microseconds.
///
/// The fraction is negative only when the whole seconds are. `-6.5` gives
/// `-6` and `-0.5`, but `-0.5` gives `0` and `0.5` since `-0` is zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn parse_seconds(text: &str, captures: &Captures<'_>) -> Result<(i64, i32)> {
    let Some(whole) = captures.get(8) else {
        return Ok((0, 0));
    };
    let mut seconds = whole
        .as_str()
        .parse::<i64>()
        .map_err(|_| Error::malformed_interval(text, "component out of range"))?;

    let negative = seconds < 0;
    let digits = captures.get(9).map_or("", |m| m.as_str());
    let (microseconds, carry) = round_fraction(digits);
    if carry {
        let step = if negative { -1 } else { 1 };
        seconds = seconds
            .checked_add(step)
            .ok_or_else(|| Error::malformed_interval(text, "component out of range"))?;
    }

    // microseconds <= 999_999
    let microseconds = microseconds as i32;
    Ok((seconds, if negative { -microseconds } else { microseconds }))
}

impl FromStr for IntervalSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for IntervalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invert {
            f.write_str("-")?;
        }
        f.write_str("P")?;

        for (value, unit) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if value != 0 {
                write!(f, "{value}{unit}")?;
            }
        }

        let has_seconds = self.seconds != 0 || self.microseconds != 0;
        if self.hours != 0 || self.minutes != 0 || has_seconds {
            f.write_str("T")?;
            for (value, unit) in [(self.hours, 'H'), (self.minutes, 'M')] {
                if value != 0 {
                    write!(f, "{value}{unit}")?;
                }
            }

            if has_seconds {
                let total = i128::from(self.seconds) * i128::from(MICROS_PER_SECOND)
                    + i128::from(self.microseconds);
                if total < 0 {
                    f.write_str("-")?;
                }
                let total = total.unsigned_abs();
                let micros_per_second = u128::from(MICROS_PER_SECOND.unsigned_abs());
                write!(f, "{}", total / micros_per_second)?;
                let fraction = total % micros_per_second;
                if fraction != 0 {
                    let fraction = format!("{fraction:06}");
                    write!(f, ".{}", fraction.trim_end_matches('0'))?;
                }
                f.write_str("S")?;
            }
        } else if self.years == 0 && self.months == 0 && self.days == 0 {
            f.write_str("T0S")?;
        }

        Ok(())
    }
}

impl serde::Serialize for IntervalSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for IntervalSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct IntervalVisitor;

        impl de::Visitor<'_> for IntervalVisitor {
            type Value = IntervalSpec;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(r#"an ISO 8601 duration string like "P1DT4H""#)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                IntervalSpec::parse(value).map_err(|e| de::Error::custom(e.to_string()))
            }
        }

        deserializer.deserialize_str(IntervalVisitor)
    }
}

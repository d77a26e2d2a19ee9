// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! ISO 8601 repeating intervals, `R<n>/<start>/<interval>`.

mod period;

pub use crate::recurrence::period::{Period, PeriodEnd, PeriodIter, PeriodOptions};

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use jiff::tz::TimeZone;
use regex::Regex;
use serde::de;

use crate::datetime::DateTime;
use crate::error::{Error, Result};
use crate::interval::IntervalSpec;

/// A start instant repeated `recurrences` times by an interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSpec {
    recurrences: u32,
    start: DateTime,
    interval: IntervalSpec,
}

impl RecurrenceSpec {
    /// Creates a recurrence from its parts.
    #[must_use]
    pub fn new(start: DateTime, interval: IntervalSpec, recurrences: u32) -> Self {
        Self {
            recurrences,
            start,
            interval,
        }
    }

    /// Parses `R<n>/<start>/<interval>`, for example
    /// `R5/20250130T120000Z/-PT4H-5M`. A start without offset or zone is
    /// placed in `default_tz`.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedRecurrenceString`] if there are not exactly three
    ///   segments or the first one is not `R` followed by digits.
    /// - [`Error::MalformedDateTimeString`] if the start cannot be parsed.
    /// - [`Error::MalformedIntervalString`] from parsing the interval.
    #[tracing::instrument(level = "debug", skip(default_tz))]
    pub fn parse(text: &str, default_tz: &TimeZone) -> Result<Self> {
        const RE_COUNT: &str = r"^R([0-9]+)$";
        static COUNT: OnceLock<Regex> = OnceLock::new();

        let Some((count, start, interval)) = split_segments(text) else {
            return Err(Error::malformed_recurrence(
                text,
                "expected R<n>/<start>/<interval>",
            ));
        };

        let re = COUNT.get_or_init(|| Regex::new(RE_COUNT).unwrap());
        let recurrences = re
            .captures(count)
            .ok_or_else(|| Error::malformed_recurrence(text, "expected R followed by digits"))?[1]
            .parse::<u32>()
            .map_err(|_| Error::malformed_recurrence(text, "recurrence count out of range"))?;

        let start = DateTime::parse(start, default_tz)?;
        let interval = IntervalSpec::parse(interval)?;
        Ok(Self::new(start, interval, recurrences))
    }

    /// How many times the interval repeats after the start.
    #[must_use]
    pub fn recurrences(&self) -> u32 {
        self.recurrences
    }

    /// The first instant.
    #[must_use]
    pub fn start(&self) -> &DateTime {
        &self.start
    }

    /// The interval as given, independent of any [`Period`] built from it.
    #[must_use]
    pub fn interval(&self) -> IntervalSpec {
        self.interval
    }

    /// The instants described by this recurrence.
    #[must_use]
    pub fn period(&self, options: PeriodOptions) -> Period {
        Period::new(
            self.start.clone(),
            self.interval,
            PeriodEnd::Recurrences(self.recurrences),
            options,
        )
    }
}

/// Splits on `/` into exactly three segments. Slashes inside the bracketed
/// time zone annotation of the start, as in `[Europe/Berlin]`, do not count.
fn split_segments(text: &str) -> Option<(&str, &str, &str)> {
    let (count, rest) = text.split_once('/')?;
    let (start, interval) = rest.rsplit_once('/')?;
    let head = start.split_once('[').map_or(start, |(head, _)| head);
    let tail = start.rsplit_once(']').map_or(start, |(_, tail)| tail);
    if head.contains('/') || tail.contains('/') {
        return None;
    }
    Some((count, start, interval))
}

impl FromStr for RecurrenceSpec {
    type Err = Error;

    /// Parses with UTC for floating start times.
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, &TimeZone::UTC)
    }
}

impl fmt::Display for RecurrenceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}/{}/{}", self.recurrences, self.start, self.interval)
    }
}

impl serde::Serialize for RecurrenceSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for RecurrenceSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct RecurrenceVisitor;

        impl de::Visitor<'_> for RecurrenceVisitor {
            type Value = RecurrenceSpec;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(r#"a repeating interval like "R5/20250130T120000Z/PT4H""#)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse::<RecurrenceSpec>()
                    .map_err(|e| de::Error::custom(e.to_string()))
            }
        }

        deserializer.deserialize_str(RecurrenceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recurrence() {
        let spec: RecurrenceSpec = "R5/20250130T120000Z/-PT4H-5M".parse().unwrap();
        assert_eq!(spec.recurrences(), 5);
        assert_eq!(spec.start().format_wall_clock(), "2025-01-30 12:00:00.000000");
        let interval = spec.interval();
        assert!(interval.invert());
        assert_eq!(interval.hours(), 4);
        assert_eq!(interval.minutes(), -5);
    }

    #[test]
    fn places_floating_start_in_default_zone() {
        let berlin = TimeZone::get("Europe/Berlin").unwrap();
        let spec = RecurrenceSpec::parse("R0/2025-07-01T08:00:00/P1D", &berlin).unwrap();
        assert_eq!(spec.recurrences(), 0);
        assert_eq!(spec.start().time_zone().iana_name(), Some("Europe/Berlin"));
        assert_eq!(spec.start().hour(), 8);
    }

    #[test]
    fn rejects_malformed_recurrence() {
        let fail_cases = [
            "R5/20250130T120000Z",
            "R5/20250130T120000Z/PT1H/PT1H",
            "5/20250130T120000Z/PT1H",
            "R/20250130T120000Z/PT1H",
            "R-1/20250130T120000Z/PT1H",
            "Rx/20250130T120000Z/PT1H",
            "R99999999999/20250130T120000Z/PT1H",
            "",
        ];
        for src in fail_cases {
            let err = src.parse::<RecurrenceSpec>().unwrap_err();
            assert!(
                matches!(err, Error::MalformedRecurrenceString { ref literal, .. } if literal == src),
                "Parse {src} should fail"
            );
        }
    }

    #[test]
    fn propagates_segment_errors() {
        let err = "R5/20250130T120000Z/P3DP1MP1Y"
            .parse::<RecurrenceSpec>()
            .unwrap_err();
        assert!(
            matches!(err, Error::MalformedIntervalString { ref literal, .. } if literal == "P3DP1MP1Y")
        );

        let err = "R5/not-a-date/PT1H".parse::<RecurrenceSpec>().unwrap_err();
        assert!(matches!(err, Error::MalformedDateTimeString { .. }));
    }

    #[test]
    fn formats_round_trip() {
        let spec: RecurrenceSpec = "R2/2025-01-30T12:00:00Z/PT4H".parse().unwrap();
        let text = spec.to_string();
        assert_eq!(text, "R2/2025-01-30T12:00:00+00:00[UTC]/PT4H");
        assert_eq!(text.parse::<RecurrenceSpec>().unwrap(), spec);

        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(serde_json::from_str::<RecurrenceSpec>(&json).unwrap(), spec);
    }

    #[test]
    fn keeps_zone_annotation_with_slash() {
        let spec: RecurrenceSpec = "R1/2025-07-01T08:00:00+02:00[Europe/Berlin]/P1D"
            .parse()
            .unwrap();
        assert_eq!(spec.start().time_zone().iana_name(), Some("Europe/Berlin"));
        assert_eq!(spec.to_string().parse::<RecurrenceSpec>().unwrap(), spec);

        let err = "R1/2025-07-01T08:00:00[Europe/Berlin]/P1D/P1D"
            .parse::<RecurrenceSpec>()
            .unwrap_err();
        assert!(matches!(err, Error::MalformedRecurrenceString { .. }));
    }
}

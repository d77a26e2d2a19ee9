// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::OnceLock;

use jiff::tz::TimeZone;
use jiff::{Span, Unit};
use regex::Regex;

use crate::datetime::DateTime;
use crate::error::{Error, Result};
use crate::interval::IntervalSpec;

impl IntervalSpec {
    /// Derives an interval from a relative date expression such as
    /// `"+4 hours +1 year +123456 microseconds"` or `"2 weeks ago"`.
    ///
    /// The terms are applied in order to `reference` seen in UTC, and the
    /// result is read back as a component diff, so only plain calendar
    /// components survive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRelativeExpression`] for unknown units or
    /// syntax, and an engine error if the result is out of range.
    #[tracing::instrument(level = "debug", skip(reference))]
    pub fn from_date_string(expr: &str, reference: &DateTime) -> Result<Self> {
        const RE_EXPR: &str = r"^(?:\s*[+-]?[0-9]+\s*[a-z]+)+(?:\s+(ago))?\s*$";
        const RE_TERM: &str = r"([+-]?[0-9]+)\s*([a-z]+)";
        static EXPR: OnceLock<Regex> = OnceLock::new();
        static TERM: OnceLock<Regex> = OnceLock::new();

        let normalized = expr.trim().to_ascii_lowercase();
        if normalized == "now" {
            return Ok(Self::new());
        }

        let re_expr = EXPR.get_or_init(|| Regex::new(RE_EXPR).unwrap());
        let Some(captures) = re_expr.captures(&normalized) else {
            return Err(Error::malformed_relative(expr, "expected terms like '+4 hours'"));
        };
        let ago = captures.get(1).is_some();

        let start = reference.as_zoned().with_time_zone(TimeZone::UTC);
        let mut end = start.clone();
        let re_term = TERM.get_or_init(|| Regex::new(RE_TERM).unwrap());
        for term in re_term.captures_iter(&normalized) {
            let amount = term[1]
                .parse::<i64>()
                .ok()
                .and_then(|n| if ago { n.checked_neg() } else { Some(n) })
                .ok_or_else(|| Error::malformed_relative(expr, "amount out of range"))?;
            let span = unit_span(&term[2], amount)
                .ok_or_else(|| Error::malformed_relative(expr, "unknown unit"))?
                .map_err(|_| Error::malformed_relative(expr, "amount out of range"))?;
            end = end.checked_add(span)?;
        }

        let span = start.until((Unit::Year, &end))?;
        Ok(Self::from_span(span))
    }
}

/// Builds the span for one term, `None` for an unknown unit.
fn unit_span(unit: &str, amount: i64) -> Option<Result<Span, jiff::Error>> {
    let span = Span::new();
    let span = match unit {
        "year" | "years" => span.try_years(amount),
        "month" | "months" => span.try_months(amount),
        "fortnight" | "fortnights" => span.try_weeks(amount).and_then(|s| s.checked_mul(2)),
        "week" | "weeks" => span.try_weeks(amount),
        "day" | "days" => span.try_days(amount),
        "hour" | "hours" => span.try_hours(amount),
        "min" | "mins" | "minute" | "minutes" => span.try_minutes(amount),
        "sec" | "secs" | "second" | "seconds" => span.try_seconds(amount),
        "msec" | "msecs" | "millisecond" | "milliseconds" => span.try_milliseconds(amount),
        "usec" | "usecs" | "microsecond" | "microseconds" => span.try_microseconds(amount),
        _ => return None,
    };
    Some(span)
}

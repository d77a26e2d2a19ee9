// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Time zone and date time factories for integration tests.

use jiff::tz::TimeZone;
use walltime_core::DateTime;

/// Looks up a time zone from the bundled database.
///
/// # Panics
///
/// Panics if the zone is unknown.
#[must_use]
pub fn zone(name: &str) -> TimeZone {
    TimeZone::get(name).unwrap_or_else(|e| panic!("unknown time zone {name}: {e}"))
}

#[must_use]
pub fn berlin() -> TimeZone {
    zone("Europe/Berlin")
}

#[must_use]
pub fn amsterdam() -> TimeZone {
    zone("Europe/Amsterdam")
}

/// Parses a floating date time like `2025-03-30T01:00:00` in `tz`.
///
/// # Panics
///
/// Panics if the text cannot be parsed.
#[must_use]
pub fn local(text: &str, tz: &TimeZone) -> DateTime {
    DateTime::parse(text, tz).unwrap_or_else(|e| panic!("invalid date time {text}: {e}"))
}

/// Parses a floating date time in UTC.
#[must_use]
pub fn utc(text: &str) -> DateTime {
    local(text, &TimeZone::UTC)
}

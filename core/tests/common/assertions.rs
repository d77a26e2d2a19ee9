// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Custom assertion helpers for integration tests.

use jiff::tz::TimeZone;
use walltime_core::DateTime;

/// Asserts the wall clock in the date time's own zone and in UTC, both
/// formatted as `Y-m-d H:M:S.ffffff`.
///
/// # Panics
///
/// Panics if either wall clock differs.
pub fn assert_wall_clock(dt: &DateTime, local: &str, utc: &str, context: &str) {
    assert_eq!(dt.format_wall_clock(), local, "local wall clock, {context}");
    assert_eq!(
        dt.with_time_zone(TimeZone::UTC).format_wall_clock(),
        utc,
        "UTC wall clock, {context}"
    );
}

/// Asserts the local wall clocks of a sequence of date times.
///
/// # Panics
///
/// Panics if the sequences differ.
pub fn assert_wall_clocks<'a>(
    dts: impl IntoIterator<Item = &'a DateTime>,
    expected: &[&str],
) {
    let actual: Vec<String> = dts.into_iter().map(DateTime::format_wall_clock).collect();
    assert_eq!(actual, expected);
}

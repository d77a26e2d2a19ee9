// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::datetime::DateTime;
use crate::error::{Error, Result};
use crate::interval::IntervalSpec;

/// Where a [`Period`] stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodEnd {
    /// Repeat the interval this many times after the start.
    Recurrences(u32),

    /// Stop before this instant.
    Until(DateTime),
}

/// Options of a [`Period`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodOptions {
    /// Leave the start out of the sequence.
    pub exclude_start: bool,

    /// Also produce an instant equal to [`PeriodEnd::Until`].
    pub include_end: bool,
}

/// A sequence of instants, each one interval after the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    start: DateTime,
    interval: IntervalSpec,
    end: PeriodEnd,
    options: PeriodOptions,
}

impl Period {
    /// Creates a period from `start`, stepping by `interval` until `end`.
    #[must_use]
    pub fn new(
        start: DateTime,
        interval: IntervalSpec,
        end: PeriodEnd,
        options: PeriodOptions,
    ) -> Self {
        Self {
            start,
            interval,
            end,
            options,
        }
    }

    /// The first instant, produced unless excluded by the options.
    #[must_use]
    pub fn start(&self) -> &DateTime {
        &self.start
    }

    /// The interval as given, never modified by iteration.
    #[must_use]
    pub fn interval(&self) -> IntervalSpec {
        self.interval
    }

    /// Where the period stops.
    #[must_use]
    pub fn end(&self) -> &PeriodEnd {
        &self.end
    }

    /// The options the period was built with.
    #[must_use]
    pub fn options(&self) -> PeriodOptions {
        self.options
    }

    /// Iterates over the instants without consuming the period.
    #[must_use]
    pub fn iter(&self) -> PeriodIter {
        self.clone().into_iter()
    }
}

impl IntoIterator for Period {
    type Item = Result<DateTime>;
    type IntoIter = PeriodIter;

    fn into_iter(self) -> Self::IntoIter {
        PeriodIter {
            next: Some(self.start),
            index: 0,
            interval: self.interval,
            end: self.end,
            options: self.options,
            error: None,
        }
    }
}

impl IntoIterator for &Period {
    type Item = Result<DateTime>;
    type IntoIter = PeriodIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the instants of a [`Period`].
///
/// Each instant is the previous one plus the interval, so the first step is
/// always `start.add(interval)`. An arithmetic error is yielded once and ends
/// the sequence.
#[derive(Debug)]
pub struct PeriodIter {
    next: Option<DateTime>,
    index: u64,
    interval: IntervalSpec,
    end: PeriodEnd,
    options: PeriodOptions,
    error: Option<Error>,
}

impl PeriodIter {
    fn within_end(&self, current: &DateTime) -> bool {
        match &self.end {
            PeriodEnd::Recurrences(n) => self.index <= u64::from(*n),
            PeriodEnd::Until(end) if self.options.include_end => current <= end,
            PeriodEnd::Until(end) => current < end,
        }
    }
}

impl Iterator for PeriodIter {
    type Item = Result<DateTime>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(err) = self.error.take() {
                return Some(Err(err));
            }

            let current = self.next.take()?;
            if !self.within_end(&current) {
                return None;
            }

            let index = self.index;
            self.index += 1;
            match current.add(self.interval) {
                // Bounded by a count, so any direction terminates.
                Ok(following) if matches!(self.end, PeriodEnd::Recurrences(_)) => {
                    self.next = Some(following);
                }
                Ok(following) if following > current => self.next = Some(following),
                Ok(_) => {
                    tracing::warn!(
                        interval = %self.interval,
                        start = %current,
                        "interval does not move time forward, stopping"
                    );
                }
                Err(err) => self.error = Some(err),
            }

            if index == 0 && self.options.exclude_start {
                continue;
            }
            return Some(Ok(current));
        }
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Civil time arithmetic that stays correct across daylight saving
//! transitions, with exact decimal durations and ISO 8601 intervals and
//! recurrences.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::pedantic
)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

mod config;
mod datetime;
mod duration;
mod error;
mod interval;
mod recurrence;

pub use crate::config::Config;
pub use crate::datetime::{Addend, DateTime};
pub use crate::duration::{Duration, DurationValue};
pub use crate::error::{Error, Result};
pub use crate::interval::IntervalSpec;
pub use crate::recurrence::{Period, PeriodEnd, PeriodIter, PeriodOptions, RecurrenceSpec};

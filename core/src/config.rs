// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::tz::TimeZone;

use crate::error::{Error, Result};

/// Configuration for civil time handling.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    /// IANA name of the time zone used for date times that carry none,
    /// e.g. `Europe/Berlin`. Defaults to the system time zone.
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl Config {
    /// Resolves the configured time zone.
    ///
    /// Without a configured name the system time zone is used, and UTC if
    /// that cannot be determined.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTimeZone`] if the configured name is not
    /// known.
    pub fn time_zone(&self) -> Result<TimeZone> {
        match &self.time_zone {
            Some(name) => TimeZone::get(name).map_err(|source| Error::UnknownTimeZone {
                name: name.clone(),
                source,
            }),
            None => Ok(system_time_zone()),
        }
    }
}

fn system_time_zone() -> TimeZone {
    match iana_time_zone::get_timezone() {
        Ok(tzid) => match TimeZone::get(&tzid) {
            Ok(tz) => tz,
            Err(err) => {
                tracing::warn!(%tzid, %err, "unknown system timezone, using UTC");
                TimeZone::UTC
            }
        },
        Err(err) => {
            tracing::warn!(%err, "failed to get timezone, using UTC");
            TimeZone::UTC
        }
    }
}

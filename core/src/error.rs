// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while constructing or computing civil-time values.
///
/// Every variant is a deterministic function of the input, so none of them
/// is worth retrying.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The value does not match `-?(\d+(\.\d*)?|\.\d+)`.
    #[error("Invalid duration value '{0}'")]
    InvalidDurationValue(String),

    /// The ISO 8601 interval string is not supported.
    #[error("Malformed interval string '{literal}': {reason}")]
    MalformedIntervalString {
        /// The rejected input.
        literal: String,

        /// Why it was rejected.
        reason: &'static str,
    },

    /// The ISO 8601 recurrence string is not `R<n>/<start>/<interval>`.
    #[error("Malformed recurrence string '{literal}': {reason}")]
    MalformedRecurrenceString {
        /// The rejected input.
        literal: String,

        /// Why it was rejected.
        reason: &'static str,
    },

    /// The date time string could not be parsed.
    #[error("Malformed date time string '{literal}': {source}")]
    MalformedDateTimeString {
        /// The rejected input.
        literal: String,

        /// The parser error.
        source: jiff::Error,
    },

    /// The relative date expression could not be evaluated.
    #[error("Malformed relative date expression '{literal}': {reason}")]
    MalformedRelativeExpression {
        /// The rejected input.
        literal: String,

        /// Why it was rejected.
        reason: &'static str,
    },

    /// The time zone name is not known.
    #[error("Unknown time zone '{name}': {source}")]
    UnknownTimeZone {
        /// The requested name.
        name: String,

        /// The lookup error.
        source: jiff::Error,
    },

    /// The value does not fit into the range supported by the calendar.
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Any other error reported by the calendar engine.
    #[error(transparent)]
    Calendar(#[from] jiff::Error),
}

impl Error {
    pub(crate) fn malformed_interval(literal: &str, reason: &'static str) -> Self {
        Self::MalformedIntervalString {
            literal: literal.to_owned(),
            reason,
        }
    }

    pub(crate) fn malformed_recurrence(literal: &str, reason: &'static str) -> Self {
        Self::MalformedRecurrenceString {
            literal: literal.to_owned(),
            reason,
        }
    }

    pub(crate) fn malformed_relative(literal: &str, reason: &'static str) -> Self {
        Self::MalformedRelativeExpression {
            literal: literal.to_owned(),
            reason,
        }
    }
}

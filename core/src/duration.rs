// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Exact fixed-point durations of seconds and microseconds.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;
use std::sync::OnceLock;

use num_bigint::{BigInt, BigUint, Sign};
use regex::Regex;
use serde::de;

use crate::error::{Error, Result};

const MICROS_PER_SECOND: u32 = 1_000_000;
const MAX_MICROSECOND: u32 = 999_999;
const FRACTION_DIGITS: usize = 6;

/// A signed duration with microsecond precision and no upper bound.
///
/// The magnitude is kept as a non-negative number of seconds plus a
/// microsecond fraction; the sign lives only in the inverted flag, and zero
/// is never inverted. All arithmetic is exact decimal arithmetic, floating
/// point is only ever an input format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Duration {
    seconds: BigUint,
    microseconds: u32,
    inverted: bool,
}

/// Any value a [`Duration`] can be built from.
#[derive(Debug, Clone, PartialEq)]
pub enum DurationValue<'a> {
    /// Seconds as a float, rendered to its shortest decimal text first.
    Float(f64),

    /// Whole seconds.
    Integer(i64),

    /// Seconds as decimal text, for example `-123.456789` or `.5`.
    Text(Cow<'a, str>),

    /// An existing duration.
    Exact(Duration),
}

impl Duration {
    /// Creates a duration from seconds given as float, integer, decimal text
    /// or another duration.
    ///
    /// A fraction finer than microseconds is rounded half-up on the seventh
    /// digit only, so `0.12345649` becomes `0.123456`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDurationValue`] if the text does not match
    /// `-?(\d+(\.\d*)?|\.\d+)`.
    pub fn new<'a>(value: impl Into<DurationValue<'a>>) -> Result<Self> {
        match value.into() {
            DurationValue::Float(v) => Self::parse(&v.to_string()),
            DurationValue::Integer(v) => Ok(Self::from_seconds(v)),
            DurationValue::Text(v) => Self::parse(&v),
            DurationValue::Exact(v) => Ok(v),
        }
    }

    /// The zero duration.
    #[must_use]
    pub fn zero() -> Self {
        Self::from_parts(BigUint::default(), 0, false)
    }

    /// Creates a duration of whole seconds.
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        Self::from_parts(BigUint::from(seconds.unsigned_abs()), 0, seconds < 0)
    }

    /// Creates a duration from a signed number of microseconds.
    #[must_use]
    pub fn from_microseconds(microseconds: i64) -> Self {
        Self::from_signed_microseconds(BigInt::from(microseconds))
    }

    /// Returns the signed number of microseconds, if it fits into an `i64`.
    #[must_use]
    pub fn as_microseconds(&self) -> Option<i64> {
        i64::try_from(&self.to_signed_microseconds()).ok()
    }

    /// Returns the seconds and microseconds as text, for example
    /// `-123.456789`. With `absolute` the sign is left out.
    #[must_use]
    pub fn get_time(&self, absolute: bool) -> String {
        let mut time = String::new();
        if self.inverted && !absolute {
            time.push('-');
        }

        time.push_str(&self.seconds.to_string());
        if self.microseconds > 0 {
            let fraction = format!("{:06}", self.microseconds);
            time.push('.');
            time.push_str(fraction.trim_end_matches('0'));
        }
        time
    }

    /// Whether the duration is negative.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Whether the duration is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.microseconds == 0 && self.seconds == BigUint::default()
    }

    /// The whole seconds of the magnitude.
    #[must_use]
    pub fn seconds(&self) -> &BigUint {
        &self.seconds
    }

    /// The microsecond fraction of the magnitude, in `0..=999_999`.
    #[must_use]
    pub fn subsec_microseconds(&self) -> u32 {
        self.microseconds
    }

    /// The duration without its sign.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self::from_parts(self.seconds.clone(), self.microseconds, false)
    }

    /// Adds a duration, or anything [`Duration::new`] accepts, and returns
    /// the sum as a new duration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDurationValue`] if `other` is not a valid
    /// duration value.
    #[allow(clippy::should_implement_trait)]
    pub fn add<'a>(&self, other: impl Into<DurationValue<'a>>) -> Result<Self> {
        let other = Self::new(other)?;
        Ok(self + &other)
    }

    /// Subtracts a duration, or anything [`Duration::new`] accepts, and
    /// returns the difference as a new duration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDurationValue`] if `other` is not a valid
    /// duration value.
    #[allow(clippy::should_implement_trait)]
    pub fn sub<'a>(&self, other: impl Into<DurationValue<'a>>) -> Result<Self> {
        let other = Self::new(other)?;
        Ok(self - &other)
    }

    /// Returns a new duration holding `value`; the receiver is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDurationValue`] if `value` is not a valid
    /// duration value.
    pub fn with_time<'a>(&self, value: impl Into<DurationValue<'a>>) -> Result<Self> {
        Self::new(value)
    }

    fn parse(text: &str) -> Result<Self> {
        const RE: &str = r"^-?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$";
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| Regex::new(RE).unwrap());
        if !re.is_match(text) {
            return Err(Error::InvalidDurationValue(text.to_owned()));
        }

        let (inverted, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let mut seconds = match whole {
            "" => BigUint::default(),
            digits => digits
                .parse::<BigUint>()
                .map_err(|_| Error::InvalidDurationValue(text.to_owned()))?,
        };
        let (microseconds, carry) = round_fraction(fraction);
        if carry {
            seconds += 1u32;
        }

        Ok(Self::from_parts(seconds, microseconds, inverted))
    }

    fn from_parts(seconds: BigUint, microseconds: u32, inverted: bool) -> Self {
        let is_zero = microseconds == 0 && seconds == BigUint::default();
        Self {
            seconds,
            microseconds,
            inverted: inverted && !is_zero,
        }
    }

    fn to_signed_microseconds(&self) -> BigInt {
        let magnitude = &self.seconds * MICROS_PER_SECOND + self.microseconds;
        let sign = if self.inverted { Sign::Minus } else { Sign::Plus };
        BigInt::from_biguint(sign, magnitude)
    }

    fn from_signed_microseconds(value: BigInt) -> Self {
        let (sign, magnitude) = value.into_parts();
        let seconds = &magnitude / MICROS_PER_SECOND;
        let remainder = &magnitude % MICROS_PER_SECOND;
        // The remainder is below one million, so it is a single digit.
        let microseconds = remainder.to_u32_digits().first().copied().unwrap_or(0);
        Self::from_parts(seconds, microseconds, sign == Sign::Minus)
    }
}

/// Turns the digits after a decimal point into microseconds.
///
/// Only the seventh digit decides the rounding; the returned flag reports a
/// carry into the whole seconds. `digits` must be ASCII digits.
pub(crate) fn round_fraction(digits: &str) -> (u32, bool) {
    let bytes = digits.as_bytes();
    let mut microseconds = 0;
    for i in 0..FRACTION_DIGITS {
        let digit = bytes.get(i).map_or(0, |b| u32::from(b.saturating_sub(b'0')));
        microseconds = microseconds * 10 + digit;
    }

    let round_up = bytes.get(FRACTION_DIGITS).is_some_and(|b| *b >= b'5');
    match (round_up, microseconds) {
        (false, _) => (microseconds, false),
        (true, MAX_MICROSECOND) => (0, true),
        (true, _) => (microseconds + 1, false),
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_time(false))
    }
}

impl FromStr for Duration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Duration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_signed_microseconds()
            .cmp(&other.to_signed_microseconds())
    }
}

impl Add<&Duration> for &Duration {
    type Output = Duration;

    fn add(self, rhs: &Duration) -> Duration {
        Duration::from_signed_microseconds(
            self.to_signed_microseconds() + rhs.to_signed_microseconds(),
        )
    }
}

impl Sub<&Duration> for &Duration {
    type Output = Duration;

    fn sub(self, rhs: &Duration) -> Duration {
        Duration::from_signed_microseconds(
            self.to_signed_microseconds() - rhs.to_signed_microseconds(),
        )
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        let inverted = !self.inverted;
        Duration::from_parts(self.seconds, self.microseconds, inverted)
    }
}

impl Neg for &Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        -self.clone()
    }
}

impl From<f64> for DurationValue<'_> {
    fn from(v: f64) -> Self {
        DurationValue::Float(v)
    }
}

impl From<f32> for DurationValue<'_> {
    fn from(v: f32) -> Self {
        // Go through the f32 text so that 0.1f32 stays 0.1.
        DurationValue::Text(Cow::Owned(v.to_string()))
    }
}

impl From<i64> for DurationValue<'_> {
    fn from(v: i64) -> Self {
        DurationValue::Integer(v)
    }
}

impl From<i32> for DurationValue<'_> {
    fn from(v: i32) -> Self {
        DurationValue::Integer(i64::from(v))
    }
}

impl From<u32> for DurationValue<'_> {
    fn from(v: u32) -> Self {
        DurationValue::Integer(i64::from(v))
    }
}

impl<'a> From<&'a str> for DurationValue<'a> {
    fn from(v: &'a str) -> Self {
        DurationValue::Text(Cow::Borrowed(v))
    }
}

impl<'a> From<&'a String> for DurationValue<'a> {
    fn from(v: &'a String) -> Self {
        DurationValue::Text(Cow::Borrowed(v.as_str()))
    }
}

impl From<String> for DurationValue<'_> {
    fn from(v: String) -> Self {
        DurationValue::Text(Cow::Owned(v))
    }
}

impl From<Duration> for DurationValue<'_> {
    fn from(v: Duration) -> Self {
        DurationValue::Exact(v)
    }
}

impl From<&Duration> for DurationValue<'_> {
    fn from(v: &Duration) -> Self {
        DurationValue::Exact(v.clone())
    }
}

impl serde::Serialize for Duration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct DurationVisitor;

        impl de::Visitor<'_> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(r#"seconds as a number or a decimal string like "-123.456789""#)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Duration::new(value).map_err(|e| de::Error::custom(e.to_string()))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Duration::from_seconds(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Duration::from_parts(BigUint::from(value), 0, false))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Duration::new(value).map_err(|e| de::Error::custom(e.to_string()))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_from_values() {
        use DurationValue as V;

        #[rustfmt::skip]
        let cases = [
            (V::from(123.456789),       "123.456789",  false),
            (V::from(-123.0),           "-123",        true),
            (V::from(456),              "456",         false),
            (V::from("-123"),           "-123",        true),
            (V::from("123.123456789"),  "123.123457",  false),
            (V::from("-123.987654321"), "-123.987654", true),
            (V::from("123.9999999"),    "124",         false),
            (V::from("-.12345"),        "-0.12345",    true),
            (V::from("12800"),          "12800",       false),
        ];
        for (value, expected, inverted) in cases {
            let src = format!("{value:?}");
            let duration = Duration::new(value.clone()).unwrap();
            assert_eq!(duration.get_time(false), expected, "Failed for {src}");
            assert_eq!(duration.to_string(), expected, "Failed for {src}");
            assert_eq!(duration.is_inverted(), inverted, "Failed for {src}");

            let replaced = Duration::zero().with_time(value).unwrap();
            assert_eq!(replaced, duration, "Failed for {src}");
        }
    }

    #[test]
    fn rejects_invalid_values() {
        let fail_cases = [
            "1,123456", // comma separator
            "1e5",      // exponent
            "1_000",    // separator
            "",         // empty
            "-",        // sign only
            ".",        // point only
            "+1",       // explicit plus
            " 1",       // whitespace
            "--1",      // double sign
            "١٢٣",      // non-ASCII digits
        ];
        for src in fail_cases {
            let err = Duration::new(src).unwrap_err();
            assert!(
                matches!(err, Error::InvalidDurationValue(ref v) if v == src),
                "Parse {src} should fail"
            );
        }

        assert!(Duration::new(f64::NAN).is_err());
        assert!(Duration::new(f64::INFINITY).is_err());
    }

    #[test]
    fn rounds_on_seventh_digit_only() {
        #[rustfmt::skip]
        let cases = [
            ("0.12345649",  "0.123456"),
            ("0.1234565",   "0.123457"),
            ("0.1234564",   "0.123456"),
            ("0.9999995",   "1"),
            ("-0.0000001",  "0"),
            ("-0.0000005",  "-0.000001"),
            ("1.05",        "1.05"),
            ("1.000001",    "1.000001"),
            ("1.",          "1"),
            ("-0",          "0"),
        ];
        for (src, expected) in cases {
            assert_eq!(Duration::new(src).unwrap().get_time(false), expected, "Failed for {src}");
        }
        assert!(!Duration::new("-0.0000001").unwrap().is_inverted());
    }

    #[test]
    fn renders_absolute_time() {
        let duration = Duration::new("-42.5").unwrap();
        assert_eq!(duration.get_time(true), "42.5");
        assert_eq!(duration.abs().to_string(), "42.5");
    }

    #[test]
    fn adds_exactly() {
        use DurationValue as V;

        #[rustfmt::skip]
        let cases = [
            (V::from(123.1),  V::from("-123.1"),     "0"),
            (V::from(128),    V::from(127.9999999),  "256"),
            (V::from("-178"), V::from(-22),          "-200"),
            (V::from(-123),   V::from(Duration::new(133.0).unwrap()), "10"),
        ];
        for (time, other, expected) in cases {
            let src = format!("{time:?} + {other:?}");
            let sum = Duration::new(time).unwrap().add(other).unwrap();
            assert_eq!(sum.get_time(false), expected, "Failed for {src}");
        }
    }

    #[test]
    fn subtracts_exactly() {
        use DurationValue as V;

        #[rustfmt::skip]
        let cases = [
            (V::from(123.1),  V::from("123.1"),       "0"),
            (V::from(128),    V::from(-127.9999999),  "256"),
            (V::from("-178"), V::from(22),            "-200"),
            (V::from(-123),   V::from(Duration::new(-133.0).unwrap()), "10"),
        ];
        for (time, other, expected) in cases {
            let src = format!("{time:?} - {other:?}");
            let diff = Duration::new(time).unwrap().sub(other).unwrap();
            assert_eq!(diff.get_time(false), expected, "Failed for {src}");
        }
    }

    #[test]
    fn subtraction_is_antisymmetric() {
        let values: Vec<_> = ["0", "1.5", "-1.5", "0.000001", "-987654321.123456"]
            .iter()
            .map(|v| Duration::new(*v).unwrap())
            .collect();
        for a in &values {
            for b in &values {
                let ab = a - b;
                let ba = b - a;
                assert_eq!(ab, -&ba, "Failed for {a} and {b}");
                if !ba.is_zero() && !ba.is_inverted() {
                    assert_eq!(ab.to_string(), format!("-{ba}"), "Failed for {a} and {b}");
                }
            }
        }
    }

    #[test]
    fn keeps_precision_beyond_i64() {
        let big = Duration::new("92233720368547758070.5").unwrap();
        let sum = big.add("92233720368547758070.5").unwrap();
        assert_eq!(sum.to_string(), "184467440737095516141");
        assert_eq!(sum.as_microseconds(), None);
    }

    #[test]
    fn converts_microseconds() {
        let duration = Duration::from_microseconds(-1_500_000);
        assert_eq!(duration.to_string(), "-1.5");
        assert_eq!(duration.as_microseconds(), Some(-1_500_000));
        assert_eq!(duration.subsec_microseconds(), 500_000);
        assert_eq!(duration.seconds(), &BigUint::from(1u32));
    }

    #[test]
    fn orders_by_signed_value() {
        let mut values: Vec<_> = ["1", "-2", "0.5", "-0.5", "0"]
            .iter()
            .map(|v| Duration::new(*v).unwrap())
            .collect();
        values.sort();
        let sorted: Vec<_> = values.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, ["-2", "-0.5", "0", "0.5", "1"]);
    }

    #[test]
    fn with_time_leaves_receiver_untouched() {
        let original = Duration::new("1.5").unwrap();
        let replaced = original.with_time("-2").unwrap();
        assert_eq!(original.to_string(), "1.5");
        assert_eq!(replaced.to_string(), "-2");
    }

    #[test]
    fn serializes_as_canonical_string() {
        let duration = Duration::new("-.12345").unwrap();
        assert_eq!(serde_json::to_string(&duration).unwrap(), r#""-0.12345""#);

        let parsed: Duration = serde_json::from_str(r#""123.9999999""#).unwrap();
        assert_eq!(parsed.to_string(), "124");
        let parsed: Duration = serde_json::from_str("-42").unwrap();
        assert_eq!(parsed.to_string(), "-42");
        let parsed: Duration = serde_json::from_str("1.25").unwrap();
        assert_eq!(parsed.to_string(), "1.25");

        assert!(serde_json::from_str::<Duration>(r#""1,5""#).is_err());
    }
}

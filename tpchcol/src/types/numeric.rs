/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Fixed-point decimal
//!
//! `Numeric` stores `round(x * 10^precision)` in an `i64`. Parsing,
//! arithmetic and formatting work on the scaled integer only.
//!
//! Addition and subtraction keep the operand type and never widen; callers
//! that may overflow must widen first with [`Numeric::with_length`] or
//! [`Numeric::rescale`]. Multiplication adds precisions. Division by a value
//! with a non-zero precision rescales the dividend in 128-bit arithmetic.
//! Arithmetic overflow is an invariant violation and panics.
//!
//! Values compare equal only at the same precision; ordering two values of
//! different precision panics, so `1.0` and `1.00` must be rescaled to a
//! common precision before they are compared.

use super::Integer;
use super::hash_raw;
use super::split_sign;
use super::trim_spaces;
use crate::error::ParseError;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;
use std::ops::AddAssign;
use std::ops::Div;
use std::ops::Mul;
use std::ops::Neg;
use std::ops::Sub;

const NUMERIC: &str = "numeric";

/// Largest supported precision, bounded by `i64` digits
pub const MAX_PRECISION: u8 = 18;

/// Largest number of integer-part digits accepted by the parser
const MAX_INTEGER_DIGITS: u32 = 18;

pub(crate) const POW10: [i64; 19] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

fn checked_i64(value: i128, what: &str) -> i64 {
    match i64::try_from(value) {
        Ok(value) => value,
        Err(_) => panic!("numeric {} overflows 64 bits: {}", what, value),
    }
}

/// Scaled fixed-point decimal with `length` total digits and `precision`
/// fraction digits
#[derive(Debug, Clone, Copy)]
pub struct Numeric {
    value: i64,
    length: u8,
    precision: u8,
}

impl Numeric {
    /// Build from an already scaled integer
    pub const fn from_raw(value: i64, length: u8, precision: u8) -> Self {
        assert!(precision <= MAX_PRECISION);
        Numeric {
            value,
            length,
            precision,
        }
    }

    pub fn from_integer(x: Integer, length: u8, precision: u8) -> Self {
        assert!(precision <= MAX_PRECISION, "precision {} too large", precision);
        let scaled = i128::from(x.0) * i128::from(POW10[usize::from(precision)]);
        Numeric::from_raw(checked_i64(scaled, "conversion"), length, precision)
    }

    pub const fn raw(&self) -> i64 {
        self.value
    }

    pub const fn length(&self) -> u8 {
        self.length
    }

    pub const fn precision(&self) -> u8 {
        self.precision
    }

    /// Parse decimal text at the given precision.
    ///
    /// Trailing zeros of the fraction are dropped before the precision check,
    /// so `"12.500"` is accepted at precision 2.
    pub fn parse(bytes: &[u8], length: u8, precision: u8) -> Result<Self, ParseError> {
        if precision > MAX_PRECISION {
            return Err(ParseError::overflow(NUMERIC, "precision exceeds 18 digits"));
        }

        let (negative, mut digits) = split_sign(trim_spaces(bytes));
        if digits.is_empty() {
            return Err(ParseError::format(NUMERIC, "found non-numeric characters"));
        }

        let mut result: i128 = 0;
        let mut fraction = false;
        let mut digits_seen = 0u32;
        let mut fraction_digits_seen = 0u32;
        let mut pos = 0;
        while pos < digits.len() {
            match digits[pos] {
                c @ b'0'..=b'9' => {
                    result = result.saturating_mul(10).saturating_add(i128::from(c - b'0'));
                    if fraction {
                        fraction_digits_seen += 1;
                    } else {
                        digits_seen += 1;
                    }
                }
                b'.' => {
                    if fraction {
                        return Err(ParseError::format(NUMERIC, "already in fraction"));
                    }
                    while digits.len() > pos + 1 && digits.last() == Some(&b'0') {
                        digits = &digits[..digits.len() - 1];
                    }
                    fraction = true;
                }
                _ => {
                    return Err(ParseError::format(
                        NUMERIC,
                        "invalid character in numeric string",
                    ));
                }
            }
            pos += 1;
        }

        if digits_seen + fraction_digits_seen == 0 {
            return Err(ParseError::format(NUMERIC, "found non-numeric characters"));
        }
        if digits_seen > MAX_INTEGER_DIGITS {
            return Err(ParseError::overflow(NUMERIC, "too many integer digits"));
        }
        if fraction_digits_seen > u32::from(precision) {
            return Err(ParseError::overflow(NUMERIC, "losing precision"));
        }

        let shift = usize::from(precision) - fraction_digits_seen as usize;
        let scaled = result * i128::from(POW10[shift]);
        let signed = if negative { -scaled } else { scaled };
        let value = i64::try_from(signed)
            .map_err(|_| ParseError::overflow(NUMERIC, "scaled value exceeds 64 bits"))?;

        Ok(Numeric::from_raw(value, length, precision))
    }

    /// Same scaled value under a different total length
    pub const fn with_length(self, length: u8) -> Self {
        Numeric { length, ..self }
    }

    /// Change precision; scaling down truncates toward zero
    pub fn rescale(self, precision: u8) -> Self {
        assert!(precision <= MAX_PRECISION, "precision {} too large", precision);
        let value = match precision.cmp(&self.precision) {
            Ordering::Equal => self.value,
            Ordering::Greater => {
                let factor = POW10[usize::from(precision - self.precision)];
                checked_i64(i128::from(self.value) * i128::from(factor), "rescale")
            }
            Ordering::Less => self.value / POW10[usize::from(self.precision - precision)],
        };
        Numeric::from_raw(value, self.length, precision)
    }

    pub fn hash(&self) -> u64 {
        hash_raw(self.value as u64)
    }

    fn assert_same_precision(&self, other: &Numeric, op: &str) {
        assert_eq!(
            self.precision, other.precision,
            "numeric {} requires equal precision",
            op
        );
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.precision == other.precision && self.value == other.value
    }
}

impl Eq for Numeric {}

impl PartialOrd for Numeric {
    /// Values of different precision are unordered
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.precision == other.precision).then(|| self.value.cmp(&other.value))
    }
}

impl Ord for Numeric {
    fn cmp(&self, other: &Self) -> Ordering {
        self.assert_same_precision(other, "comparison");
        self.value.cmp(&other.value)
    }
}

impl Add for Numeric {
    type Output = Numeric;

    fn add(self, rhs: Numeric) -> Numeric {
        self.assert_same_precision(&rhs, "addition");
        Numeric {
            value: self.value + rhs.value,
            ..self
        }
    }
}

impl AddAssign for Numeric {
    fn add_assign(&mut self, rhs: Numeric) {
        self.assert_same_precision(&rhs, "addition");
        let result = i128::from(self.value) + i128::from(rhs.value);
        self.value = checked_i64(result, "addition");
    }
}

impl Sub for Numeric {
    type Output = Numeric;

    fn sub(self, rhs: Numeric) -> Numeric {
        self.assert_same_precision(&rhs, "subtraction");
        Numeric {
            value: self.value - rhs.value,
            ..self
        }
    }
}

impl Mul for Numeric {
    type Output = Numeric;

    /// Precision of the product is the sum of both precisions
    fn mul(self, rhs: Numeric) -> Numeric {
        let precision = self.precision + rhs.precision;
        assert!(
            precision <= MAX_PRECISION,
            "numeric product precision {} too large",
            precision
        );
        Numeric::from_raw(self.value * rhs.value, self.length, precision)
    }
}

impl Div for Numeric {
    type Output = Numeric;

    fn div(self, rhs: Numeric) -> Numeric {
        if rhs.precision == 0 {
            return Numeric {
                value: self.value / rhs.value,
                ..self
            };
        }
        let scaled = i128::from(self.value) * i128::from(POW10[usize::from(rhs.precision)]);
        Numeric {
            value: checked_i64(scaled / i128::from(rhs.value), "division"),
            ..self
        }
    }
}

impl Div<Integer> for Numeric {
    type Output = Numeric;

    fn div(self, rhs: Integer) -> Numeric {
        Numeric {
            value: self.value / i64::from(rhs.0),
            ..self
        }
    }
}

impl Neg for Numeric {
    type Output = Numeric;

    fn neg(self) -> Numeric {
        Numeric {
            value: -self.value,
            ..self
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut v = i128::from(self.value);
        if v < 0 {
            f.write_str("-")?;
            v = -v;
        }
        if self.precision == 0 {
            return write!(f, "{}", v);
        }
        let sep = i128::from(POW10[usize::from(self.precision)]);
        write!(
            f,
            "{}.{:0width$}",
            v / sep,
            v % sep,
            width = usize::from(self.precision)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> Numeric {
        Numeric::parse(text.as_bytes(), 15, 2).unwrap()
    }

    #[test]
    fn test_parse_scaled_values() {
        assert_eq!(dec("12.34").raw(), 1234);
        assert_eq!(dec("12").raw(), 1200);
        assert_eq!(dec("12.5").raw(), 1250);
        assert_eq!(dec("-0.07").raw(), -7);
        assert_eq!(dec(" +901.00 ").raw(), 90100);
        assert_eq!(dec(".5").raw(), 50);
    }

    #[test]
    fn test_trailing_zeros_are_dropped() {
        assert_eq!(dec("12.500").raw(), 1250);
        assert_eq!(dec("12.0000000").raw(), 1200);
        assert!(matches!(
            Numeric::parse(b"12.501", 15, 2),
            Err(ParseError::Overflow { .. })
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Numeric::parse(b"1.2.3", 15, 2),
            Err(ParseError::Format { .. })
        ));
        assert!(matches!(
            Numeric::parse(b"12,5", 15, 2),
            Err(ParseError::Format { .. })
        ));
        assert!(matches!(
            Numeric::parse(b"-", 15, 2),
            Err(ParseError::Format { .. })
        ));
        assert!(matches!(
            Numeric::parse(b".", 15, 2),
            Err(ParseError::Format { .. })
        ));
        assert!(matches!(
            Numeric::parse(b"1234567890123456789", 15, 0),
            Err(ParseError::Overflow { .. })
        ));
        assert!(matches!(
            Numeric::parse(b"999999999999999999", 18, 2),
            Err(ParseError::Overflow { .. })
        ));
    }

    #[test]
    fn test_format() {
        assert_eq!(dec("12.5").to_string(), "12.50");
        assert_eq!(dec("-0.07").to_string(), "-0.07");
        assert_eq!(dec("0").to_string(), "0.00");
        assert_eq!(dec("100.01").to_string(), "100.01");
        assert_eq!(Numeric::from_raw(-42, 10, 0).to_string(), "-42");
        assert_eq!(Numeric::from_raw(i64::MIN, 18, 4).to_string(), "-922337203685477.5808");
    }

    #[test]
    fn test_add_sub() {
        let mut sum = dec("1.25");
        sum += dec("2.50");
        assert_eq!(sum, dec("3.75"));
        assert_eq!(dec("1.25") + dec("0.75"), dec("2"));
        assert_eq!(dec("1.25") - dec("2"), dec("-0.75"));
        assert_eq!(-dec("1.25"), dec("-1.25"));
    }

    #[test]
    #[should_panic(expected = "overflows 64 bits")]
    fn test_add_assign_overflow_panics() {
        let mut big = Numeric::from_raw(i64::MAX, 18, 2);
        big += Numeric::from_raw(1, 18, 2);
    }

    #[test]
    fn test_multiply_adds_precision() {
        let product = dec("1.50") * dec("2.00");
        assert_eq!(product.precision(), 4);
        assert_eq!(product.raw(), 30000);
        assert_eq!(product.to_string(), "3.0000");
    }

    #[test]
    fn test_divide() {
        // 10.00 / 4.00 = 2.50
        let quotient = dec("10") / dec("4");
        assert_eq!(quotient.precision(), 2);
        assert_eq!(quotient.to_string(), "2.50");

        let by_plain = dec("10") / Numeric::from_raw(4, 10, 0);
        assert_eq!(by_plain.to_string(), "2.50");

        let by_integer = dec("10") / Integer(4);
        assert_eq!(by_integer.to_string(), "2.50");
    }

    #[test]
    fn test_rescale_and_compare() {
        let x = dec("12.34");
        assert_eq!(x.rescale(4).raw(), 123400);
        assert_eq!(x.rescale(1).raw(), 123);
        assert_eq!(x.rescale(4).rescale(2), x);
        assert!(dec("1.01") > Numeric::from_raw(1, 10, 0).rescale(2));
        assert_eq!(Numeric::from_integer(Integer(7), 15, 2), dec("7"));
    }

    #[test]
    fn test_equal_values_hash_equal() {
        let tenths = Numeric::parse(b"1.0", 15, 1).unwrap();
        let hundredths = Numeric::parse(b"1.00", 15, 2).unwrap();
        assert_ne!(tenths, hundredths);
        assert_eq!(tenths.partial_cmp(&hundredths), None);

        let rescaled = tenths.rescale(2);
        assert_eq!(rescaled, hundredths);
        assert_eq!(rescaled.hash(), hundredths.hash());
        assert_eq!(Numeric::from_raw(100, 10, 2), hundredths);
    }

    #[test]
    #[should_panic(expected = "comparison requires equal precision")]
    fn test_ordering_mixed_precision_panics() {
        let tenths = Numeric::parse(b"1.0", 15, 1).unwrap();
        let _ = tenths.cmp(&dec("1"));
    }

    #[test]
    fn test_precision_limit_rejected() {
        assert!(matches!(
            Numeric::parse(b"1.5", 15, 19),
            Err(ParseError::Overflow { .. })
        ));
        assert!(matches!(
            Numeric::parse(b"1", 15, u8::MAX),
            Err(ParseError::Overflow { .. })
        ));
        assert_eq!(Numeric::parse(b"0.5", 18, 18).unwrap().raw(), 500_000_000_000_000_000);
    }

    #[test]
    #[should_panic(expected = "division overflows 64 bits")]
    fn test_divide_overflow_panics() {
        let _ = Numeric::from_raw(i64::MAX, 18, 2) / Numeric::from_raw(1, 18, 2);
    }

    #[test]
    #[should_panic(expected = "product precision 20 too large")]
    fn test_multiply_precision_limit_panics() {
        let a = Numeric::from_raw(1, 18, 10);
        let _ = a * a;
    }
}

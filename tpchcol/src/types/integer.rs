/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! 32-bit `Integer` and 64-bit `BigInt` kinds

use super::hash_raw;
use super::split_sign;
use super::trim_spaces;
use crate::error::ParseError;
use std::fmt;
use std::ops::Add;
use std::ops::AddAssign;
use std::ops::Mul;
use std::ops::Neg;
use std::ops::Rem;
use std::ops::Sub;

const INTEGER: &str = "integer";
const BIGINT: &str = "bigint";

/// Scan an optionally signed run of decimal digits.
///
/// Returns the sign and the magnitude. Digits stop at a `.`; whatever follows
/// the point is ignored. `limit` is the largest positive magnitude, the
/// negative side admits one more.
fn parse_magnitude(
    bytes: &[u8],
    kind: &'static str,
    max_digits: u32,
    limit: u64,
    overflow_reason: &'static str,
) -> Result<(bool, u64), ParseError> {
    let (negative, digits) = split_sign(trim_spaces(bytes));
    if digits.is_empty() {
        return Err(ParseError::format(kind, "found non-integer characters"));
    }

    let mut result: u64 = 0;
    let mut digits_seen = 0u32;
    for &c in digits {
        match c {
            b'0'..=b'9' => {
                result = result.saturating_mul(10).saturating_add(u64::from(c - b'0'));
                digits_seen += 1;
            }
            b'.' => break,
            _ => {
                return Err(ParseError::format(
                    kind,
                    "invalid character in integer string",
                ));
            }
        }
    }

    if digits_seen == 0 {
        return Err(ParseError::format(kind, "found non-integer characters"));
    }

    let bound = if negative { limit + 1 } else { limit };
    if digits_seen > max_digits || result > bound {
        return Err(ParseError::overflow(kind, overflow_reason));
    }

    Ok((negative, result))
}

/// Signed 32-bit integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Integer(pub i32);

impl Integer {
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let (negative, magnitude) = parse_magnitude(
            bytes,
            INTEGER,
            10,
            i32::MAX as u64,
            "32bit integers can at most consist of 10 numeric characters",
        )?;
        let value = if negative {
            -(magnitude as i64)
        } else {
            magnitude as i64
        };
        Ok(Integer(value as i32))
    }

    pub fn hash(&self) -> u64 {
        hash_raw(i64::from(self.0) as u64)
    }
}

impl Add for Integer {
    type Output = Integer;

    fn add(self, rhs: Integer) -> Integer {
        Integer(self.0 + rhs.0)
    }
}

impl AddAssign for Integer {
    fn add_assign(&mut self, rhs: Integer) {
        self.0 += rhs.0;
    }
}

impl Sub for Integer {
    type Output = Integer;

    fn sub(self, rhs: Integer) -> Integer {
        Integer(self.0 - rhs.0)
    }
}

impl Mul for Integer {
    type Output = Integer;

    fn mul(self, rhs: Integer) -> Integer {
        Integer(self.0 * rhs.0)
    }
}

impl Neg for Integer {
    type Output = Integer;

    fn neg(self) -> Integer {
        Integer(-self.0)
    }
}

impl Rem<i32> for Integer {
    type Output = Integer;

    fn rem(self, rhs: i32) -> Integer {
        Integer(self.0 % rhs)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed 64-bit integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct BigInt(pub i64);

impl BigInt {
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let (negative, magnitude) = parse_magnitude(
            bytes,
            BIGINT,
            20,
            i64::MAX as u64,
            "64bit integers can at most consist of 20 numeric characters",
        )?;
        let value = magnitude as i64;
        Ok(BigInt(if negative { value.wrapping_neg() } else { value }))
    }

    pub fn hash(&self) -> u64 {
        hash_raw(self.0 as u64)
    }
}

impl From<Integer> for BigInt {
    fn from(value: Integer) -> Self {
        BigInt(i64::from(value.0))
    }
}

impl Add for BigInt {
    type Output = BigInt;

    fn add(self, rhs: BigInt) -> BigInt {
        BigInt(self.0 + rhs.0)
    }
}

impl AddAssign for BigInt {
    fn add_assign(&mut self, rhs: BigInt) {
        self.0 += rhs.0;
    }
}

impl Sub for BigInt {
    type Output = BigInt;

    fn sub(self, rhs: BigInt) -> BigInt {
        BigInt(self.0 - rhs.0)
    }
}

impl Mul for BigInt {
    type Output = BigInt;

    fn mul(self, rhs: BigInt) -> BigInt {
        BigInt(self.0 * rhs.0)
    }
}

impl Neg for BigInt {
    type Output = BigInt;

    fn neg(self) -> BigInt {
        BigInt(-self.0)
    }
}

impl Rem<i64> for BigInt {
    type Output = BigInt;

    fn rem(self, rhs: i64) -> BigInt {
        BigInt(self.0 % rhs)
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_parse() {
        assert_eq!(Integer::parse(b"42").unwrap(), Integer(42));
        assert_eq!(Integer::parse(b"  -17 ").unwrap(), Integer(-17));
        assert_eq!(Integer::parse(b"+5").unwrap(), Integer(5));
        assert_eq!(Integer::parse(b"0").unwrap(), Integer(0));
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(Integer::parse(b"2147483647").unwrap(), Integer(i32::MAX));
        assert_eq!(Integer::parse(b"-2147483648").unwrap(), Integer(i32::MIN));
        assert!(matches!(
            Integer::parse(b"2147483648"),
            Err(ParseError::Overflow { .. })
        ));
        assert!(matches!(
            Integer::parse(b"12345678901"),
            Err(ParseError::Overflow { .. })
        ));
    }

    #[test]
    fn test_integer_ignores_fraction() {
        assert_eq!(Integer::parse(b"12.7").unwrap(), Integer(12));
    }

    #[test]
    fn test_integer_format_errors() {
        for input in [&b""[..], b"   ", b"-", b"+", b"12a", b"notanumber", b".5"] {
            assert!(
                matches!(Integer::parse(input), Err(ParseError::Format { .. })),
                "expected format error for {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_bigint_bounds() {
        assert_eq!(
            BigInt::parse(b"9223372036854775807").unwrap(),
            BigInt(i64::MAX)
        );
        assert_eq!(
            BigInt::parse(b"-9223372036854775808").unwrap(),
            BigInt(i64::MIN)
        );
        assert!(BigInt::parse(b"9223372036854775808").is_err());
        assert!(BigInt::parse(b"123456789012345678901").is_err());
    }

    #[test]
    fn test_integer_arithmetic() {
        let a = Integer(7);
        let b = Integer(3);
        assert_eq!(a + b, Integer(10));
        assert_eq!(a - b, Integer(4));
        assert_eq!(a * b, Integer(21));
        assert_eq!(a % 4, Integer(3));
        assert_eq!(-a, Integer(-7));
        assert_eq!(BigInt::from(a) + BigInt(1), BigInt(8));
    }

    #[test]
    fn test_hash_sign_extends() {
        assert_eq!(Integer(-1).hash(), BigInt(-1).hash());
        assert_ne!(Integer(1).hash(), Integer(2).hash());
    }
}

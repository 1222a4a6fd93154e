/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Domain value types
//!
//! The closed set of column value kinds the converter understands. Every kind
//! owns its text parsing rule, ordering, formatting and hash. Numeric kinds add
//! scaled fixed-point arithmetic; no floating point is used anywhere.
//!
//! | Kind        | Type name   | Binary footprint                     |
//! |-------------|-------------|--------------------------------------|
//! | `Integer`   | `integer`   | 4 bytes                              |
//! | `BigInt`    | `bigint`    | 8 bytes                              |
//! | `Numeric`   | `numeric`   | 8 bytes, scaled by `10^precision`    |
//! | `Char(1)`   | `char`      | 1 byte                               |
//! | `Char(n)`   | `char`      | length indicator + `n` bytes         |
//! | `Varchar(n)`| `varchar`   | variable, at most `n` bytes          |
//! | `Date`      | `date`      | 4 bytes, Julian day number           |
//! | `Timestamp` | `timestamp` | 8 bytes, milliseconds                |
//!
//! Parsed string values borrow the input span, so parsing never allocates.

pub mod date;
pub mod integer;
pub mod numeric;
pub mod string;

pub use date::Date;
pub use date::Timestamp;
pub use integer::BigInt;
pub use integer::Integer;
pub use numeric::Numeric;
pub use string::Char1;
pub use string::FixedChar;
pub use string::Varchar;

use crate::error::ParseError;
use serde::Deserialize;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Seed XORed into fixed-width values before the final mix
pub(crate) const HASH_SALT: u64 = 88172645463325252;

/// MurmurHash64A finalizer applied to a single 64-bit word
pub const fn murmur_hash64(k: u64) -> u64 {
    const M: u64 = 0xc6a4a7935bd1e995;
    const R: u32 = 47;

    let mut h: u64 = 0x8445d61a4e774912 ^ 8u64.wrapping_mul(M);
    let mut k = k.wrapping_mul(M);
    k ^= k >> R;
    k = k.wrapping_mul(M);
    h ^= k;
    h = h.wrapping_mul(M);
    h ^= h >> R;
    h = h.wrapping_mul(M);
    h ^= h >> R;
    h
}

/// Hash of a fixed-width value, sign-extended to 64 bits by the caller
pub(crate) const fn hash_raw(raw: u64) -> u64 {
    murmur_hash64(HASH_SALT ^ raw)
}

/// Hash of a string value: rolling 5-bit rotate fold, then the shared mix
pub(crate) fn hash_bytes(bytes: &[u8]) -> u64 {
    let folded = bytes
        .iter()
        .fold(0u32, |acc, &byte| acc.rotate_left(5) ^ u32::from(byte));
    murmur_hash64(u64::from(folded))
}

/// Combine the hashes of several values into one key hash.
///
/// The combiner is a plain XOR, so the result does not depend on the order
/// of the values.
pub fn hash_key(values: &[Value<'_>]) -> u64 {
    values.iter().fold(0, |acc, value| acc ^ value.hash())
}

/// Strip leading and trailing ASCII spaces
pub(crate) fn trim_spaces(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&c| c != b' ').unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&c| c != b' ').map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Split an optional leading `+` or `-`
pub(crate) fn split_sign(bytes: &[u8]) -> (bool, &[u8]) {
    match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, bytes),
    }
}

/// Discriminant shared by all parameterisations of a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Integer,
    Numeric,
    Char,
    Varchar,
    Date,
    Timestamp,
    #[serde(rename = "bigint")]
    BigInt,
}

impl TypeTag {
    /// Canonical type name, used in page file names
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::Integer => "integer",
            TypeTag::Numeric => "numeric",
            TypeTag::Char => "char",
            TypeTag::Varchar => "varchar",
            TypeTag::Date => "date",
            TypeTag::Timestamp => "timestamp",
            TypeTag::BigInt => "bigint",
        }
    }

    /// Recover a tag from its canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "integer" => Some(TypeTag::Integer),
            "numeric" => Some(TypeTag::Numeric),
            "char" => Some(TypeTag::Char),
            "varchar" => Some(TypeTag::Varchar),
            "date" => Some(TypeTag::Date),
            "timestamp" => Some(TypeTag::Timestamp),
            "bigint" => Some(TypeTag::BigInt),
            _ => None,
        }
    }
}

/// A column value kind together with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueKind {
    Integer,
    #[serde(rename = "bigint")]
    BigInt,
    Numeric { length: u8, precision: u8 },
    Char { max_len: u32 },
    Varchar { max_len: u32 },
    Date,
    Timestamp,
}

impl ValueKind {
    pub const fn tag(&self) -> TypeTag {
        match self {
            ValueKind::Integer => TypeTag::Integer,
            ValueKind::BigInt => TypeTag::BigInt,
            ValueKind::Numeric { .. } => TypeTag::Numeric,
            ValueKind::Char { .. } => TypeTag::Char,
            ValueKind::Varchar { .. } => TypeTag::Varchar,
            ValueKind::Date => TypeTag::Date,
            ValueKind::Timestamp => TypeTag::Timestamp,
        }
    }

    pub const fn type_name(&self) -> &'static str {
        self.tag().name()
    }

    /// Byte stride in a fixed-size page, `None` for variable-size kinds
    pub const fn fixed_width(&self) -> Option<usize> {
        match self {
            ValueKind::Integer | ValueKind::Date => Some(4),
            ValueKind::BigInt | ValueKind::Numeric { .. } | ValueKind::Timestamp => Some(8),
            ValueKind::Char { max_len } => Some(string::char_stride(*max_len)),
            ValueKind::Varchar { .. } => None,
        }
    }

    pub const fn is_variable(&self) -> bool {
        self.fixed_width().is_none()
    }

    /// Parse a raw field into a value of this kind
    pub fn parse<'a>(&self, bytes: &'a [u8]) -> Result<Value<'a>, ParseError> {
        let value = match *self {
            ValueKind::Integer => Value::Integer(Integer::parse(bytes)?),
            ValueKind::BigInt => Value::BigInt(BigInt::parse(bytes)?),
            ValueKind::Numeric { length, precision } => {
                Value::Numeric(Numeric::parse(bytes, length, precision)?)
            }
            ValueKind::Char { max_len: 1 } => Value::Char1(Char1::parse(bytes)?),
            ValueKind::Char { max_len } => Value::Char(FixedChar::parse(bytes, max_len)?),
            ValueKind::Varchar { max_len } => Value::Varchar(Varchar::parse(bytes, max_len)?),
            ValueKind::Date => Value::Date(Date::parse(bytes)?),
            ValueKind::Timestamp => Value::Timestamp(Timestamp::parse(bytes)?),
        };
        Ok(value)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Numeric { length, precision } => {
                write!(f, "numeric({},{})", length, precision)
            }
            ValueKind::Char { max_len } => write!(f, "char({})", max_len),
            ValueKind::Varchar { max_len } => write!(f, "varchar({})", max_len),
            other => f.write_str(other.type_name()),
        }
    }
}

/// A single parsed value of any kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Integer(Integer),
    BigInt(BigInt),
    Numeric(Numeric),
    Char(FixedChar<'a>),
    Char1(Char1),
    Varchar(Varchar<'a>),
    Date(Date),
    Timestamp(Timestamp),
}

impl<'a> Value<'a> {
    /// Deterministic 64-bit hash
    pub fn hash(&self) -> u64 {
        match self {
            Value::Integer(v) => v.hash(),
            Value::BigInt(v) => v.hash(),
            Value::Numeric(v) => v.hash(),
            Value::Char(v) => v.hash(),
            Value::Char1(v) => v.hash(),
            Value::Varchar(v) => v.hash(),
            Value::Date(v) => v.hash(),
            Value::Timestamp(v) => v.hash(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::BigInt(_) => ValueKind::BigInt,
            Value::Numeric(v) => ValueKind::Numeric {
                length: v.length(),
                precision: v.precision(),
            },
            Value::Char(v) => ValueKind::Char {
                max_len: v.max_len(),
            },
            Value::Char1(_) => ValueKind::Char { max_len: 1 },
            Value::Varchar(v) => ValueKind::Varchar {
                max_len: v.max_len(),
            },
            Value::Date(_) => ValueKind::Date,
            Value::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    /// Logical byte length for string kinds
    pub fn byte_len(&self) -> Option<usize> {
        match self {
            Value::Char(v) => Some(v.len()),
            Value::Char1(v) => Some(v.len()),
            Value::Varchar(v) => Some(v.len()),
            _ => None,
        }
    }
}

impl PartialOrd for Value<'_> {
    /// Values of different kinds are unordered
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
            (Value::Numeric(a), Value::Numeric(b)) => a.partial_cmp(b),
            (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
            (Value::Char1(a), Value::Char1(b)) => Some(a.cmp(b)),
            (Value::Varchar(a), Value::Varchar(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Numeric(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "{}", v),
            Value::Char1(v) => write!(f, "{}", v),
            Value::Varchar(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v),
        }
    }
}

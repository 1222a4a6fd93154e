/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Column accumulator
//!
//! Buffers the parsed values of one column in row order and keeps a running
//! count of the exact number of bytes its page will need, so the encoder can
//! allocate the page once without a second pass over the values.

use crate::types::BigInt;
use crate::types::Char1;
use crate::types::Date;
use crate::types::FixedChar;
use crate::types::Integer;
use crate::types::Numeric;
use crate::types::Timestamp;
use crate::types::Value;
use crate::types::ValueKind;
use crate::types::Varchar;

/// Bytes every page carries regardless of its row count
pub const GLOBAL_OVERHEAD: usize = 0;

/// Bytes each variable-size value adds on top of its own length: one
/// `(length, offset)` slot of two native-endian `u64`s
pub const PER_ITEM_OVERHEAD: usize = 16;

/// In-memory column storage, one variant per physical representation
#[derive(Debug, Clone)]
pub enum ColumnData {
    Integer(Vec<i32>),
    BigInt(Vec<i64>),
    Numeric(Vec<i64>),
    Char1(Vec<u8>),
    /// Page images of `CHAR(n)` values laid out at their fixed stride
    Char {
        max_len: u32,
        images: Vec<u8>,
    },
    /// Concatenated string bytes and the end offset of every value
    Varchar {
        max_len: u32,
        bytes: Vec<u8>,
        ends: Vec<usize>,
    },
    Date(Vec<i32>),
    Timestamp(Vec<u64>),
}

impl ColumnData {
    fn new(kind: ValueKind, capacity: usize) -> Self {
        match kind {
            ValueKind::Integer => ColumnData::Integer(Vec::with_capacity(capacity)),
            ValueKind::BigInt => ColumnData::BigInt(Vec::with_capacity(capacity)),
            ValueKind::Numeric { .. } => ColumnData::Numeric(Vec::with_capacity(capacity)),
            ValueKind::Char { max_len: 1 } => ColumnData::Char1(Vec::with_capacity(capacity)),
            ValueKind::Char { max_len } => ColumnData::Char {
                max_len,
                images: Vec::with_capacity(capacity * crate::types::string::char_stride(max_len)),
            },
            ValueKind::Varchar { max_len } => ColumnData::Varchar {
                max_len,
                bytes: Vec::new(),
                ends: Vec::with_capacity(capacity),
            },
            ValueKind::Date => ColumnData::Date(Vec::with_capacity(capacity)),
            ValueKind::Timestamp => ColumnData::Timestamp(Vec::with_capacity(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(data) => data.len(),
            ColumnData::BigInt(data) => data.len(),
            ColumnData::Numeric(data) => data.len(),
            ColumnData::Char1(data) => data.len(),
            ColumnData::Char { max_len, images } => {
                images.len() / crate::types::string::char_stride(*max_len)
            }
            ColumnData::Varchar { ends, .. } => ends.len(),
            ColumnData::Date(data) => data.len(),
            ColumnData::Timestamp(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parsed values of one column plus the exact size of its future page
#[derive(Debug, Clone)]
pub struct ColumnAccumulator {
    kind: ValueKind,
    data: ColumnData,
    output_size: usize,
}

impl ColumnAccumulator {
    pub fn new(kind: ValueKind) -> Self {
        Self::with_capacity(kind, 1024)
    }

    pub fn with_capacity(kind: ValueKind, expected_rows: usize) -> Self {
        ColumnAccumulator {
            kind,
            data: ColumnData::new(kind, expected_rows),
            output_size: GLOBAL_OVERHEAD,
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Exact byte size of the page for the values appended so far
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Append the value of the next row.
    ///
    /// # Panics
    ///
    /// If the value's kind differs from the column's kind.
    pub fn append(&mut self, value: Value<'_>) {
        assert_eq!(
            value.kind(),
            self.kind,
            "value of kind {} appended to column of kind {}",
            value.kind(),
            self.kind
        );

        match (&mut self.data, value) {
            (ColumnData::Integer(data), Value::Integer(v)) => data.push(v.0),
            (ColumnData::BigInt(data), Value::BigInt(v)) => data.push(v.0),
            (ColumnData::Numeric(data), Value::Numeric(v)) => data.push(v.raw()),
            (ColumnData::Char1(data), Value::Char1(v)) => data.push(v.0),
            (ColumnData::Char { max_len, images }, Value::Char(v)) => {
                let stride = crate::types::string::char_stride(*max_len);
                let start = images.len();
                images.resize(start + stride, 0);
                v.write_image(&mut images[start..]);
            }
            (ColumnData::Varchar { bytes, ends, .. }, Value::Varchar(v)) => {
                bytes.extend_from_slice(v.as_bytes());
                ends.push(bytes.len());
            }
            (ColumnData::Date(data), Value::Date(v)) => data.push(v.0),
            (ColumnData::Timestamp(data), Value::Timestamp(v)) => data.push(v.0),
            (_, value) => unreachable!("kind {} checked above", value.kind()),
        }

        self.output_size += match self.kind.fixed_width() {
            Some(width) => width,
            None => value.byte_len().unwrap_or(0) + PER_ITEM_OVERHEAD,
        };
    }

    /// Value of the given row
    pub fn get(&self, row: usize) -> Option<Value<'_>> {
        if row >= self.len() {
            return None;
        }
        let value = match (&self.data, self.kind) {
            (ColumnData::Integer(data), _) => Value::Integer(Integer(data[row])),
            (ColumnData::BigInt(data), _) => Value::BigInt(BigInt(data[row])),
            (ColumnData::Numeric(data), ValueKind::Numeric { length, precision }) => {
                Value::Numeric(Numeric::from_raw(data[row], length, precision))
            }
            (ColumnData::Char1(data), _) => Value::Char1(Char1(data[row])),
            (ColumnData::Char { max_len, images }, _) => {
                let stride = crate::types::string::char_stride(*max_len);
                let image = &images[row * stride..(row + 1) * stride];
                Value::Char(FixedChar::read_image(image, *max_len)?)
            }
            (ColumnData::Varchar { max_len, bytes, ends }, _) => {
                let start = if row == 0 { 0 } else { ends[row - 1] };
                Value::Varchar(Varchar::from_trusted(&bytes[start..ends[row]], *max_len))
            }
            (ColumnData::Date(data), _) => Value::Date(Date(data[row])),
            (ColumnData::Timestamp(data), _) => Value::Timestamp(Timestamp(data[row])),
            (ColumnData::Numeric(_), _) => return None,
        };
        Some(value)
    }

    /// Values in row order
    pub fn values(&self) -> impl Iterator<Item = Value<'_>> + '_ {
        (0..self.len()).filter_map(move |row| self.get(row))
    }
}

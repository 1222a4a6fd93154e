/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Typed errors for field parsing and tokenizing
//!
//! Malformed input is an expected operational condition, so parse and tokenize
//! failures are plain values that the loader wraps with row and column
//! context. Orchestration code carries them inside `anyhow::Error`, where they
//! stay reachable through `downcast_ref`.

use thiserror::Error;

/// Failure to turn a raw field into a value of its column's kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Text does not match the kind's grammar
    #[error("invalid {kind} format: {reason}")]
    Format {
        kind: &'static str,
        reason: &'static str,
    },

    /// Digit count or magnitude exceeds what the kind can hold
    #[error("{kind} value out of range: {reason}")]
    Overflow {
        kind: &'static str,
        reason: &'static str,
    },

    /// String field longer than the column's declared capacity
    #[error("{kind} value of {len} bytes exceeds capacity of {max_len}")]
    TooLong {
        kind: &'static str,
        len: usize,
        max_len: u32,
    },
}

impl ParseError {
    pub(crate) fn format(kind: &'static str, reason: &'static str) -> Self {
        ParseError::Format { kind, reason }
    }

    pub(crate) fn overflow(kind: &'static str, reason: &'static str) -> Self {
        ParseError::Overflow { kind, reason }
    }
}

/// A parse failure located in the input file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {row}, column {column} ({name}): {source}")]
pub struct FieldError {
    /// Zero-based row number
    pub row: u64,
    /// Zero-based column index
    pub column: usize,
    pub name: String,
    #[source]
    pub source: ParseError,
}

/// Structural problems reported by the tokenizer
#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("row {row}: expected {expected} fields, found {found}")]
    ColumnCount {
        row: u64,
        expected: usize,
        found: usize,
    },

    #[error("malformed input: {0}")]
    Csv(#[from] csv::Error),
}

/// Load interrupted through a cancel flag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("load of table '{table}' cancelled after {rows} rows")]
pub struct Cancelled {
    pub table: String,
    pub rows: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_message() {
        let err = FieldError {
            row: 4,
            column: 2,
            name: "n_regionkey".to_string(),
            source: ParseError::format("integer", "invalid character in integer string"),
        };

        assert_eq!(
            err.to_string(),
            "row 4, column 2 (n_regionkey): invalid integer format: invalid character in integer string"
        );
    }

    #[test]
    fn test_too_long_message() {
        let err = ParseError::TooLong {
            kind: "varchar",
            len: 30,
            max_len: 25,
        };
        assert_eq!(
            err.to_string(),
            "varchar value of 30 bytes exceeds capacity of 25"
        );
    }
}

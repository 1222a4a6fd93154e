/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Delimited row tokenizer
//!
//! Splits `dbgen` style flat files into rows of byte spans. Rows end at `\n`,
//! fields are separated by a single delimiter byte and nothing is quoted.
//! `dbgen` terminates every row with a delimiter, so a row may carry one
//! extra empty field after the last column. Blank lines inside the input are
//! rows with no fields and are rejected like any other short row.

use crate::error::TokenizeError;
use anyhow::Context;
use anyhow::Result;
use csv::ByteRecord;
use csv::ReaderBuilder;
use csv::Terminator;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Streaming reader handing out one row of field spans at a time
pub struct Tokenizer<R: Read> {
    reader: csv::Reader<R>,
    record: ByteRecord,
    columns: usize,
    rows: u64,
    line: u64,
}

fn builder(delimiter: u8) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .quoting(false)
        .has_headers(false)
        .flexible(true);
    builder
}

impl Tokenizer<File> {
    pub fn open(path: &Path, delimiter: u8, columns: usize) -> Result<Self> {
        let reader = builder(delimiter)
            .from_path(path)
            .with_context(|| format!("Failed to open input file {}", path.display()))?;
        Ok(Self::with_reader(reader, columns))
    }
}

impl<R: Read> Tokenizer<R> {
    pub fn from_reader(input: R, delimiter: u8, columns: usize) -> Self {
        Self::with_reader(builder(delimiter).from_reader(input), columns)
    }

    fn with_reader(reader: csv::Reader<R>, columns: usize) -> Self {
        Tokenizer {
            reader,
            record: ByteRecord::new(),
            columns,
            rows: 0,
            line: 1,
        }
    }

    /// Advance to the next row, `None` at the end of the input
    pub fn next_row(&mut self) -> Result<Option<Row<'_>>, TokenizeError> {
        if !self.reader.read_byte_record(&mut self.record)? {
            return Ok(None);
        }

        // The csv reader skips empty lines; a row spans one line, so reading
        // it may advance the line count by at most one.
        let line = self.reader.position().line();
        if line > self.line + 1 {
            return Err(TokenizeError::ColumnCount {
                row: self.rows,
                expected: self.columns,
                found: 0,
            });
        }
        self.line = line;

        let found = self.record.len();
        let trailing_delimiter = found == self.columns + 1
            && self.record.get(self.columns).is_some_and(|field| field.is_empty());
        if found != self.columns && !trailing_delimiter {
            return Err(TokenizeError::ColumnCount {
                row: self.rows,
                expected: self.columns,
                found,
            });
        }

        let index = self.rows;
        self.rows += 1;
        Ok(Some(Row {
            record: &self.record,
            columns: self.columns,
            index,
        }))
    }

    /// Rows handed out so far
    pub fn rows_read(&self) -> u64 {
        self.rows
    }
}

/// Field spans of one row
#[derive(Debug, Clone, Copy)]
pub struct Row<'r> {
    record: &'r ByteRecord,
    columns: usize,
    index: u64,
}

impl<'r> Row<'r> {
    /// Zero-based row number
    pub fn index(&self) -> u64 {
        self.index
    }

    /// `(column index, span)` for every column in order
    pub fn fields(self) -> impl Iterator<Item = (usize, &'r [u8])> + 'r {
        self.record.iter().take(self.columns).enumerate()
    }
}

/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Column page reader
//!
//! Maps a finished page read-only and hands out typed values that borrow
//! straight from the mapping. The page size and every variable-size slot are
//! checked once on open, so lookups afterwards cannot run outside the page.

use crate::column::GLOBAL_OVERHEAD;
use crate::page::SLOT_SIZE;
use crate::page::Slot;
use crate::types::BigInt;
use crate::types::Char1;
use crate::types::Date;
use crate::types::FixedChar;
use crate::types::Integer;
use crate::types::Numeric;
use crate::types::numeric::MAX_PRECISION;
use crate::types::Timestamp;
use crate::types::Value;
use crate::types::ValueKind;
use crate::types::Varchar;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

/// Read-only view of one column page
pub struct ColumnPage {
    path: PathBuf,
    kind: ValueKind,
    rows: usize,
    mmap: Option<Mmap>,
}

fn read_array<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[at..at + N]);
    out
}

impl ColumnPage {
    /// Map the page at `path` holding `rows` values of `kind`
    pub fn open(path: &Path, kind: ValueKind, rows: usize) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open page file {}", path.display()))?;
        let size = file
            .metadata()
            .with_context(|| format!("Failed to stat page file {}", path.display()))?
            .len();

        let mmap = if size == 0 {
            None
        } else {
            // SAFETY: pages are written once and never modified after the
            // loader flushes them.
            let mmap = unsafe { Mmap::map(&file) }
                .with_context(|| format!("Failed to map page file {}", path.display()))?;
            Some(mmap)
        };

        let page = ColumnPage {
            path: path.to_path_buf(),
            kind,
            rows,
            mmap,
        };
        page.validate()?;
        Ok(page)
    }

    fn validate(&self) -> Result<()> {
        if let ValueKind::Numeric { precision, .. } = self.kind
            && precision > MAX_PRECISION
        {
            bail!(
                "Page {} has numeric precision {}, at most {} is supported",
                self.path.display(),
                precision,
                MAX_PRECISION
            );
        }

        let size = self.bytes().len();
        match self.kind {
            ValueKind::Varchar { max_len } => {
                let slots_end = GLOBAL_OVERHEAD + self.rows * SLOT_SIZE;
                if size < slots_end {
                    bail!(
                        "Page {} has {} bytes, too small for {} slots",
                        self.path.display(),
                        size,
                        self.rows
                    );
                }
                for row in 0..self.rows {
                    let slot = self.read_slot(row);
                    let in_bounds = slot.offset >= slots_end as u64
                        && slot
                            .offset
                            .checked_add(slot.length)
                            .is_some_and(|end| end <= size as u64);
                    if !in_bounds || slot.length > u64::from(max_len) {
                        bail!(
                            "Page {} row {}: slot ({}, {}) is outside the data region",
                            self.path.display(),
                            row,
                            slot.length,
                            slot.offset
                        );
                    }
                }
            }
            kind => {
                let width = kind.fixed_width().unwrap_or(0);
                let expected = GLOBAL_OVERHEAD + self.rows * width;
                if size != expected {
                    bail!(
                        "Page {} has {} bytes, expected {} for {} rows of {}",
                        self.path.display(),
                        size,
                        expected,
                        self.rows,
                        kind
                    );
                }
                if let ValueKind::Char { max_len } = kind
                    && max_len > 1
                    && let Some(row) = (0..self.rows).find(|&row| self.get(row).is_none())
                {
                    bail!(
                        "Page {} row {}: length indicator exceeds char({})",
                        self.path.display(),
                        row,
                        max_len
                    );
                }
            }
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Raw page bytes
    pub fn bytes(&self) -> &[u8] {
        match &self.mmap {
            Some(mmap) => &mmap[..],
            None => &[],
        }
    }

    fn read_slot(&self, row: usize) -> Slot {
        let at = GLOBAL_OVERHEAD + row * SLOT_SIZE;
        Slot::read(&self.bytes()[at..at + SLOT_SIZE])
    }

    /// Slot of a variable-size row
    pub fn slot(&self, row: usize) -> Option<Slot> {
        (self.kind.is_variable() && row < self.rows).then(|| self.read_slot(row))
    }

    /// Value of `row`, `None` past the last row
    pub fn get(&self, row: usize) -> Option<Value<'_>> {
        if row >= self.rows {
            return None;
        }
        let bytes = self.bytes();
        let body = &bytes[GLOBAL_OVERHEAD..];
        let value = match self.kind {
            ValueKind::Integer => {
                Value::Integer(Integer(i32::from_ne_bytes(read_array(body, row * 4))))
            }
            ValueKind::Date => Value::Date(Date(i32::from_ne_bytes(read_array(body, row * 4)))),
            ValueKind::BigInt => {
                Value::BigInt(BigInt(i64::from_ne_bytes(read_array(body, row * 8))))
            }
            ValueKind::Numeric { length, precision } => Value::Numeric(Numeric::from_raw(
                i64::from_ne_bytes(read_array(body, row * 8)),
                length,
                precision,
            )),
            ValueKind::Timestamp => {
                Value::Timestamp(Timestamp(u64::from_ne_bytes(read_array(body, row * 8))))
            }
            ValueKind::Char { max_len: 1 } => Value::Char1(Char1(body[row])),
            ValueKind::Char { max_len } => {
                let stride = crate::types::string::char_stride(max_len);
                let image = &body[row * stride..(row + 1) * stride];
                Value::Char(FixedChar::read_image(image, max_len)?)
            }
            ValueKind::Varchar { max_len } => {
                let slot = self.read_slot(row);
                let start = slot.offset as usize;
                let end = start + slot.length as usize;
                Value::Varchar(Varchar::from_trusted(&bytes[start..end], max_len))
            }
        };
        Some(value)
    }

    /// Values in row order
    pub fn iter(&self) -> impl Iterator<Item = Value<'_>> + '_ {
        (0..self.rows).filter_map(move |row| self.get(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnAccumulator;
    use tempfile::TempDir;

    fn write_page(dir: &TempDir, kind: ValueKind, fields: &[&str]) -> PathBuf {
        let mut column = ColumnAccumulator::new(kind);
        for field in fields {
            column.append(kind.parse(field.as_bytes()).unwrap());
        }
        column.finalize(dir.path(), 0).unwrap().path
    }

    #[test]
    fn test_read_back_varchar() {
        let dir = TempDir::new().unwrap();
        let kind = ValueKind::Varchar { max_len: 10 };
        let path = write_page(&dir, kind, &["abc", "de", "f", ""]);

        let page = ColumnPage::open(&path, kind, 4).unwrap();
        let values: Vec<String> = page.iter().map(|v| v.to_string()).collect();
        assert_eq!(values, vec!["abc", "de", "f", ""]);
        assert_eq!(page.slot(1), Some(Slot { length: 2, offset: 65 }));
        assert!(page.get(4).is_none());
    }

    #[test]
    fn test_read_back_fixed() {
        let dir = TempDir::new().unwrap();
        let kind = ValueKind::Numeric {
            length: 15,
            precision: 2,
        };
        let path = write_page(&dir, kind, &["1.5", "-0.01", "100"]);

        let page = ColumnPage::open(&path, kind, 3).unwrap();
        let values: Vec<String> = page.iter().map(|v| v.to_string()).collect();
        assert_eq!(values, vec!["1.50", "-0.01", "100.00"]);
        assert!(page.slot(0).is_none());
    }

    #[test]
    fn test_wrong_row_count_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_page(&dir, ValueKind::Integer, &["1", "2", "3"]);

        let err = ColumnPage::open(&path, ValueKind::Integer, 4).err().unwrap();
        assert!(err.to_string().contains("expected 16"));
    }

    #[test]
    fn test_corrupt_slot_rejected() {
        let dir = TempDir::new().unwrap();
        let kind = ValueKind::Varchar { max_len: 10 };
        let path = write_page(&dir, kind, &["abc"]);

        let mut bytes = std::fs::read(&path).unwrap();
        bytes[8..16].copy_from_slice(&1000u64.to_ne_bytes());
        std::fs::write(&path, &bytes).unwrap();

        assert!(ColumnPage::open(&path, kind, 1).is_err());
    }

    #[test]
    fn test_unsupported_precision_rejected() {
        let dir = TempDir::new().unwrap();
        let stored = ValueKind::Numeric {
            length: 15,
            precision: 2,
        };
        let path = write_page(&dir, stored, &["1.5"]);

        let kind = ValueKind::Numeric {
            length: 15,
            precision: 19,
        };
        let err = ColumnPage::open(&path, kind, 1).err().unwrap();
        assert!(err.to_string().contains("precision 19"));
    }

    #[test]
    fn test_empty_page() {
        let dir = TempDir::new().unwrap();
        let path = write_page(&dir, ValueKind::Date, &[]);

        let page = ColumnPage::open(&path, ValueKind::Date, 0).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.iter().count(), 0);
    }
}

/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Column page files
//!
//! Every column of a loaded table becomes one file named
//! `<column index>.<type name>.bin`. The file is sized exactly to the page,
//! memory mapped read-write and filled in place.
//!
//! ## Layouts
//!
//! All numbers are native endian.
//!
//! - **Fixed size**: values back to back at the kind's stride, row order.
//!   `CHAR(n)` values carry a length indicator and zero fill.
//! - **Variable size** (`VARCHAR`): a table of `(length: u64, offset: u64)`
//!   slots, one per row in row order, followed by the string bytes. Bytes
//!   are placed from the end of the page backwards, so the first row's bytes
//!   sit last. Offsets are absolute from the start of the page.

use crate::column::ColumnAccumulator;
use crate::column::ColumnData;
use crate::column::GLOBAL_OVERHEAD;
use crate::column::PER_ITEM_OVERHEAD;
use crate::types::ValueKind;
use anyhow::Context;
use anyhow::Result;
use memmap2::MmapMut;
use std::fs::File;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// Size of one `(length, offset)` slot
pub const SLOT_SIZE: usize = PER_ITEM_OVERHEAD;

/// Slot locating one variable-size value inside its page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub length: u64,
    pub offset: u64,
}

impl Slot {
    pub fn write(&self, out: &mut [u8]) {
        out[..8].copy_from_slice(&self.length.to_ne_bytes());
        out[8..SLOT_SIZE].copy_from_slice(&self.offset.to_ne_bytes());
    }

    pub fn read(bytes: &[u8]) -> Slot {
        let mut length = [0u8; 8];
        let mut offset = [0u8; 8];
        length.copy_from_slice(&bytes[..8]);
        offset.copy_from_slice(&bytes[8..SLOT_SIZE]);
        Slot {
            length: u64::from_ne_bytes(length),
            offset: u64::from_ne_bytes(offset),
        }
    }
}

/// File name of a column's page
pub fn page_file_name(column: usize, kind: &ValueKind) -> String {
    format!("{}.{}.bin", column, kind.type_name())
}

/// Writable page file of a fixed size backed by a shared mapping.
///
/// Dropping an unflushed page still asks the OS to write it back, but only
/// [`PageFile::flush`] reports failures.
pub struct PageFile {
    path: PathBuf,
    file: File,
    mmap: Option<MmapMut>,
    flushed: bool,
}

impl PageFile {
    /// Create or truncate `path` and size it to `size` bytes
    pub fn create(path: &Path, size: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to create page file {}", path.display()))?;

        file.set_len(size as u64).with_context(|| {
            format!("Failed to size page file {} to {} bytes", path.display(), size)
        })?;

        // Zero-length files cannot be mapped
        let mmap = if size == 0 {
            None
        } else {
            // SAFETY: the file was just created and truncated by us, and no
            // other mapping of it exists in this process.
            let mmap = unsafe { MmapMut::map_mut(&file) }
                .with_context(|| format!("Failed to map page file {}", path.display()))?;
            Some(mmap)
        };

        Ok(PageFile {
            path: path.to_path_buf(),
            file,
            mmap,
            flushed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.mmap.as_ref().map_or(0, |mmap| mmap.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self.mmap.as_mut() {
            Some(mmap) => &mut mmap[..],
            None => &mut [],
        }
    }

    /// Write the mapping back and sync the file to disk
    pub fn flush(mut self) -> Result<()> {
        if let Some(mmap) = &self.mmap {
            mmap.flush()
                .with_context(|| format!("Failed to flush page file {}", self.path.display()))?;
        }
        self.file
            .sync_all()
            .with_context(|| format!("Failed to sync page file {}", self.path.display()))?;
        self.flushed = true;
        Ok(())
    }
}

impl Drop for PageFile {
    fn drop(&mut self) {
        if !self.flushed {
            if let Some(mmap) = &self.mmap {
                let _ = mmap.flush_async();
            }
        }
    }
}

/// Description of a page written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub column: usize,
    pub kind: ValueKind,
    pub path: PathBuf,
    pub file_name: String,
    pub rows: usize,
    pub size_bytes: usize,
}

impl ColumnAccumulator {
    /// Encode the buffered values into `buf`, which must be exactly
    /// [`ColumnAccumulator::output_size`] bytes long.
    pub fn encode_into(&self, buf: &mut [u8]) {
        assert_eq!(
            buf.len(),
            self.output_size(),
            "page buffer must match the accumulated size"
        );
        let body = &mut buf[GLOBAL_OVERHEAD..];

        match self.data() {
            ColumnData::Integer(values) | ColumnData::Date(values) => {
                for (out, value) in body.chunks_exact_mut(4).zip(values) {
                    out.copy_from_slice(&value.to_ne_bytes());
                }
            }
            ColumnData::BigInt(values) | ColumnData::Numeric(values) => {
                for (out, value) in body.chunks_exact_mut(8).zip(values) {
                    out.copy_from_slice(&value.to_ne_bytes());
                }
            }
            ColumnData::Timestamp(values) => {
                for (out, value) in body.chunks_exact_mut(8).zip(values) {
                    out.copy_from_slice(&value.to_ne_bytes());
                }
            }
            ColumnData::Char1(values) => body.copy_from_slice(values),
            ColumnData::Char { images, .. } => body.copy_from_slice(images),
            ColumnData::Varchar { bytes, ends, .. } => {
                encode_varchar(body, GLOBAL_OVERHEAD, bytes, ends)
            }
        }
    }

    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.output_size()];
        self.encode_into(&mut buf);
        buf
    }

    /// Write the page of column `column` into `dir` and flush it
    pub fn finalize(&self, dir: &Path, column: usize) -> Result<PageSummary> {
        let file_name = page_file_name(column, &self.kind());
        let path = dir.join(&file_name);
        let size = self.output_size();

        let mut page = PageFile::create(&path, size)?;
        self.encode_into(page.as_mut_slice());
        page.flush()?;

        debug!(
            column = column,
            kind = %self.kind(),
            rows = self.len(),
            size_bytes = size,
            path = %path.display(),
            "Wrote column page"
        );

        Ok(PageSummary {
            column,
            kind: self.kind(),
            path,
            file_name,
            rows: self.len(),
            size_bytes: size,
        })
    }
}

/// Slots first, bytes from the back of the page towards the slot table
fn encode_varchar(body: &mut [u8], base: usize, bytes: &[u8], ends: &[usize]) {
    let (slots, data) = body.split_at_mut(ends.len() * SLOT_SIZE);
    let data_start = base + slots.len();
    let mut offset = base + slots.len() + data.len();
    let mut start = 0;

    for (slot, &end) in slots.chunks_exact_mut(SLOT_SIZE).zip(ends) {
        let value = &bytes[start..end];
        offset -= value.len();
        data[offset - data_start..offset - data_start + value.len()].copy_from_slice(value);
        Slot {
            length: value.len() as u64,
            offset: offset as u64,
        }
        .write(slot);
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn column_of(kind: ValueKind, fields: &[&str]) -> ColumnAccumulator {
        let mut column = ColumnAccumulator::new(kind);
        for field in fields {
            column.append(kind.parse(field.as_bytes()).unwrap());
        }
        column
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name(0, &ValueKind::Integer), "0.integer.bin");
        assert_eq!(
            page_file_name(3, &ValueKind::Varchar { max_len: 152 }),
            "3.varchar.bin"
        );
    }

    #[test]
    fn test_integer_page_bytes() {
        let page = column_of(ValueKind::Integer, &["1", "2", "-3"]).encode_to_vec();
        let mut expected = Vec::new();
        for v in [1i32, 2, -3] {
            expected.extend_from_slice(&v.to_ne_bytes());
        }
        assert_eq!(page, expected);
    }

    #[test]
    fn test_varchar_layout() {
        let page =
            column_of(ValueKind::Varchar { max_len: 10 }, &["abc", "de", "f"]).encode_to_vec();
        assert_eq!(page.len(), 3 * SLOT_SIZE + 6);

        let slots: Vec<Slot> = page[..3 * SLOT_SIZE]
            .chunks_exact(SLOT_SIZE)
            .map(Slot::read)
            .collect();
        assert_eq!(slots[0], Slot { length: 3, offset: 51 });
        assert_eq!(slots[1], Slot { length: 2, offset: 49 });
        assert_eq!(slots[2], Slot { length: 1, offset: 48 });
        assert_eq!(&page[48..], b"fdeabc");
    }

    #[test]
    fn test_varchar_empty_string_points_at_cursor() {
        let page = column_of(ValueKind::Varchar { max_len: 10 }, &["ab", ""]).encode_to_vec();
        let second = Slot::read(&page[SLOT_SIZE..2 * SLOT_SIZE]);
        assert_eq!(second.length, 0);
        assert_eq!(second.offset, (2 * SLOT_SIZE) as u64);
    }

    #[test]
    fn test_finalize_writes_exact_size() {
        let dir = TempDir::new().unwrap();
        let column = column_of(ValueKind::Char { max_len: 25 }, &["ALGERIA", "BRAZIL"]);

        let summary = column.finalize(dir.path(), 1).unwrap();

        assert_eq!(summary.file_name, "1.char.bin");
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.size_bytes, 52);
        let bytes = std::fs::read(&summary.path).unwrap();
        assert_eq!(bytes.len(), 52);
        assert_eq!(bytes[0], 7);
        assert_eq!(&bytes[1..8], b"ALGERIA");
        assert_eq!(bytes[26], 6);
    }

    #[test]
    fn test_finalize_empty_column() {
        let dir = TempDir::new().unwrap();
        let column = ColumnAccumulator::new(ValueKind::Varchar { max_len: 10 });

        let summary = column.finalize(dir.path(), 0).unwrap();

        assert_eq!(summary.size_bytes, 0);
        assert_eq!(std::fs::metadata(&summary.path).unwrap().len(), 0);
    }
}

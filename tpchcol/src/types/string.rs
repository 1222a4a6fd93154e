/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Fixed and bounded length strings
//!
//! - `FixedChar` models `CHAR(n)`: leading blanks are trimmed on parse and the
//!   on-disk image is a length indicator followed by `n` bytes.
//! - `Char1` models `CHAR(1)` as a single byte; a blank counts as empty.
//! - `Varchar` models `VARCHAR(n)`: the span is taken verbatim.
//!
//! String values borrow their bytes from the input or from a mapped page.

use super::hash_bytes;
use crate::error::ParseError;
use std::cmp::Ordering;
use std::fmt;

const CHAR: &str = "char";
const VARCHAR: &str = "varchar";

/// Width of the length indicator that precedes a `CHAR(n)` image
pub const fn length_width(max_len: u32) -> usize {
    if max_len < 256 {
        1
    } else if max_len < 65536 {
        2
    } else {
        4
    }
}

/// Byte stride of a `CHAR(n)` value in a fixed-size page
pub const fn char_stride(max_len: u32) -> usize {
    if max_len == 1 {
        return 1;
    }
    let width = length_width(max_len);
    (width + max_len as usize).div_ceil(width) * width
}

fn check_capacity(kind: &'static str, bytes: &[u8], max_len: u32) -> Result<(), ParseError> {
    if bytes.len() > max_len as usize {
        return Err(ParseError::TooLong {
            kind,
            len: bytes.len(),
            max_len,
        });
    }
    Ok(())
}

fn write_lossy(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str(&String::from_utf8_lossy(bytes))
}

/// `CHAR(n)` value for `n > 1`
#[derive(Debug, Clone, Copy)]
pub struct FixedChar<'a> {
    bytes: &'a [u8],
    max_len: u32,
}

impl<'a> FixedChar<'a> {
    /// Parse a field, trimming leading blanks
    pub fn parse(bytes: &'a [u8], max_len: u32) -> Result<Self, ParseError> {
        let start = bytes.iter().position(|&c| c != b' ').unwrap_or(bytes.len());
        let bytes = &bytes[start..];
        check_capacity(CHAR, bytes, max_len)?;
        Ok(FixedChar { bytes, max_len })
    }

    /// Wrap bytes that are already known to fit
    pub(crate) fn from_trusted(bytes: &'a [u8], max_len: u32) -> Self {
        debug_assert!(bytes.len() <= max_len as usize);
        FixedChar { bytes, max_len }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn max_len(&self) -> u32 {
        self.max_len
    }

    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.bytes.starts_with(prefix)
    }

    pub fn hash(&self) -> u64 {
        hash_bytes(self.bytes)
    }

    /// Write the page image: native-endian length indicator, bytes, zero fill
    pub(crate) fn write_image(&self, out: &mut [u8]) {
        let width = length_width(self.max_len);
        let len = self.bytes.len();
        match width {
            1 => out[0] = len as u8,
            2 => out[..2].copy_from_slice(&(len as u16).to_ne_bytes()),
            _ => out[..4].copy_from_slice(&(len as u32).to_ne_bytes()),
        }
        out[width..width + len].copy_from_slice(self.bytes);
        out[width + len..].fill(0);
    }

    /// Read a page image written by [`FixedChar::write_image`]
    pub(crate) fn read_image(image: &'a [u8], max_len: u32) -> Option<Self> {
        let width = length_width(max_len);
        let len = match width {
            1 => usize::from(image[0]),
            2 => usize::from(u16::from_ne_bytes([image[0], image[1]])),
            _ => u32::from_ne_bytes([image[0], image[1], image[2], image[3]]) as usize,
        };
        if len > max_len as usize {
            return None;
        }
        Some(FixedChar::from_trusted(&image[width..width + len], max_len))
    }
}

impl PartialEq for FixedChar<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for FixedChar<'_> {}

impl PartialOrd for FixedChar<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedChar<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(other.bytes)
    }
}

impl fmt::Display for FixedChar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_lossy(f, self.bytes)
    }
}

/// `CHAR(1)` value stored as a single byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Char1(pub u8);

impl Char1 {
    /// Take the single byte of the field; an empty field is a blank
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        match bytes {
            [] => Ok(Char1(b' ')),
            [byte] => Ok(Char1(*byte)),
            _ => Err(ParseError::TooLong {
                kind: CHAR,
                len: bytes.len(),
                max_len: 1,
            }),
        }
    }

    /// Zero for a blank, one otherwise
    pub fn len(&self) -> usize {
        usize::from(self.0 != b' ')
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &std::slice::from_ref(&self.0)[..self.len()]
    }

    pub fn hash(&self) -> u64 {
        hash_bytes(self.as_bytes())
    }
}

impl fmt::Display for Char1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_lossy(f, self.as_bytes())
    }
}

/// `VARCHAR(n)` value
#[derive(Debug, Clone, Copy)]
pub struct Varchar<'a> {
    bytes: &'a [u8],
    max_len: u32,
}

impl<'a> Varchar<'a> {
    /// Take the field verbatim
    pub fn parse(bytes: &'a [u8], max_len: u32) -> Result<Self, ParseError> {
        check_capacity(VARCHAR, bytes, max_len)?;
        Ok(Varchar { bytes, max_len })
    }

    pub(crate) fn from_trusted(bytes: &'a [u8], max_len: u32) -> Self {
        Varchar { bytes, max_len }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn max_len(&self) -> u32 {
        self.max_len
    }

    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.bytes.starts_with(prefix)
    }

    pub fn ends_with(&self, suffix: &[u8]) -> bool {
        self.bytes.ends_with(suffix)
    }

    pub fn contains(&self, needle: &[u8]) -> bool {
        needle.is_empty() || self.bytes.windows(needle.len()).any(|w| w == needle)
    }

    pub fn hash(&self) -> u64 {
        hash_bytes(self.bytes)
    }
}

impl PartialEq for Varchar<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Varchar<'_> {}

impl PartialOrd for Varchar<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Varchar<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(other.bytes)
    }
}

impl fmt::Display for Varchar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_lossy(f, self.bytes)
    }
}

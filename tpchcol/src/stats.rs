/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Column statistics
//!
//! Summaries computed over read-back pages, used to eyeball a load.

use crate::manifest::TableManifest;
use crate::reader::ColumnPage;
use crate::types::BigInt;
use crate::types::Numeric;
use crate::types::Value;
use anyhow::Result;
use std::cmp::Ordering;
use std::path::Path;

/// Summary of one column page
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats<'a> {
    pub rows: usize,
    pub min: Option<Value<'a>>,
    pub max: Option<Value<'a>>,
    /// Sum of string lengths, for string kinds
    pub total_bytes: Option<usize>,
    /// Longest string, for string kinds
    pub max_bytes: Option<usize>,
    /// Sum of an `Integer` or `BigInt` column
    pub integer_sum: Option<BigInt>,
    /// Sum of a `Numeric` column at the column's precision
    pub numeric_sum: Option<Numeric>,
    /// XOR of all value hashes
    pub hash: u64,
}

impl<'a> ColumnStats<'a> {
    pub fn collect(page: &'a ColumnPage) -> Self {
        let mut stats = ColumnStats {
            rows: 0,
            min: None,
            max: None,
            total_bytes: None,
            max_bytes: None,
            integer_sum: None,
            numeric_sum: None,
            hash: 0,
        };

        for value in page.iter() {
            stats.rows += 1;
            stats.hash ^= value.hash();

            if stats
                .min
                .is_none_or(|min| value.partial_cmp(&min) == Some(Ordering::Less))
            {
                stats.min = Some(value);
            }
            if stats
                .max
                .is_none_or(|max| value.partial_cmp(&max) == Some(Ordering::Greater))
            {
                stats.max = Some(value);
            }

            if let Some(len) = value.byte_len() {
                *stats.total_bytes.get_or_insert(0) += len;
                let longest = stats.max_bytes.get_or_insert(0);
                *longest = (*longest).max(len);
            }

            match value {
                Value::Integer(v) => *stats.integer_sum.get_or_insert(BigInt(0)) += BigInt::from(v),
                Value::BigInt(v) => *stats.integer_sum.get_or_insert(BigInt(0)) += v,
                Value::Numeric(v) => {
                    let zero = Numeric::from_raw(0, v.length(), v.precision());
                    *stats.numeric_sum.get_or_insert(zero) += v;
                }
                _ => {}
            }
        }

        stats
    }

    /// Mean of a `Numeric` column, truncated to the column's precision
    pub fn numeric_average(&self) -> Option<Numeric> {
        let sum = self.numeric_sum?;
        if self.rows == 0 {
            return None;
        }
        Some(sum / Numeric::from_raw(self.rows as i64, sum.length(), 0))
    }
}

impl ColumnPage {
    pub fn stats(&self) -> ColumnStats<'_> {
        ColumnStats::collect(self)
    }
}

impl TableManifest {
    /// Print the manifest and per-column statistics of the table in `dir`
    pub fn print_stats(&self, dir: &Path) -> Result<()> {
        println!("\n=== TABLE {} ===", self.table);
        println!("Run: {}", self.run_id);
        println!("Loaded at: {}", self.loaded_at);
        println!("Rows: {}", self.row_count);
        println!("Columns: {}", self.columns.len());

        for column in &self.columns {
            let page = self.open_page(dir, column.index)?;
            let stats = page.stats();

            println!(
                "\n[{}] {} {} ({}, {} bytes)",
                column.index, column.name, column.kind, column.file, column.size_bytes
            );
            if let (Some(min), Some(max)) = (&stats.min, &stats.max) {
                println!("  min: {}", min);
                println!("  max: {}", max);
            }
            if let (Some(total), Some(longest)) = (stats.total_bytes, stats.max_bytes) {
                println!("  bytes: {} total, {} longest", total, longest);
            }
            if let Some(sum) = stats.integer_sum {
                println!("  sum: {}", sum);
            }
            if let Some(sum) = stats.numeric_sum {
                println!("  sum: {}", sum);
            }
            if let Some(average) = stats.numeric_average() {
                println!("  avg: {}", average);
            }
            println!("  hash: {:#018x}", stats.hash);
        }

        Ok(())
    }
}

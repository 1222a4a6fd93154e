/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Table manifest
//!
//! `manifest.json` records what a finished load produced: the row count and,
//! per column, its kind, page file and size. The loader writes it after every
//! page of the table is flushed, so a table directory without a manifest is
//! incomplete and must not be read.

use crate::page::PageSummary;
use crate::reader::ColumnPage;
use crate::schema::TableSchema;
use crate::types::ValueKind;
use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// One column's entry in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnManifest {
    pub index: usize,
    pub name: String,
    pub kind: ValueKind,
    pub type_name: String,
    pub file: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableManifest {
    /// Identifier shared by every table loaded in the same run
    pub run_id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub table: String,
    pub row_count: u64,
    pub columns: Vec<ColumnManifest>,
}

impl TableManifest {
    pub const FILENAME: &'static str = "manifest.json";

    pub fn new(run_id: Uuid, schema: &TableSchema, row_count: u64, pages: &[PageSummary]) -> Self {
        let columns = schema
            .columns
            .iter()
            .zip(pages)
            .map(|(column, page)| ColumnManifest {
                index: page.column,
                name: column.name.to_string(),
                kind: page.kind,
                type_name: page.kind.type_name().to_string(),
                file: page.file_name.clone(),
                size_bytes: page.size_bytes as u64,
            })
            .collect();

        TableManifest {
            run_id,
            loaded_at: Utc::now(),
            table: schema.name.to_string(),
            row_count,
            columns,
        }
    }

    /// Write the manifest into `dir`, replacing any previous one in a
    /// single rename
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize table manifest")?;

        let staging = dir.join(format!("{}.tmp", Self::FILENAME));
        let target = dir.join(Self::FILENAME);
        fs::write(&staging, content)
            .with_context(|| format!("Failed to write manifest {}", staging.display()))?;
        fs::rename(&staging, &target)
            .with_context(|| format!("Failed to publish manifest {}", target.display()))?;

        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(Self::FILENAME);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))
    }

    /// Remove the manifest of `dir` if there is one
    pub fn discard(dir: &Path) -> Result<()> {
        let path = dir.join(Self::FILENAME);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove stale manifest {}", path.display())),
        }
    }

    pub fn column(&self, index: usize) -> Option<&ColumnManifest> {
        self.columns.iter().find(|column| column.index == index)
    }

    /// Map the page of column `index` stored in `dir`
    pub fn open_page(&self, dir: &Path, index: usize) -> Result<ColumnPage> {
        let column = self
            .column(index)
            .ok_or_else(|| anyhow::anyhow!("Table '{}' has no column {}", self.table, index))?;
        ColumnPage::open(&dir.join(&column.file), column.kind, self.row_count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnAccumulator;
    use crate::schema::REGION;
    use tempfile::TempDir;

    fn region_pages(dir: &Path) -> Vec<PageSummary> {
        let rows: [[&str; 3]; 2] = [["0", "AFRICA", "lar deposits"], ["1", "AMERICA", "hs use"]];
        REGION
            .kinds()
            .enumerate()
            .map(|(index, kind)| {
                let mut column = ColumnAccumulator::new(kind);
                for row in &rows {
                    column.append(kind.parse(row[index].as_bytes()).unwrap());
                }
                column.finalize(dir, index).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_persist_and_load() {
        let dir = TempDir::new().unwrap();
        let pages = region_pages(dir.path());
        let manifest = TableManifest::new(Uuid::new_v4(), &REGION, 2, &pages);

        manifest.persist(dir.path()).unwrap();
        let loaded = TableManifest::load(dir.path()).unwrap();

        assert_eq!(loaded, manifest);
        assert_eq!(loaded.columns.len(), 3);
        assert_eq!(loaded.columns[1].file, "1.char.bin");
        assert_eq!(loaded.columns[1].kind, ValueKind::Char { max_len: 25 });
        assert_eq!(loaded.columns[2].size_bytes, 2 * 16 + 18);
        assert!(!dir.path().join("manifest.json.tmp").exists());
    }

    #[test]
    fn test_open_page_through_manifest() {
        let dir = TempDir::new().unwrap();
        let pages = region_pages(dir.path());
        let manifest = TableManifest::new(Uuid::new_v4(), &REGION, 2, &pages);

        let page = manifest.open_page(dir.path(), 1).unwrap();
        let names: Vec<String> = page.iter().map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["AFRICA", "AMERICA"]);
        assert!(manifest.open_page(dir.path(), 3).is_err());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ValueKind::Numeric {
            length: 15,
            precision: 2,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"numeric","length":15,"precision":2}"#);
    }

    #[test]
    fn test_discard_missing_manifest() {
        let dir = TempDir::new().unwrap();
        TableManifest::discard(dir.path()).unwrap();

        fs::write(dir.path().join(TableManifest::FILENAME), "{}").unwrap();
        TableManifest::discard(dir.path()).unwrap();
        assert!(!dir.path().join(TableManifest::FILENAME).exists());
    }
}

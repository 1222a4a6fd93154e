/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Table loading
//!
//! [`TableLoader`] converts one flat file into column pages: every row is
//! tokenized, each field parsed into its column's accumulator, and once the
//! input is exhausted each column is written as a page, followed by the
//! table manifest. Any tokenize or parse failure aborts the table before a
//! single page is created.
//!
//! [`load_all`] runs one loader per table on tokio's blocking pool. Tables
//! share nothing, so one failing table leaves the others untouched.

use crate::config::LoaderConfig;
use crate::dispatch::FieldDispatcher;
use crate::error::Cancelled;
use crate::error::FieldError;
use crate::manifest::TableManifest;
use crate::page::PageSummary;
use crate::schema::TableSchema;
use crate::tokenizer::Tokenizer;
use anyhow::Context;
use anyhow::Result;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;
use tracing::warn;
use uuid::Uuid;

/// Shared flag asking running loads to stop between rows
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of a successful table load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: String,
    pub rows: u64,
    pub output_dir: PathBuf,
    pub pages: Vec<PageSummary>,
}

/// Loads one table into its output directory
#[derive(Debug, Clone)]
pub struct TableLoader {
    schema: &'static TableSchema,
    output_dir: PathBuf,
    delimiter: u8,
    run_id: Uuid,
    cancel: CancelFlag,
}

impl TableLoader {
    pub fn new(schema: &'static TableSchema, output_dir: impl Into<PathBuf>) -> Self {
        TableLoader {
            schema,
            output_dir: output_dir.into(),
            delimiter: crate::config::DEFAULT_DELIMITER,
            run_id: Uuid::new_v4(),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn schema(&self) -> &'static TableSchema {
        self.schema
    }

    /// Load the table from the flat file at `input`
    #[instrument(skip(self), fields(table = %self.schema.name))]
    pub fn load(&self, input: &Path) -> Result<TableReport> {
        info!(input = %input.display(), "Loading table");
        let tokenizer = Tokenizer::open(input, self.delimiter, self.schema.len())?;
        self.load_rows(tokenizer)
    }

    /// Load the table from any byte stream
    pub fn load_reader<R: Read>(&self, input: R) -> Result<TableReport> {
        self.load_rows(Tokenizer::from_reader(input, self.delimiter, self.schema.len()))
    }

    fn load_rows<R: Read>(&self, mut tokenizer: Tokenizer<R>) -> Result<TableReport> {
        let start = Instant::now();
        let mut dispatcher = FieldDispatcher::for_schema(self.schema);

        while let Some(row) = tokenizer
            .next_row()
            .with_context(|| format!("Failed to read input of table '{}'", self.schema.name))?
        {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(row.index()));
            }
            for (column, span) in row.fields() {
                dispatcher
                    .dispatch(column, span)
                    .map_err(|source| FieldError {
                        row: row.index(),
                        column,
                        name: self.schema.columns[column].name.to_string(),
                        source,
                    })?;
            }
        }

        let rows = tokenizer.rows_read();
        if self.cancel.is_cancelled() {
            return Err(self.cancelled(rows));
        }
        debug!(rows, elapsed_ms = start.elapsed().as_millis() as u64, "Input parsed");

        let pages = self.write_pages(&dispatcher)?;
        TableManifest::new(self.run_id, self.schema, rows, &pages).persist(&self.output_dir)?;

        info!(
            table = %self.schema.name,
            rows,
            pages = pages.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Table loaded"
        );

        Ok(TableReport {
            table: self.schema.name.to_string(),
            rows,
            output_dir: self.output_dir.clone(),
            pages,
        })
    }

    fn write_pages(&self, dispatcher: &FieldDispatcher) -> Result<Vec<PageSummary>> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;
        // Pages are about to be replaced, so an older manifest no longer
        // describes the directory
        TableManifest::discard(&self.output_dir)?;

        dispatcher
            .columns()
            .iter()
            .enumerate()
            .map(|(index, column)| column.finalize(&self.output_dir, index))
            .collect()
    }

    fn cancelled(&self, rows: u64) -> anyhow::Error {
        warn!(table = %self.schema.name, rows, "Load cancelled");
        Cancelled {
            table: self.schema.name.to_string(),
            rows,
        }
        .into()
    }
}

/// Per-table result of [`load_all`]
#[derive(Debug)]
pub struct TableOutcome {
    pub table: &'static str,
    pub result: Result<TableReport>,
}

/// Load every configured table concurrently, reporting results in
/// configuration order
pub async fn load_all(config: &LoaderConfig, cancel: CancelFlag) -> Vec<TableOutcome> {
    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, tables = config.tables.len(), "Starting load run");

    let handles: Vec<_> = config
        .tables
        .iter()
        .map(|&schema| {
            let loader = TableLoader::new(schema, config.table_output_dir(schema))
                .with_delimiter(config.delimiter)
                .with_run_id(run_id)
                .with_cancel(cancel.clone());
            let input = config.input_path(schema);
            (
                schema.name,
                tokio::task::spawn_blocking(move || loader.load(&input)),
            )
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (table, handle) in handles {
        let result = match handle.await {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => {
                let message = format!("{:#}", e);
                error!(table, error = %message, "Table load failed");
                Err(e)
            }
            Err(e) => {
                error!(table, error = %e, "Table load task panicked");
                Err(anyhow::anyhow!("Load task for table '{}' panicked: {}", table, e))
            }
        };
        outcomes.push(TableOutcome { table, result });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::schema::NATION;
    use crate::schema::REGION;
    use tempfile::TempDir;

    const NATION_ROWS: &str = "1|ALGERIA|0| haggle. carefully final deposits|\n\
                               2|ARGENTINA|1|al foxes promise slyly|\n\
                               3|BRAZIL|1|y alongside of the pending deposits|\n";

    #[test]
    fn test_load_reader_writes_pages_and_manifest() {
        let dir = TempDir::new().unwrap();
        let loader = TableLoader::new(&NATION, dir.path().join("nation"));

        let report = loader.load_reader(NATION_ROWS.as_bytes()).unwrap();

        assert_eq!(report.rows, 3);
        assert_eq!(report.pages.len(), 4);
        assert_eq!(report.pages[0].size_bytes, 12);
        assert!(dir.path().join("nation").join("manifest.json").exists());
    }

    #[test]
    fn test_parse_error_carries_location() {
        let dir = TempDir::new().unwrap();
        let loader = TableLoader::new(&REGION, dir.path().join("region"));

        let err = loader
            .load_reader("0|AFRICA|x|\n1|AMERICA|y|\n1x|ASIA|z|\n".as_bytes())
            .unwrap_err();

        let field = err.downcast_ref::<FieldError>().unwrap();
        assert_eq!(field.row, 2);
        assert_eq!(field.column, 0);
        assert_eq!(field.name, "r_regionkey");
        assert!(matches!(field.source, ParseError::Format { .. }));
        assert!(!dir.path().join("region").exists());
    }

    #[test]
    fn test_cancelled_load_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let loader = TableLoader::new(&NATION, dir.path().join("nation")).with_cancel(cancel);

        let err = loader.load_reader(NATION_ROWS.as_bytes()).unwrap_err();

        let cancelled = err.downcast_ref::<Cancelled>().unwrap();
        assert_eq!(cancelled.table, "nation");
        assert_eq!(cancelled.rows, 0);
        assert!(!dir.path().join("nation").exists());
    }

    #[test]
    fn test_missing_input_file() {
        let dir = TempDir::new().unwrap();
        let loader = TableLoader::new(&NATION, dir.path().join("nation"));

        let err = loader.load(&dir.path().join("missing.tbl")).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.tbl"));
    }
}

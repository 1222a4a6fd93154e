/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Loader configuration
//!
//! Settings come from the environment:
//!
//! - `INPUT` (required): path prefix of the input files; a table is read
//!   from `<INPUT><table>.tbl`
//! - `OUTPUT`: root of the output tree, `output` when unset
//! - `DELIMITER`: single field separator byte, `|` when unset
//! - `TABLES`: comma-separated subset of tables to load, all when unset

use crate::schema;
use crate::schema::TableSchema;
use anyhow::Result;
use anyhow::bail;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_DELIMITER: u8 = b'|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub input_prefix: String,
    pub output_dir: PathBuf,
    pub delimiter: u8,
    pub tables: Vec<&'static TableSchema>,
}

impl LoaderConfig {
    /// Configuration for `input_prefix` with every other setting defaulted
    pub fn new(input_prefix: impl Into<String>) -> Self {
        LoaderConfig {
            input_prefix: input_prefix.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delimiter: DEFAULT_DELIMITER,
            tables: schema::ALL.iter().collect(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let Some(input_prefix) = lookup("INPUT").filter(|value| !value.is_empty()) else {
            bail!("INPUT is not set; point it at the directory prefix of the .tbl files");
        };
        let mut config = LoaderConfig::new(input_prefix);

        if let Some(output) = lookup("OUTPUT").filter(|value| !value.is_empty()) {
            config.output_dir = PathBuf::from(output);
        }

        if let Some(delimiter) = lookup("DELIMITER") {
            config.delimiter = match delimiter.as_bytes() {
                [byte] => *byte,
                _ => bail!("DELIMITER must be exactly one byte, got {:?}", delimiter),
            };
        }

        if let Some(tables) = lookup("TABLES").filter(|value| !value.trim().is_empty()) {
            config.tables = parse_tables(&tables)?;
        }

        Ok(config)
    }

    /// Input file of `schema`
    pub fn input_path(&self, schema: &TableSchema) -> PathBuf {
        PathBuf::from(format!("{}{}", self.input_prefix, schema.input_file_name()))
    }

    /// Directory receiving the pages of `schema`
    pub fn table_output_dir(&self, schema: &TableSchema) -> PathBuf {
        self.output_dir.join(schema.name)
    }
}

fn parse_tables(list: &str) -> Result<Vec<&'static TableSchema>> {
    let mut tables: Vec<&'static TableSchema> = Vec::new();
    for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let Some(schema) = schema::by_name(name) else {
            let known: Vec<&str> = schema::ALL.iter().map(|s| s.name).collect();
            bail!("Unknown table '{}' in TABLES, expected one of {}", name, known.join(", "));
        };
        if !tables.contains(&schema) {
            tables.push(schema);
        }
    }
    Ok(tables)
}

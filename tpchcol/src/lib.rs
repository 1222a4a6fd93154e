/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # tpchcol - Typed Columnar Pages for TPC-H Flat Files
//!
//! This library converts the `|`-separated output of TPC-H `dbgen` into one
//! binary page per column. Every field is parsed into a strongly typed value
//! (integers, fixed-point decimals, bounded strings, dates), buffered per
//! column and written once into an exactly sized, memory-mapped page file.
//!
//! ```rust,no_run
//! use tpchcol::loader::TableLoader;
//! use tpchcol::schema::NATION;
//!
//! let report = TableLoader::new(&NATION, "output/nation")
//!     .load("data/nation.tbl".as_ref())
//!     .unwrap();
//! println!("read {} rows for {}", report.rows, report.table);
//! ```

pub mod column;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod page;
pub mod reader;
pub mod schema;
pub mod stats;
pub mod tokenizer;
pub mod types;

pub use column::ColumnAccumulator;
pub use config::LoaderConfig;
pub use error::FieldError;
pub use error::ParseError;
pub use loader::CancelFlag;
pub use loader::TableLoader;
pub use loader::TableReport;
pub use loader::load_all;
pub use manifest::TableManifest;
pub use reader::ColumnPage;
pub use schema::TableSchema;
pub use types::Value;
pub use types::ValueKind;

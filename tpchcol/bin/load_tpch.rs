/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # TPC-H Loader
//!
//! Converts the `.tbl` files of a TPC-H data set into column pages.
//!
//! ## Usage
//!
//! ```bash
//! # Load all eight tables from /data/sf1/*.tbl into ./output/<table>/
//! INPUT=/data/sf1/ cargo run --bin load_tpch
//!
//! # Load two tables into a custom directory
//! INPUT=/data/sf1/ OUTPUT=/tmp/pages TABLES=nation,region cargo run --bin load_tpch
//! ```
//!
//! Logs go to stderr and honour `RUST_LOG`; stdout carries one
//! `read <rows> rows for <table>` line per loaded table.

use std::process::ExitCode;
use tpchcol::CancelFlag;
use tpchcol::LoaderConfig;
use tpchcol::load_all;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let config = match LoaderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        input = %config.input_prefix,
        output = %config.output_dir.display(),
        tables = config.tables.len(),
        "Configuration loaded"
    );

    let cancel = CancelFlag::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling running loads");
                cancel.cancel();
            }
        }
    });

    let outcomes = load_all(&config, cancel).await;

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => println!("read {} rows for {}", report.rows, report.table),
            Err(e) => {
                eprintln!("✗ Failed to load table '{}': {:#}", outcome.table, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!("✗ {} of {} tables failed", failed, outcomes.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Page Inspector
//!
//! Reads a loaded table directory through its manifest and prints
//! statistics for every column page.

use std::env;
use std::path::Path;
use std::process;
use tpchcol::TableManifest;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <table-dir>", args[0]);
        process::exit(1);
    }

    let dir = Path::new(&args[1]);

    let manifest = match TableManifest::load(dir) {
        Ok(manifest) => {
            println!("✓ Loaded manifest of table '{}'", manifest.table);
            manifest
        }
        Err(e) => {
            eprintln!("✗ Error reading table directory '{}': {:#}", dir.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = manifest.print_stats(dir) {
        eprintln!("✗ Error reading pages of '{}': {:#}", dir.display(), e);
        process::exit(1);
    }

    println!("\n✓ Analysis complete");
}

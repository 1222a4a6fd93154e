/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # TPC-H table schemas
//!
//! Column names and kinds of the eight TPC-H tables, typed after the
//! benchmark's DDL: `INTEGER` is `Integer`, `DECIMAL(15,2)` is
//! `Numeric(15,2)`, `CHAR(n)` and `VARCHAR(n)` keep their capacity and `DATE`
//! is `Date`.

use crate::types::ValueKind;

/// Name and kind of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ValueKind,
}

/// Ordered column list of one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, index: usize) -> Option<&ColumnDef> {
        self.columns.get(index)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ValueKind> + '_ {
        self.columns.iter().map(|column| column.kind)
    }

    /// File name of the table's `dbgen` output
    pub fn input_file_name(&self) -> String {
        format!("{}.tbl", self.name)
    }
}

const fn col(name: &'static str, kind: ValueKind) -> ColumnDef {
    ColumnDef { name, kind }
}

const INTEGER: ValueKind = ValueKind::Integer;
const DATE: ValueKind = ValueKind::Date;
const DECIMAL: ValueKind = ValueKind::Numeric {
    length: 15,
    precision: 2,
};

const fn fixed_char(max_len: u32) -> ValueKind {
    ValueKind::Char { max_len }
}

const fn varchar(max_len: u32) -> ValueKind {
    ValueKind::Varchar { max_len }
}

pub const NATION: TableSchema = TableSchema {
    name: "nation",
    columns: &[
        col("n_nationkey", INTEGER),
        col("n_name", fixed_char(25)),
        col("n_regionkey", INTEGER),
        col("n_comment", varchar(152)),
    ],
};

pub const CUSTOMER: TableSchema = TableSchema {
    name: "customer",
    columns: &[
        col("c_custkey", INTEGER),
        col("c_name", varchar(25)),
        col("c_address", varchar(40)),
        col("c_nationkey", INTEGER),
        col("c_phone", fixed_char(15)),
        col("c_acctbal", DECIMAL),
        col("c_mktsegment", fixed_char(10)),
        col("c_comment", varchar(117)),
    ],
};

pub const LINEITEM: TableSchema = TableSchema {
    name: "lineitem",
    columns: &[
        col("l_orderkey", INTEGER),
        col("l_partkey", INTEGER),
        col("l_suppkey", INTEGER),
        col("l_linenumber", INTEGER),
        col("l_quantity", DECIMAL),
        col("l_extendedprice", DECIMAL),
        col("l_discount", DECIMAL),
        col("l_tax", DECIMAL),
        col("l_returnflag", fixed_char(1)),
        col("l_linestatus", fixed_char(1)),
        col("l_shipdate", DATE),
        col("l_commitdate", DATE),
        col("l_receiptdate", DATE),
        col("l_shipinstruct", fixed_char(25)),
        col("l_shipmode", fixed_char(10)),
        col("l_comment", varchar(44)),
    ],
};

pub const ORDERS: TableSchema = TableSchema {
    name: "orders",
    columns: &[
        col("o_orderkey", INTEGER),
        col("o_custkey", INTEGER),
        col("o_orderstatus", fixed_char(1)),
        col("o_totalprice", DECIMAL),
        col("o_orderdate", DATE),
        col("o_orderpriority", fixed_char(15)),
        col("o_clerk", fixed_char(15)),
        col("o_shippriority", INTEGER),
        col("o_comment", varchar(79)),
    ],
};

pub const PART: TableSchema = TableSchema {
    name: "part",
    columns: &[
        col("p_partkey", INTEGER),
        col("p_name", varchar(55)),
        col("p_mfgr", fixed_char(25)),
        col("p_brand", fixed_char(10)),
        col("p_type", varchar(25)),
        col("p_size", INTEGER),
        col("p_container", fixed_char(10)),
        col("p_retailprice", DECIMAL),
        col("p_comment", varchar(23)),
    ],
};

pub const PARTSUPP: TableSchema = TableSchema {
    name: "partsupp",
    columns: &[
        col("ps_partkey", INTEGER),
        col("ps_suppkey", INTEGER),
        col("ps_availqty", INTEGER),
        col("ps_supplycost", DECIMAL),
        col("ps_comment", varchar(199)),
    ],
};

pub const REGION: TableSchema = TableSchema {
    name: "region",
    columns: &[
        col("r_regionkey", INTEGER),
        col("r_name", fixed_char(25)),
        col("r_comment", varchar(152)),
    ],
};

pub const SUPPLIER: TableSchema = TableSchema {
    name: "supplier",
    columns: &[
        col("s_suppkey", INTEGER),
        col("s_name", fixed_char(25)),
        col("s_address", varchar(40)),
        col("s_nationkey", INTEGER),
        col("s_phone", fixed_char(15)),
        col("s_acctbal", DECIMAL),
        col("s_comment", varchar(101)),
    ],
};

/// All tables in load order
pub static ALL: [TableSchema; 8] = [
    NATION, CUSTOMER, LINEITEM, ORDERS, PART, PARTSUPP, REGION, SUPPLIER,
];

pub fn by_name(name: &str) -> Option<&'static TableSchema> {
    ALL.iter().find(|schema| schema.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_counts() {
        let counts: Vec<(&str, usize)> = ALL.iter().map(|s| (s.name, s.len())).collect();
        assert_eq!(
            counts,
            vec![
                ("nation", 4),
                ("customer", 8),
                ("lineitem", 16),
                ("orders", 9),
                ("part", 9),
                ("partsupp", 5),
                ("region", 3),
                ("supplier", 7),
            ]
        );
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("nation"), Some(&NATION));
        assert_eq!(by_name("LINEITEM").map(|s| s.name), Some("lineitem"));
        assert!(by_name("nations").is_none());
    }

    #[test]
    fn test_lineitem_flags_are_single_bytes() {
        let flag = LINEITEM.column(8).unwrap();
        assert_eq!(flag.name, "l_returnflag");
        assert_eq!(flag.kind.fixed_width(), Some(1));
        assert_eq!(LINEITEM.input_file_name(), "lineitem.tbl");
    }
}

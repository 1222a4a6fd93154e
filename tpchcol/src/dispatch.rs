/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! Routes raw fields to the parser of their column's kind and on into that
//! column's accumulator.

use crate::column::ColumnAccumulator;
use crate::error::ParseError;
use crate::schema::TableSchema;
use crate::types::ValueKind;

#[derive(Debug, Clone)]
pub struct FieldDispatcher {
    columns: Vec<ColumnAccumulator>,
}

impl FieldDispatcher {
    pub fn new(kinds: impl IntoIterator<Item = ValueKind>) -> Self {
        FieldDispatcher {
            columns: kinds.into_iter().map(ColumnAccumulator::new).collect(),
        }
    }

    pub fn for_schema(schema: &TableSchema) -> Self {
        Self::new(schema.kinds())
    }

    /// Parse `span` as the kind of `column` and append it.
    ///
    /// # Panics
    ///
    /// If `column` is outside the schema.
    pub fn dispatch(&mut self, column: usize, span: &[u8]) -> Result<(), ParseError> {
        let count = self.columns.len();
        let Some(accumulator) = self.columns.get_mut(column) else {
            panic!("column index {} outside schema of {} columns", column, count);
        };
        let value = accumulator.kind().parse(span)?;
        accumulator.append(value);
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnAccumulator] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<ColumnAccumulator> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NATION;

    #[test]
    fn test_dispatch_nation_row() {
        let mut dispatcher = FieldDispatcher::for_schema(&NATION);
        let row: [&[u8]; 4] = [b"0", b"ALGERIA", b"0", b" haggle. carefully final"];
        for (column, span) in row.iter().enumerate() {
            dispatcher.dispatch(column, span).unwrap();
        }

        let columns = dispatcher.columns();
        assert_eq!(columns.len(), 4);
        assert!(columns.iter().all(|c| c.len() == 1));
        assert_eq!(columns[1].get(0).unwrap().to_string(), "ALGERIA");
        assert_eq!(
            columns[3].get(0).unwrap().to_string(),
            " haggle. carefully final"
        );
    }

    #[test]
    fn test_dispatch_reports_parse_error() {
        let mut dispatcher = FieldDispatcher::new([ValueKind::Integer]);
        let err = dispatcher.dispatch(0, b"x1").unwrap_err();
        assert!(matches!(err, ParseError::Format { kind: "integer", .. }));
        assert!(dispatcher.columns()[0].is_empty());
    }

    #[test]
    #[should_panic(expected = "outside schema")]
    fn test_dispatch_out_of_range_panics() {
        let mut dispatcher = FieldDispatcher::new([ValueKind::Integer]);
        let _ = dispatcher.dispatch(1, b"1");
    }
}

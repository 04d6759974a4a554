//! Depth-first layout of a JSON document onto a sheet.
//!
//! Keys go in the current column and their values one column to the right.
//! Sequence elements stay in the column of the sequence and stack downwards.
//! The row cursor is threaded explicitly: every call takes the row it starts
//! from and returns the first row still free after it.

use crate::core::grid::{CellValue, SheetGrid};
use serde_json::{Map, Value};

/// Shape of a JSON value as far as the layout is concerned.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Mapping(&'a Map<String, Value>),
    Sequence(&'a [Value]),
    Scalar(&'a Value),
}

impl<'a> Node<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Node::Mapping(map),
            Value::Array(items) => Node::Sequence(items),
            scalar => Node::Scalar(scalar),
        }
    }
}

/// Transcribes `value` into `sheet` starting below `row` at column `col` and
/// returns the next free row.
///
/// - a mapping writes its first key at `row + 1`, each value one column to
///   the right of its key;
/// - a sequence lays its elements out from `row` in the same column;
/// - a scalar is written at `row` (row 1 at the very top) and consumes it.
///
/// Empty mappings and sequences write nothing and return `row`.
pub fn write_tree(value: &Value, sheet: &mut SheetGrid, row: u32, col: u32) -> u32 {
    match Node::classify(value) {
        Node::Mapping(map) => write_mapping(map, sheet, row, col),
        Node::Sequence(items) => write_sequence(items, sheet, row, col),
        Node::Scalar(scalar) => write_scalar(scalar, sheet, row, col),
    }
}

fn write_mapping(map: &Map<String, Value>, sheet: &mut SheetGrid, row: u32, col: u32) -> u32 {
    if map.is_empty() {
        return row;
    }

    let mut working = row + 1;
    for (key, value) in map {
        sheet.set(working, col, CellValue::text(key.as_str()));
        let next = write_tree(value, sheet, working, col + 1);
        // An empty container below the key consumes nothing; the key row does.
        working = next.max(working + 1);
    }
    working
}

fn write_sequence(items: &[Value], sheet: &mut SheetGrid, row: u32, col: u32) -> u32 {
    items
        .iter()
        .fold(row, |working, item| write_tree(item, sheet, working, col))
}

fn write_scalar(value: &Value, sheet: &mut SheetGrid, row: u32, col: u32) -> u32 {
    let target = row.max(1);
    sheet.set(target, col, CellValue::from_json(value));
    target + 1
}

//! In-memory staging area for sheet writes.
//!
//! Every transcription step writes into a [`SheetGrid`]; grids are collected
//! into a [`WorkbookGrid`] and only reach the workbook file when the whole
//! run has succeeded.

use serde_json::Value;
use std::collections::BTreeMap;

/// Largest integer an `f64` cell can hold without losing digits.
const MAX_EXACT_INTEGER: u64 = 1 << 53;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Clears whatever the pre-provisioned sheet held at this position.
    Blank,
}

impl CellValue {
    /// Cell value for a JSON scalar. Arrays and objects are stored as compact
    /// JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Blank,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => number_cell(n),
            Value::String(s) => CellValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => CellValue::Text(value.to_string()),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// String shown for this cell when reading it back.
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            CellValue::Blank => String::new(),
        }
    }
}

fn number_cell(n: &serde_json::Number) -> CellValue {
    if let Some(i) = n.as_i64() {
        if i.unsigned_abs() <= MAX_EXACT_INTEGER {
            return CellValue::Number(i as f64);
        }
        return CellValue::Text(i.to_string());
    }
    if let Some(u) = n.as_u64() {
        if u <= MAX_EXACT_INTEGER {
            return CellValue::Number(u as f64);
        }
        return CellValue::Text(u.to_string());
    }
    match n.as_f64() {
        Some(f) => CellValue::Number(f),
        None => CellValue::Text(n.to_string()),
    }
}

/// Sparse 1-based cell map for a single sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    cells: BTreeMap<(u32, u32), CellValue>,
}

impl SheetGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` at (`row`, `col`), replacing anything staged there.
    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        debug_assert!(row >= 1 && col >= 1, "cells are 1-based");
        self.cells.insert((row, col), value);
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn max_row(&self) -> u32 {
        self.cells.keys().map(|(row, _)| *row).max().unwrap_or(0)
    }

    pub fn max_col(&self) -> u32 {
        self.cells.keys().map(|(_, col)| *col).max().unwrap_or(0)
    }

    /// Cells in row-major order as `((row, col), value)`.
    pub fn cells(&self) -> impl Iterator<Item = (&(u32, u32), &CellValue)> {
        self.cells.iter()
    }

    /// Copies every cell of `other` over this grid.
    pub fn merge(&mut self, other: SheetGrid) {
        self.cells.extend(other.cells);
    }
}

/// Staged writes for a whole workbook, keyed by sheet name.
#[derive(Debug, Clone, Default)]
pub struct WorkbookGrid {
    sheets: BTreeMap<String, SheetGrid>,
}

impl WorkbookGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sheet_name: &str, grid: SheetGrid) {
        self.sheets
            .entry(sheet_name.to_string())
            .or_default()
            .merge(grid);
    }

    pub fn sheet(&self, sheet_name: &str) -> Option<&SheetGrid> {
        self.sheets.get(sheet_name)
    }

    pub fn sheets(&self) -> impl Iterator<Item = (&String, &SheetGrid)> {
        self.sheets.iter()
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn cell_count(&self) -> usize {
        self.sheets.values().map(SheetGrid::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_conversion() {
        assert_eq!(CellValue::from_json(&json!(null)), CellValue::Blank);
        assert_eq!(CellValue::from_json(&json!(true)), CellValue::Bool(true));
        assert_eq!(CellValue::from_json(&json!(42)), CellValue::Number(42.0));
        assert_eq!(CellValue::from_json(&json!(19.99)), CellValue::Number(19.99));
        assert_eq!(CellValue::from_json(&json!("tv")), CellValue::text("tv"));
    }

    #[test]
    fn test_large_integers_stay_exact() {
        let big = json!(12345678901234567890u64);
        assert_eq!(
            CellValue::from_json(&big),
            CellValue::text("12345678901234567890")
        );
        assert_eq!(
            CellValue::from_json(&json!(-9007199254740993i64)),
            CellValue::text("-9007199254740993")
        );
    }

    #[test]
    fn test_containers_become_compact_json() {
        let value = json!({"b": 1, "a": [true, null]});
        assert_eq!(
            CellValue::from_json(&value),
            CellValue::text(r#"{"b":1,"a":[true,null]}"#)
        );
    }

    #[test]
    fn test_sheet_grid_bounds() {
        let mut grid = SheetGrid::new();
        assert_eq!(grid.max_row(), 0);
        grid.set(3, 2, CellValue::Number(1.0));
        grid.set(1, 5, CellValue::Blank);
        assert_eq!(grid.max_row(), 3);
        assert_eq!(grid.max_col(), 5);
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn test_workbook_grid_merges_same_sheet() {
        let mut first = SheetGrid::new();
        first.set(1, 1, CellValue::text("query"));
        let mut second = SheetGrid::new();
        second.set(2, 1, CellValue::text("sort"));

        let mut workbook = WorkbookGrid::new();
        workbook.insert("Search", first);
        workbook.insert("Search", second);

        assert_eq!(workbook.cell_count(), 2);
        assert_eq!(workbook.sheet_names().collect::<Vec<_>>(), vec!["Search"]);
    }
}

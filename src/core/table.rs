use crate::core::grid::{CellValue, SheetGrid};
use crate::domain::model::{ResponseDescriptor, ResponseKind};
use crate::utils::error::{CatalogError, Result};
use serde_json::{Map, Value};

/// Picks the value a dump-mode descriptor tabulates: the whole document, or
/// the top-level field named by its dump key.
pub fn select_records<'a>(
    descriptor: &ResponseDescriptor,
    document: &'a Value,
) -> Result<&'a Value> {
    match descriptor.dump_key.as_deref().filter(|key| !key.is_empty()) {
        None => Ok(document),
        Some(key) => document.get(key).ok_or_else(|| CatalogError::MissingField {
            response: descriptor.kind,
            field: key.to_string(),
        }),
    }
}

/// Writes `records` as a table: a header row of field names at `start_row`
/// followed by one row per record.
///
/// Records must be mappings sharing the same key set unless `sparse` is set,
/// in which case the columns are the union of all keys in first-seen order
/// and absent fields leave their cell empty.
pub fn write_table(
    records: &Value,
    sheet: &mut SheetGrid,
    descriptor: &ResponseDescriptor,
) -> Result<u32> {
    let kind = descriptor.kind;
    let items = records.as_array().ok_or_else(|| CatalogError::MalformedRecords {
        response: kind,
        reason: format!("expected a list of records, found {}", json_type(records)),
    })?;

    let rows = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object().ok_or_else(|| CatalogError::MalformedRecords {
                response: kind,
                reason: format!("record {} is {}, not an object", index, json_type(item)),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if rows.is_empty() {
        tracing::debug!("{}: no records to dump", kind);
        return Ok(descriptor.start_row);
    }

    let columns = if descriptor.sparse_records {
        union_columns(&rows)
    } else {
        uniform_columns(kind, &rows)?
    };

    let first_col = if descriptor.include_index { 2 } else { 1 };
    let header_row = descriptor.start_row;

    for (offset, name) in columns.iter().enumerate() {
        sheet.set(header_row, first_col + offset as u32, CellValue::text(name.as_str()));
    }

    for (index, record) in rows.iter().enumerate() {
        let row = header_row + 1 + index as u32;
        if descriptor.include_index {
            sheet.set(row, 1, CellValue::Number(index as f64));
        }
        for (offset, name) in columns.iter().enumerate() {
            if let Some(value) = record.get(name) {
                sheet.set(row, first_col + offset as u32, CellValue::from_json(value));
            }
        }
    }

    tracing::debug!(
        "{}: dumped {} records x {} columns at row {}",
        kind,
        rows.len(),
        columns.len(),
        header_row
    );

    Ok(header_row + 1 + rows.len() as u32)
}

fn uniform_columns(kind: ResponseKind, rows: &[&Map<String, Value>]) -> Result<Vec<String>> {
    let columns: Vec<String> = rows[0].keys().cloned().collect();

    for (index, record) in rows.iter().enumerate().skip(1) {
        if let Some(extra) = record.keys().find(|key| !rows[0].contains_key(key.as_str())) {
            return Err(CatalogError::MalformedRecords {
                response: kind,
                reason: format!("record {} has unexpected field '{}'", index, extra),
            });
        }
        if let Some(missing) = columns.iter().find(|key| !record.contains_key(key.as_str())) {
            return Err(CatalogError::MalformedRecords {
                response: kind,
                reason: format!("record {} lacks field '{}'", index, missing),
            });
        }
    }

    Ok(columns)
}

fn union_columns(rows: &[&Map<String, Value>]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in rows {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TranscribeMode;
    use serde_json::json;

    fn descriptor(start_row: u32) -> ResponseDescriptor {
        ResponseDescriptor {
            kind: ResponseKind::Search,
            file_name: "search.txt".to_string(),
            sheet_name: "Search".to_string(),
            start_row,
            mode: TranscribeMode::Dump,
            dump_key: Some("items".to_string()),
            header_attributes: vec![],
            include_index: false,
            sparse_records: false,
        }
    }

    #[test]
    fn test_n_records_produce_n_plus_one_rows() {
        let records = json!([
            {"itemId": 1, "name": "TV A", "salePrice": 99.0},
            {"itemId": 2, "name": "TV B", "salePrice": 149.0},
            {"itemId": 3, "name": "TV C", "salePrice": 199.0}
        ]);
        let mut sheet = SheetGrid::new();
        let next = write_table(&records, &mut sheet, &descriptor(7)).unwrap();

        assert_eq!(next, 11);
        assert_eq!(sheet.max_row() - 7 + 1, 4);
        assert_eq!(sheet.max_col(), 3);
        assert_eq!(sheet.get(7, 1), Some(&CellValue::text("itemId")));
        assert_eq!(sheet.get(7, 3), Some(&CellValue::text("salePrice")));
        assert_eq!(sheet.get(10, 2), Some(&CellValue::text("TV C")));
        assert!(sheet.get(6, 1).is_none());
    }

    #[test]
    fn test_record_order_independent_of_key_order() {
        let records = json!([{"a": 1, "b": 2}, {"b": 4, "a": 3}]);
        let mut sheet = SheetGrid::new();
        write_table(&records, &mut sheet, &descriptor(1)).unwrap();

        assert_eq!(sheet.get(3, 1), Some(&CellValue::Number(3.0)));
        assert_eq!(sheet.get(3, 2), Some(&CellValue::Number(4.0)));
    }

    #[test]
    fn test_non_uniform_records_are_rejected() {
        let records = json!([{"a": 1, "b": 2}, {"a": 3}]);
        let mut sheet = SheetGrid::new();
        let err = write_table(&records, &mut sheet, &descriptor(1)).unwrap_err();

        match err {
            CatalogError::MalformedRecords { response, reason } => {
                assert_eq!(response, ResponseKind::Search);
                assert!(reason.contains("record 1"));
                assert!(reason.contains("'b'"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_sparse_records_use_union_of_keys() {
        let records = json!([{"a": 1}, {"b": 2, "a": 3}]);
        let mut desc = descriptor(2);
        desc.sparse_records = true;
        let mut sheet = SheetGrid::new();
        write_table(&records, &mut sheet, &desc).unwrap();

        assert_eq!(sheet.get(2, 2), Some(&CellValue::text("b")));
        assert!(sheet.get(3, 2).is_none());
        assert_eq!(sheet.get(4, 2), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_index_column_shifts_fields() {
        let records = json!([{"name": "x"}, {"name": "y"}]);
        let mut desc = descriptor(1);
        desc.include_index = true;
        let mut sheet = SheetGrid::new();
        write_table(&records, &mut sheet, &desc).unwrap();

        assert!(sheet.get(1, 1).is_none());
        assert_eq!(sheet.get(1, 2), Some(&CellValue::text("name")));
        assert_eq!(sheet.get(2, 1), Some(&CellValue::Number(0.0)));
        assert_eq!(sheet.get(3, 1), Some(&CellValue::Number(1.0)));
        assert_eq!(sheet.get(3, 2), Some(&CellValue::text("y")));
    }

    #[test]
    fn test_non_list_selection_is_rejected() {
        let mut sheet = SheetGrid::new();
        let err = write_table(&json!({"a": 1}), &mut sheet, &descriptor(1)).unwrap_err();
        assert!(err.to_string().contains("expected a list of records"));

        let err = write_table(&json!([1, 2]), &mut sheet, &descriptor(1)).unwrap_err();
        assert!(err.to_string().contains("record 0 is a number"));
    }

    #[test]
    fn test_empty_list_writes_nothing() {
        let mut sheet = SheetGrid::new();
        let next = write_table(&json!([]), &mut sheet, &descriptor(5)).unwrap();
        assert_eq!(next, 5);
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_missing_dump_key() {
        let document = json!({"query": "tv"});
        let err = select_records(&descriptor(7), &document).unwrap_err();
        match err {
            CatalogError::MissingField { response, field } => {
                assert_eq!(response, ResponseKind::Search);
                assert_eq!(field, "items");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_dump_key_selects_whole_document() {
        let mut desc = descriptor(1);
        desc.dump_key = Some(String::new());
        let document = json!([{"a": 1}]);
        assert_eq!(select_records(&desc, &document).unwrap(), &document);
    }
}

use crate::core::grid::{CellValue, SheetGrid};
use crate::domain::model::ResponseDescriptor;
use crate::utils::error::{CatalogError, Result};
use serde_json::Value;

/// Writes the descriptor's header attributes as name/value pairs in columns
/// 1 and 2, one per row from row 1. Every attribute must be a top-level field
/// of `document`; nothing is written when one is missing.
pub fn write_header_block(
    descriptor: &ResponseDescriptor,
    document: &Value,
    sheet: &mut SheetGrid,
) -> Result<()> {
    let values = descriptor
        .header_attributes
        .iter()
        .map(|name| {
            document
                .get(name)
                .map(|value| (name, value))
                .ok_or_else(|| CatalogError::MissingField {
                    response: descriptor.kind,
                    field: name.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    for (row, (name, value)) in (1u32..).zip(values) {
        sheet.set(row, 1, CellValue::text(name.as_str()));
        sheet.set(row, 2, CellValue::from_json(value));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ResponseKind, TranscribeMode};
    use serde_json::json;

    fn descriptor(attributes: &[&str]) -> ResponseDescriptor {
        ResponseDescriptor {
            kind: ResponseKind::PaginatedProducts,
            file_name: "paginatedProducts.txt".to_string(),
            sheet_name: "Paginated Products".to_string(),
            start_row: 5,
            mode: TranscribeMode::Dump,
            dump_key: Some("items".to_string()),
            header_attributes: attributes.iter().map(|a| a.to_string()).collect(),
            include_index: false,
            sparse_records: false,
        }
    }

    #[test]
    fn test_attributes_written_in_order() {
        let document = json!({
            "items": [],
            "totalPages": 12,
            "category": "1105910",
            "nextPage": "/v1/paginated/items?page=2"
        });
        let mut sheet = SheetGrid::new();
        write_header_block(
            &descriptor(&["category", "nextPage", "totalPages"]),
            &document,
            &mut sheet,
        )
        .unwrap();

        assert_eq!(sheet.get(1, 1), Some(&CellValue::text("category")));
        assert_eq!(sheet.get(1, 2), Some(&CellValue::text("1105910")));
        assert_eq!(sheet.get(2, 1), Some(&CellValue::text("nextPage")));
        assert_eq!(sheet.get(3, 2), Some(&CellValue::Number(12.0)));
        assert_eq!(sheet.len(), 6);
    }

    #[test]
    fn test_missing_attribute_fails_without_writing() {
        let document = json!({"category": "1105910"});
        let mut sheet = SheetGrid::new();
        let err = write_header_block(&descriptor(&["category", "format"]), &document, &mut sheet)
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::MissingField {
                response: ResponseKind::PaginatedProducts,
                ref field,
            } if field == "format"
        ));
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_no_attributes_is_noop() {
        let mut sheet = SheetGrid::new();
        write_header_block(&descriptor(&[]), &json!([1, 2]), &mut sheet).unwrap();
        assert!(sheet.is_empty());
    }
}

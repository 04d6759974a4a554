#![allow(dead_code)]

use catalog_sheets::CatalogConfig;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub const SHEETS: [&str; 4] = ["Search", "Product Lookup", "Paginated Products", "Taxonomy"];

/// Creates a workbook holding `sheets`, the way an operator prepares it.
pub fn provision_workbook(dir: &Path, sheets: &[&str]) -> PathBuf {
    let path = dir.join("WalmartAPIDemo.xlsx");
    let mut book = umya_spreadsheet::new_file();
    for name in sheets {
        book.new_sheet(*name).unwrap();
    }
    umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();
    path
}

pub fn cell(path: &Path, sheet: &str, row: u32, col: u32) -> String {
    let book = umya_spreadsheet::reader::xlsx::read(path).unwrap();
    book.get_sheet_by_name(sheet).unwrap().get_value((col, row))
}

pub fn config(base_url: &str, responses_dir: &Path, workbook: &Path) -> CatalogConfig {
    let responses_dir = responses_dir.to_str().unwrap().replace('\\', "/");
    let workbook = workbook.to_str().unwrap().replace('\\', "/");
    let toml_content = format!(
        r#"
[fetch]
base_url = "{base_url}"
output_dir = "{responses_dir}"
api_key = "test-key"
timeout_seconds = 5

[transcribe]
input_dir = "{responses_dir}"
workbook = "{workbook}"
"#
    );
    CatalogConfig::from_toml_str(&toml_content).unwrap()
}

pub fn search_response() -> Value {
    json!({
        "query": "tv",
        "sort": "bestseller",
        "responseGroup": "full",
        "totalResults": 1234,
        "start": 1,
        "numItems": 2,
        "items": [
            {"itemId": 101, "name": "Roku TV 32\"", "salePrice": 129.0, "stock": "Available"},
            {"itemId": 102, "name": "LG 55\" OLED", "salePrice": 1299.0, "stock": "Limited"}
        ]
    })
}

pub fn product_lookup_response() -> Value {
    json!({
        "itemId": 46784935,
        "name": "Samsung 40\" LED TV",
        "categoryPath": "Electronics/TV & Video",
        "giftOptions": {},
        "imageEntities": [
            {"thumbnailImage": "a.jpg", "entityType": "PRIMARY"},
            {"thumbnailImage": "b.jpg", "entityType": "SECONDARY"}
        ],
        "availableOnline": true
    })
}

pub fn paginated_response() -> Value {
    json!({
        "category": "1105910",
        "format": "json",
        "nextPage": "/v1/paginated/items?category=1105910&page=2",
        "totalPages": 3,
        "items": [
            {"itemId": 201, "name": "HDMI Cable"},
            {"itemId": 202, "name": "Wall Mount"},
            {"itemId": 203, "name": "Soundbar"}
        ]
    })
}

pub fn taxonomy_response() -> Value {
    json!({
        "categories": [
            {
                "id": "3944",
                "name": "Electronics",
                "children": [
                    {"id": "3944_1060825", "name": "TV & Video"}
                ]
            }
        ]
    })
}

pub fn write_responses(dir: &Path) {
    let files = [
        ("search.txt", search_response()),
        ("productLookup.txt", product_lookup_response()),
        ("paginatedProducts.txt", paginated_response()),
        ("taxonomy.txt", taxonomy_response()),
    ];
    std::fs::create_dir_all(dir).unwrap();
    for (name, body) in files {
        std::fs::write(dir.join(name), serde_json::to_vec(&body).unwrap()).unwrap();
    }
}

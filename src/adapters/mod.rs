// Adapters layer: concrete implementations for the file system and the
// spreadsheet workbook.

pub mod storage;
pub mod workbook;

//! Pre-provisioned `.xlsx` workbook backed by `umya-spreadsheet`.
//!
//! The workbook is read once, receives every staged cell in memory and is
//! written back through a temporary file that replaces the original only
//! after the write completed.

use crate::core::grid::{CellValue, WorkbookGrid};
use crate::utils::error::{CatalogError, Result};
use std::path::{Path, PathBuf};
use umya_spreadsheet::Spreadsheet;

pub struct Workbook {
    path: PathBuf,
    book: Spreadsheet,
}

impl Workbook {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(CatalogError::Workbook {
                message: format!(
                    "'{}' does not exist; the workbook and its sheets must be created beforehand",
                    path.display()
                ),
            });
        }

        let book = umya_spreadsheet::reader::xlsx::read(&path).map_err(|e| CatalogError::Workbook {
            message: format!("cannot read '{}': {}", path.display(), e),
        })?;

        tracing::debug!(
            "Opened workbook {} with sheets {:?}",
            path.display(),
            sheet_names(&book)
        );

        Ok(Self { path, book })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        sheet_names(&self.book)
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.book.get_sheet_by_name(name).is_some()
    }

    /// Fails on the first sheet in `names` the workbook does not contain.
    pub fn ensure_sheets<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        for name in names {
            if !self.has_sheet(name) {
                return Err(CatalogError::SheetNotFound {
                    sheet: name.to_string(),
                    workbook: self.path.display().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Copies every staged cell into the in-memory workbook. All target
    /// sheets are checked before the first cell is touched.
    pub fn apply(&mut self, grid: &WorkbookGrid) -> Result<usize> {
        self.ensure_sheets(grid.sheet_names())?;

        let mut written = 0;
        for (sheet_name, sheet_grid) in grid.sheets() {
            let Some(sheet) = self.book.get_sheet_by_name_mut(sheet_name) else {
                return Err(CatalogError::SheetNotFound {
                    sheet: sheet_name.clone(),
                    workbook: self.path.display().to_string(),
                });
            };

            for (&(row, col), value) in sheet_grid.cells() {
                let cell = sheet.get_cell_mut((col, row));
                match value {
                    CellValue::Text(text) => {
                        cell.set_value_string(text.as_str());
                    }
                    CellValue::Number(number) => {
                        cell.set_value_number(*number);
                    }
                    CellValue::Bool(flag) => {
                        cell.set_value_bool(*flag);
                    }
                    CellValue::Blank => {
                        cell.set_value_string("");
                    }
                }
                written += 1;
            }
            tracing::debug!("Sheet '{}': {} cells staged", sheet_name, sheet_grid.len());
        }

        Ok(written)
    }

    /// Writes the workbook next to the original and renames it into place.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(".catalog-sheets-")
            .suffix(".xlsx")
            .tempfile_in(&dir)?;

        umya_spreadsheet::writer::xlsx::write_writer(&self.book, &mut temp).map_err(|e| {
            CatalogError::Workbook {
                message: format!("cannot write '{}': {}", self.path.display(), e),
            }
        })?;

        temp.persist(&self.path)
            .map_err(|e| CatalogError::IoError(e.error))?;

        tracing::info!("Saved workbook {}", self.path.display());
        Ok(())
    }

    /// Text of a cell as the workbook currently holds it, 1-based.
    pub fn cell_text(&self, sheet: &str, row: u32, col: u32) -> Option<String> {
        self.book
            .get_sheet_by_name(sheet)
            .map(|ws| ws.get_value((col, row)))
    }
}

fn sheet_names(book: &Spreadsheet) -> Vec<String> {
    book.get_sheet_collection()
        .iter()
        .map(|ws| ws.get_name().to_string())
        .collect()
}

/// Opens `path`, applies `grid` and saves, leaving the file untouched when
/// any step fails.
pub fn commit(path: impl AsRef<Path>, grid: &WorkbookGrid) -> Result<usize> {
    let mut workbook = Workbook::open(path)?;
    let written = workbook.apply(grid)?;
    workbook.save()?;
    Ok(written)
}

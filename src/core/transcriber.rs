use crate::core::grid::{SheetGrid, WorkbookGrid};
use crate::core::header::write_header_block;
use crate::core::table::{select_records, write_table};
use crate::core::tree::{write_tree, Node};
use crate::domain::model::{ResponseDescriptor, TranscribeMode};
use crate::domain::ports::Storage;
use crate::utils::error::{CatalogError, ResponseFailure, Result, Stage};
use serde_json::Value;

/// Lays a parsed response out on a fresh grid: header block first, then the
/// body in the descriptor's mode.
pub fn transcribe_document(descriptor: &ResponseDescriptor, document: &Value) -> Result<SheetGrid> {
    let mut sheet = SheetGrid::new();
    write_header_block(descriptor, document, &mut sheet)?;

    match descriptor.mode {
        TranscribeMode::Dump => {
            let records = select_records(descriptor, document)?;
            write_table(records, &mut sheet, descriptor)?;
        }
        TranscribeMode::Walk => {
            let next = write_tree(document, &mut sheet, walk_entry_row(descriptor, document), 1);
            tracing::debug!(
                "{}: walked document down to row {}",
                descriptor.kind,
                next.saturating_sub(1)
            );
        }
    }

    Ok(sheet)
}

/// Row handed to the walk so that the first cell lands on `start_row`. A
/// mapping writes its first key one row below the row it is given; sequences
/// and scalars write on it.
fn walk_entry_row(descriptor: &ResponseDescriptor, document: &Value) -> u32 {
    match Node::classify(document) {
        Node::Mapping(_) => descriptor.start_row.saturating_sub(1),
        Node::Sequence(_) | Node::Scalar(_) => descriptor.start_row,
    }
}

/// Reads stored responses and stages their sheet writes.
pub struct Transcriber<S: Storage> {
    storage: S,
}

impl<S: Storage> Transcriber<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn load_document(&self, descriptor: &ResponseDescriptor) -> Result<Value> {
        let data = self
            .storage
            .read_file(&descriptor.file_name)
            .await
            .map_err(|e| match e {
                CatalogError::IoError(source) => CatalogError::ReadResponse {
                    response: descriptor.kind,
                    path: descriptor.file_name.clone(),
                    source,
                },
                other => other,
            })?;

        serde_json::from_slice(&data).map_err(|source| CatalogError::InvalidJson {
            response: descriptor.kind,
            source,
        })
    }

    pub async fn transcribe(&self, descriptor: &ResponseDescriptor) -> Result<SheetGrid> {
        let document = self.load_document(descriptor).await?;
        transcribe_document(descriptor, &document)
    }

    /// Transcribes every descriptor. Failures do not stop later responses but
    /// are returned together, and no grid is produced when any occurred.
    pub async fn transcribe_all(&self, descriptors: &[ResponseDescriptor]) -> Result<WorkbookGrid> {
        let mut workbook = WorkbookGrid::new();
        let mut failures = Vec::new();

        for descriptor in descriptors {
            match self.transcribe(descriptor).await {
                Ok(sheet) => {
                    tracing::info!(
                        "✅ {}: {} cells staged for sheet '{}'",
                        descriptor.kind,
                        sheet.len(),
                        descriptor.sheet_name
                    );
                    workbook.insert(&descriptor.sheet_name, sheet);
                }
                Err(error) => {
                    tracing::error!("❌ {}: transcription failed: {}", descriptor.kind, error);
                    failures.push(ResponseFailure {
                        response: descriptor.kind,
                        error,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(workbook)
        } else {
            Err(CatalogError::ResponsesFailed {
                stage: Stage::Transcribe,
                failures,
            })
        }
    }
}

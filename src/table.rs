//! CSV input and output for document batches.

use csv_async::{AsyncReaderBuilder, AsyncWriter};
use futures_util::StreamExt;
use std::path::Path;
use thiserror::Error;
use tokio::fs::File;
use tracing::{debug, info};

use crate::schema::document::{Document, DocumentId, GeneratedSentence, Selection};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("column '{0}' not found in header")]
    MissingColumn(String),
}

/// Read documents from a CSV file with a header row.
///
/// `text_column` must exist. If `id_column` is absent from the header, or a
/// row leaves it empty, the row's zero-based position is used as its id.
/// Short rows read as empty text.
pub async fn read_documents(
    path: impl AsRef<Path>,
    text_column: &str,
    id_column: &str,
) -> Result<Vec<Document>, TableError> {
    let file = File::open(path.as_ref()).await?;
    let mut reader = AsyncReaderBuilder::new().flexible(true).create_reader(file);

    let headers = reader.headers().await?.clone();
    let text_index = headers
        .iter()
        .position(|h| h.trim() == text_column)
        .ok_or_else(|| TableError::MissingColumn(text_column.to_string()))?;
    let id_index = headers.iter().position(|h| h.trim() == id_column);
    if id_index.is_none() {
        debug!(column = id_column, "no id column, numbering rows");
    }

    let mut documents = Vec::new();
    let mut records = reader.records();
    while let Some(record) = records.next().await {
        let record = record?;
        let row = documents.len();

        let id = id_index
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(DocumentId::from)
            .unwrap_or_else(|| DocumentId::from(row));
        let text = record.get(text_index).unwrap_or_default();

        documents.push(Document::new(id, text));
    }

    info!(path = %path.as_ref().display(), documents = documents.len(), "read documents");
    Ok(documents)
}

/// Write one `id,combined_sentence` row per selection.
pub async fn write_selections(path: impl AsRef<Path>, selections: &[Selection]) -> Result<(), TableError> {
    let file = File::create(path.as_ref()).await?;
    let mut writer = AsyncWriter::from_writer(file);

    writer.write_record(["id", "combined_sentence"]).await?;
    for selection in selections {
        writer
            .write_record([selection.document.0.as_str(), selection.combined.as_str()])
            .await?;
    }
    writer.flush().await?;

    info!(path = %path.as_ref().display(), rows = selections.len(), "wrote selections");
    Ok(())
}

/// Write one `id,sentence` row per candidate sentence.
pub async fn write_candidates(path: impl AsRef<Path>, candidates: &[GeneratedSentence]) -> Result<(), TableError> {
    let file = File::create(path.as_ref()).await?;
    let mut writer = AsyncWriter::from_writer(file);

    writer.write_record(["id", "sentence"]).await?;
    for candidate in candidates {
        writer
            .write_record([candidate.document.0.as_str(), candidate.text().as_str()])
            .await?;
    }
    writer.flush().await?;

    info!(path = %path.as_ref().display(), rows = candidates.len(), "wrote candidates");
    Ok(())
}

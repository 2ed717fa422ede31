use std::path::{Path, PathBuf};

use base64::Engine as _;
use engine_logging::engine_info;
use refinery_core::{Facet, PageResult};

use crate::filename::deterministic_filename;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::BatchArchive;

pub const BATCH_ARCHIVE_FILENAME: &str = "batch_scrape.zip";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("{facet} payload is not valid base64: {source}")]
    Base64 {
        facet: Facet,
        #[source]
        source: base64::DecodeError,
    },
}

/// Writes the page as a markdown document, plus its screenshot and PDF when
/// the service returned them. Returns the written paths in that order.
pub fn export_page(
    dir: &Path,
    page: &PageResult,
    exported_utc: &str,
) -> Result<Vec<PathBuf>, ExportError> {
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let title = Some(page.title.as_str());
    let mut written = Vec::new();

    let document = build_markdown_document(page, exported_utc);
    written.push(writer.write(
        &deterministic_filename(title, &page.url, "md"),
        document.as_bytes(),
    )?);

    if let Some(encoded) = &page.screenshot_base64 {
        let bytes = decode_payload(Facet::Screenshot, encoded)?;
        written.push(writer.write(&deterministic_filename(title, &page.url, "png"), &bytes)?);
    }
    if let Some(encoded) = &page.pdf_base64 {
        let bytes = decode_payload(Facet::Document, encoded)?;
        written.push(writer.write(&deterministic_filename(title, &page.url, "pdf"), &bytes)?);
    }

    engine_info!("Exported {} file(s) for {}", written.len(), page.url);
    Ok(written)
}

/// Writes map links one per line, in service order.
pub fn export_links(dir: &Path, source: &str, links: &[String]) -> Result<PathBuf, ExportError> {
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let mut content = links.join("\n");
    content.push('\n');
    let path = writer.write(
        &deterministic_filename(Some("links"), source, "txt"),
        content.as_bytes(),
    )?;
    engine_info!("Exported {} link(s) for {} to {:?}", links.len(), source, path);
    Ok(path)
}

pub fn save_archive(dir: &Path, archive: &BatchArchive) -> Result<PathBuf, ExportError> {
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let path = writer.write(BATCH_ARCHIVE_FILENAME, &archive.bytes)?;
    engine_info!(
        "Saved batch archive ({} bytes, {:?}) to {:?}",
        archive.bytes.len(),
        archive.content_type,
        path
    );
    Ok(path)
}

fn build_markdown_document(page: &PageResult, exported_utc: &str) -> String {
    let title = if page.title.trim().is_empty() {
        "untitled"
    } else {
        page.title.as_str()
    };
    let mut doc = format!(
        "---\nurl: {url}\ntitle: {title}\nexported_utc: {exported_utc}\noriginal_length: {original}\ncleaned_length: {cleaned}\n---\n\n",
        url = page.url,
        original = page.metadata.original_length,
        cleaned = page.metadata.cleaned_length,
    );
    if let Some(summary) = page.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        doc.push_str("> ");
        doc.push_str(&summary.trim().replace('\n', "\n> "));
        doc.push_str("\n\n");
    }
    doc.push_str(&page.markdown_content);
    if !doc.ends_with('\n') {
        doc.push('\n');
    }
    doc
}

fn decode_payload(facet: Facet, encoded: &str) -> Result<Vec<u8>, ExportError> {
    // Tolerate data URLs, which some renderers hand back instead of bare base64.
    let bare = encoded
        .split_once(";base64,")
        .map_or(encoded, |(_, data)| data)
        .trim();
    base64::engine::general_purpose::STANDARD
        .decode(bare)
        .map_err(|source| ExportError::Base64 { facet, source })
}

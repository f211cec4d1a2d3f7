//! Per-format text extraction.
//!
//! Plain text is read verbatim, markdown has its block structure stripped,
//! and PDFs are extracted page by page (one [`Document`] per page).

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{RagChatError, Result};

/// File extensions recognized by the loader. Anything else is skipped.
pub(crate) const SUPPORTED_EXTENSIONS: [&str; 3] = ["txt", "md", "pdf"];

/// Extract the documents contained in one file, dispatching on extension.
pub(crate) async fn extract_file(path: &Path) -> Result<Vec<Document>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => extract_plain_text(path).await,
        "md" => extract_markdown(path).await,
        "pdf" => extract_pdf(path).await,
        other => {
            Err(RagChatError::Ingestion(format!("unsupported extension '{other}'")))
        }
    }
}

fn base_metadata(path: &Path, format: &str) -> HashMap<String, String> {
    HashMap::from([
        ("source".to_string(), path.display().to_string()),
        ("format".to_string(), format.to_string()),
    ])
}

async fn extract_plain_text(path: &Path) -> Result<Vec<Document>> {
    let text = read_to_string(path).await?;
    Ok(vec![Document {
        id: path.display().to_string(),
        text,
        metadata: base_metadata(path, "text"),
    }])
}

async fn extract_markdown(path: &Path) -> Result<Vec<Document>> {
    let raw = read_to_string(path).await?;
    Ok(vec![Document {
        id: path.display().to_string(),
        text: strip_markdown(&raw),
        metadata: base_metadata(path, "markdown"),
    }])
}

/// PDF extraction runs on the blocking pool; `lopdf` parsing is CPU-bound.
async fn extract_pdf(path: &Path) -> Result<Vec<Document>> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        RagChatError::Ingestion(format!("failed to read '{}': {e}", path.display()))
    })?;

    let display = path.display().to_string();
    let pages = tokio::task::spawn_blocking(move || extract_pdf_pages(&bytes))
        .await
        .map_err(|e| RagChatError::Ingestion(format!("PDF extraction task failed: {e}")))?
        .map_err(|e| RagChatError::Ingestion(format!("failed to parse '{display}': {e}")))?;

    debug!(path = %path.display(), page_count = pages.len(), "extracted PDF pages");

    Ok(pages
        .into_iter()
        .map(|(page, text)| {
            let mut metadata = base_metadata(path, "pdf");
            metadata.insert("page".to_string(), page.to_string());
            Document { id: format!("{}#page{page}", path.display()), text, metadata }
        })
        .collect())
}

async fn read_to_string(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        RagChatError::Ingestion(format!("failed to read '{}': {e}", path.display()))
    })
}

/// Extract text per page. Pages that fail to decode are logged and skipped;
/// only a document that cannot be parsed at all fails the file.
fn extract_pdf_pages(bytes: &[u8]) -> std::result::Result<Vec<(u32, String)>, String> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| e.to_string())?;

    let mut pages = Vec::new();
    for (page_number, _object_id) in doc.get_pages() {
        match doc.extract_text(&[page_number]) {
            Ok(text) if !text.trim().is_empty() => pages.push((page_number, text)),
            Ok(_) => {}
            Err(e) => warn!(page = page_number, error = %e, "skipping undecodable PDF page"),
        }
    }
    Ok(pages)
}

/// Strip markdown block and span structure, keeping the text content.
///
/// Heading markers, list markers, blockquote prefixes, horizontal rules and
/// fence delimiters are removed; link and image syntax collapses to the
/// label text; emphasis asterisks and inline-code backticks are dropped.
/// Blank lines survive so paragraph boundaries remain visible to the
/// chunker.
fn strip_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_fence = false;

    for line in text.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            out.push_str(line);
            out.push('\n');
            continue;
        }
        if is_horizontal_rule(trimmed) {
            continue;
        }

        let unprefixed = strip_block_prefix(trimmed);
        out.push_str(strip_spans(unprefixed).trim_end());
        out.push('\n');
    }
    out
}

fn is_horizontal_rule(line: &str) -> bool {
    let markers: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    markers.len() >= 3
        && markers.iter().all(|c| *c == markers[0] && matches!(*c, '-' | '*' | '_'))
}

/// Remove heading, blockquote and list prefixes from a line.
fn strip_block_prefix(line: &str) -> &str {
    let mut rest = line;

    while let Some(stripped) = rest.strip_prefix('>') {
        rest = stripped.trim_start();
    }

    let hashes = rest.chars().take_while(|c| *c == '#').count();
    if hashes > 0 && rest[hashes..].starts_with(' ') {
        return rest[hashes..].trim_start();
    }

    for marker in ["- ", "* ", "+ "] {
        if let Some(stripped) = rest.strip_prefix(marker) {
            return stripped;
        }
    }

    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(stripped) = rest[digits..].strip_prefix(". ") {
            return stripped;
        }
    }

    rest
}

/// Collapse `[label](target)` and `![alt](target)` to their label text,
/// then drop emphasis and inline-code markers.
fn strip_spans(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(open) = rest.find('[') {
        let (head, tail) = rest.split_at(open);
        out.push_str(head);

        let linked = tail.find(']').and_then(|close| {
            let label = &tail[1..close];
            let after = &tail[close + 1..];
            let target = after.strip_prefix('(')?;
            let end = target.find(')')?;
            Some((label, &target[end + 1..]))
        });

        match linked {
            Some((label, after)) => {
                if out.ends_with('!') {
                    out.pop();
                }
                out.push_str(label);
                rest = after;
            }
            None => {
                out.push('[');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    out.replace(['*', '`'], "")
}

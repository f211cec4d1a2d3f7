//! Document loading.
//!
//! The [`DocumentLoader`] discovers supported files under a root directory,
//! extracts their text with bounded concurrency, and splits the result into
//! chunks ready for indexing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, Document};
use crate::error::{RagChatError, Result};
use crate::extract::{self, SUPPORTED_EXTENSIONS};

/// Discovers, extracts, and chunks documents under a root directory.
///
/// Extraction runs across files with bounded concurrency; discovery and
/// extraction are both I/O-bound, so the limit comes from
/// [`RagConfig::ingest_concurrency`]. Files that fail to extract are logged
/// and skipped. The output chunk sequence carries no ordering guarantee.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat::{DocumentLoader, RagConfig};
///
/// let loader = DocumentLoader::new(&RagConfig::default());
/// let chunks = loader.load("./data").await?;
/// ```
pub struct DocumentLoader {
    chunker: Arc<dyn Chunker>,
    concurrency: usize,
}

impl DocumentLoader {
    /// Create a loader using a [`RecursiveChunker`] sized from `config`.
    pub fn new(config: &RagConfig) -> Self {
        Self {
            chunker: Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)),
            concurrency: config.ingest_concurrency.max(1),
        }
    }

    /// Replace the chunking strategy.
    pub fn with_chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = chunker;
        self
    }

    /// Load every supported file under `root` and return the chunked corpus.
    ///
    /// Returns an empty `Vec` when the directory holds no supported files;
    /// the caller decides whether that is fatal.
    ///
    /// # Errors
    ///
    /// Returns [`RagChatError::Ingestion`] only when `root` itself is
    /// missing or not a directory. Per-file extraction failures are logged
    /// with `warn!` and the file is skipped.
    pub async fn load(&self, root: impl AsRef<Path>) -> Result<Vec<Chunk>> {
        let root = root.as_ref();
        let files = discover_files(root)?;
        info!(root = %root.display(), file_count = files.len(), "discovered supported files");

        let documents: Vec<Document> = stream::iter(files)
            .map(|path| async move {
                match extract::extract_file(&path).await {
                    Ok(docs) => Some(docs),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping file");
                        None
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|extracted| async move { extracted })
            .collect::<Vec<Vec<Document>>>()
            .await
            .into_iter()
            .flatten()
            .collect();

        let chunks: Vec<Chunk> =
            documents.iter().flat_map(|doc| self.chunker.chunk(doc)).collect();

        info!(
            document_count = documents.len(),
            chunk_count = chunks.len(),
            "split documents into chunks"
        );
        Ok(chunks)
    }
}

/// Walk `root` and collect the paths of supported files, sorted for
/// deterministic discovery. Unreadable entries below the root are skipped.
fn discover_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(RagChatError::Ingestion(format!(
            "ingestion root '{}' is not a readable directory",
            root.display()
        )));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    SUPPORTED_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s))
                })
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}

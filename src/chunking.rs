//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`], a
//! boundary-preferring splitter that breaks at paragraphs, then sentences,
//! then words before falling back to a hard character cut.

use crate::document::{Chunk, Document};

/// Separator hierarchy tried in order: paragraph, sentence, word.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s whose metadata is inherited from the
/// parent document plus a `chunk_index` field.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into overlapping chunks, preferring semantic boundaries.
///
/// Text is first segmented at paragraph separators; segments that are still
/// too large are segmented at sentence boundaries, then word boundaries, and
/// finally cut at a fixed character count. Segments are merged greedily into
/// chunks of at most `chunk_size` characters, and every chunk after the
/// first begins with the last `chunk_overlap` characters of its predecessor,
/// so dropping that prefix from each later chunk reconstructs the source
/// text exactly.
///
/// All sizes are measured in characters, not bytes, so multi-byte text is
/// never cut inside a code point.
///
/// # Example
///
/// ```rust,ignore
/// use ragchat::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(1000, 200);
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of characters shared between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        // Segments are capped at chunk_size - chunk_overlap so that an
        // overlap prefix plus any single segment still fits in a chunk.
        let budget = self.chunk_size.saturating_sub(self.chunk_overlap).max(1);

        let texts = if char_len(&document.text) <= self.chunk_size {
            vec![document.text.clone()]
        } else {
            let segments = split_segments(&document.text, budget, &SEPARATORS);
            merge_segments(segments, self.chunk_size, self.chunk_overlap)
        };

        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), i.to_string());
                Chunk {
                    id: format!("{}_{i}", document.id),
                    text,
                    metadata,
                    document_id: document.id.clone(),
                }
            })
            .collect()
    }
}

/// Split text into contiguous segments of at most `budget` characters,
/// breaking at the first separator level that applies and descending to the
/// next level for segments that are still too large. Concatenating the
/// segments reproduces the input exactly.
fn split_segments(text: &str, budget: usize, separators: &[&str]) -> Vec<String> {
    if char_len(text) <= budget {
        return vec![text.to_string()];
    }

    let Some((separator, rest)) = separators.split_first() else {
        return hard_split(text, budget);
    };

    let mut segments = Vec::new();
    for piece in text.split_inclusive(separator) {
        if char_len(piece) <= budget {
            segments.push(piece.to_string());
        } else {
            segments.extend(split_segments(piece, budget, rest));
        }
    }
    segments
}

/// Greedily merge segments into chunks of at most `chunk_size` characters.
/// Each new chunk is seeded with the trailing `overlap` characters of the
/// chunk it follows.
fn merge_segments(segments: Vec<String>, chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for segment in segments {
        let segment_len = char_len(&segment);
        if current_len > 0 && current_len + segment_len > chunk_size {
            let tail = char_tail(&current, overlap);
            current_len = char_len(&tail);
            chunks.push(std::mem::replace(&mut current, tail));
        }
        current.push_str(&segment);
        current_len += segment_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Cut text into pieces of exactly `budget` characters (the last piece may
/// be shorter), respecting char boundaries.
fn hard_split(text: &str, budget: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut count = 0;

    for ch in text.chars() {
        piece.push(ch);
        count += 1;
        if count == budget {
            pieces.push(std::mem::take(&mut piece));
            count = 0;
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The last `n` characters of `s` (all of `s` if it is shorter).
fn char_tail(s: &str, n: usize) -> String {
    let total = char_len(s);
    if total <= n {
        return s.to_string();
    }
    let start = s
        .char_indices()
        .nth(total - n)
        .map(|(i, _)| i)
        .unwrap_or(0);
    s[start..].to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn doc(text: &str) -> Document {
        Document {
            id: "doc".to_string(),
            text: text.to_string(),
            metadata: HashMap::from([("source".to_string(), "doc.txt".to_string())]),
        }
    }

    fn chars(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunks = RecursiveChunker::new(100, 20).chunk(&doc(""));
        assert!(chunks.is_empty());
    }

    #[test]
    fn short_document_is_a_single_chunk() {
        let chunks = RecursiveChunker::new(100, 20).chunk(&doc("short text"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
        assert_eq!(chunks[0].id, "doc_0");
        assert_eq!(chunks[0].metadata["chunk_index"], "0");
        assert_eq!(chunks[0].metadata["source"], "doc.txt");
    }

    #[test]
    fn chunks_respect_size_and_overlap() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let chunker = RecursiveChunker::new(200, 40);
        let chunks = chunker.chunk(&doc(&text));

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chars(&chunk.text) <= 200, "chunk too large: {}", chars(&chunk.text));
        }
        for pair in chunks.windows(2) {
            let tail: String = {
                let total = chars(&pair[0].text);
                pair[0].text.chars().skip(total - 40).collect()
            };
            assert!(pair[1].text.starts_with(&tail));
        }
    }

    #[test]
    fn dropping_overlap_prefixes_reconstructs_source() {
        let text = "Lorem ipsum dolor sit amet. Consectetur adipiscing elit. ".repeat(30);
        let chunker = RecursiveChunker::new(250, 50);
        let chunks = chunker.chunk(&doc(&text));

        let mut rebuilt = chunks[0].text.clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk.text.chars().skip(50).collect::<String>());
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let paragraph = "word ".repeat(30).trim_end().to_string();
        let text = format!("{paragraph}\n\n{paragraph}\n\n{paragraph}\n\n{paragraph}");
        let chunks = RecursiveChunker::new(400, 80).chunk(&doc(&text));

        assert!(chunks.len() > 1);
        // Every chunk but the last was flushed right after a whole paragraph.
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.text.ends_with("\n\n"), "chunk not cut at a paragraph: {:?}", chunk.text);
        }
    }

    #[test]
    fn multibyte_text_never_splits_a_code_point() {
        let text = "día tras día, näive façade. ".repeat(60);
        let chunks = RecursiveChunker::new(120, 30).chunk(&doc(&text));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chars(&chunk.text) <= 120);
        }
    }
}

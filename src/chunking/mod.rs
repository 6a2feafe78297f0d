// Document chunking
// Splits documents into bounded-size retrievable units via a pluggable
// tokenization collaborator.


use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::Document;

/// A bounded-size slice of a single document, ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
}

/// Tokenization collaborator used at chunking time. The same tokenizer
/// must be used for the whole lifetime of a built index; swapping it
/// requires a rebuild.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<String>;
    fn detokenize(&self, tokens: &[String]) -> String;
}

/// Whitespace token boundaries. Round-trips text up to whitespace
/// collapsing, which is sufficient for retrieval chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    #[inline]
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    #[inline]
    fn detokenize(&self, tokens: &[String]) -> String {
        tokens.join(" ")
    }
}

/// Split each document into consecutive, non-overlapping windows of at
/// most `max_tokens` tokens (the last window may be shorter).
///
/// Output preserves per-document order and document order. Documents
/// that tokenize to nothing produce no chunks.
#[inline]
pub fn chunk_documents(
    documents: &[Document],
    tokenizer: &dyn Tokenizer,
    max_tokens: usize,
) -> Vec<Chunk> {
    debug_assert!(max_tokens > 0);

    let mut chunks = Vec::new();

    for document in documents {
        let tokens = tokenizer.tokenize(&document.text);
        if tokens.is_empty() {
            continue;
        }

        for window in tokens.chunks(max_tokens) {
            chunks.push(Chunk {
                text: tokenizer.detokenize(window),
                source: document.source.clone(),
            });
        }
    }

    debug!(
        "Chunked {} documents into {} chunks (max {max_tokens} tokens)",
        documents.len(),
        chunks.len()
    );

    chunks
}

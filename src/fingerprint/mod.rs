// Corpus fingerprinting
// Produces the content hash used as the cache validity key


use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::corpus::Document;

/// Content hash over a document sequence, used to detect corpus changes.
///
/// The digest is order-sensitive: chunking downstream depends on document
/// order, so reordering the corpus must invalidate the cache. No text
/// normalization is applied; a cache hit requires byte-identical content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a document sequence in its given order.
    #[inline]
    pub fn compute(documents: &[Document]) -> Self {
        let mut hasher = Sha256::new();
        for document in documents {
            hasher.update(document.text.as_bytes());
            hasher.update(document.source.as_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Fingerprint {
    #[inline]
    fn from(hex: String) -> Self {
        Self(hex)
    }
}

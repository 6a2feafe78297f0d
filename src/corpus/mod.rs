// Corpus loading
// Reads raw documents from a directory tree into their canonical in-memory form

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::{RagError, Result};

/// A single source file from the corpus. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub source: String,
}

/// Load every document under `dir`, recursively.
///
/// Directory entries are visited in sorted order at each level so the
/// resulting sequence is stable for a fixed filesystem snapshot regardless
/// of the underlying readdir order. Files whose extension is not in
/// `extensions` are ignored; a file that cannot be read is logged and
/// skipped. An unreadable root directory is an error.
#[inline]
pub fn load_documents(dir: &Path, extensions: &[String]) -> Result<Vec<Document>> {
    if !dir.is_dir() {
        return Err(RagError::SourceData(format!(
            "Corpus directory not found: {}",
            dir.display()
        )));
    }

    let mut documents = Vec::new();
    walk_directory(dir, extensions, &mut documents)?;

    debug!(
        "Loaded {} documents from {}",
        documents.len(),
        dir.display()
    );

    Ok(documents)
}

fn walk_directory(dir: &Path, extensions: &[String], documents: &mut Vec<Document>) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(|e| {
            RagError::SourceData(format!("Failed to read directory {}: {}", dir.display(), e))
        })?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .collect();

    entries.sort();

    for path in entries {
        if path.is_dir() {
            walk_directory(&path, extensions, documents)?;
        } else if has_recognized_extension(&path, extensions) {
            match fs::read_to_string(&path) {
                Ok(text) => documents.push(Document {
                    text,
                    source: path.display().to_string(),
                }),
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(())
}

fn has_recognized_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e == ext))
}

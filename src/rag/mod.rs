// RAG manager
// Orchestrates the corpus -> chunk -> embed -> index pipeline and the
// cache-consistency protocol that decides when that work can be reused.


use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::chunking::{Chunk, Tokenizer, WhitespaceTokenizer, chunk_documents};
use crate::config::Config;
use crate::corpus::load_documents;
use crate::embeddings::{EmbeddingProvider, TextGenerator};
use crate::fingerprint::Fingerprint;
use crate::index::RetrievalIndex;
use crate::{RagError, Result};

/// Cache entry name for the built pipeline components.
pub const COMPONENTS_CACHE_NAME: &str = "rag_components";

/// Schema version of the persisted cache record. Bump on any change to
/// `CachedComponents`; old records then load as misses.
pub const CACHE_SCHEMA_VERSION: &str = "1.0";

/// The expensive-to-recompute pipeline output persisted between runs.
///
/// Only serializable data is cached; the embedding client itself is
/// reconstructed from configuration on every process start, and
/// `embedding_model` records which model produced these vectors so a
/// model swap invalidates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedComponents {
    pub chunks: Vec<Chunk>,
    pub embeddings: Vec<Vec<f32>>,
    pub embedding_model: String,
}

/// Lifecycle of the managed index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildState {
    Uninitialized,
    Building,
    Ready,
    Failed { error: String },
}

/// Owns the pipeline collaborators and the built retrieval index.
///
/// Builds are serialized by a single mutex; once `Ready`, concurrent
/// `answer` calls share the read-only index through an `Arc` without
/// further locking.
pub struct RagManager {
    corpus_dir: PathBuf,
    extensions: Vec<String>,
    max_tokens: usize,
    top_k: usize,
    cache: CacheStore,
    tokenizer: Box<dyn Tokenizer + Send + Sync>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn TextGenerator>,
    build_lock: Mutex<()>,
    state: RwLock<BuildState>,
    index: RwLock<Option<Arc<RetrievalIndex>>>,
}

impl RagManager {
    #[inline]
    pub fn new(
        config: &Config,
        cache: CacheStore,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            corpus_dir: config.corpus.data_dir.clone(),
            extensions: config.corpus.extensions.clone(),
            max_tokens: config.chunking.max_tokens,
            top_k: config.retrieval.top_k,
            cache,
            tokenizer: Box::new(WhitespaceTokenizer),
            embedder,
            generator,
            build_lock: Mutex::new(()),
            state: RwLock::new(BuildState::Uninitialized),
            index: RwLock::new(None),
        }
    }

    /// Replace the tokenization collaborator. Chunk content depends on
    /// the tokenizer, so swapping it warrants a `rebuild`.
    #[inline]
    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer + Send + Sync>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    #[inline]
    pub fn state(&self) -> BuildState {
        self.state
            .read()
            .map(|s| s.clone())
            .unwrap_or(BuildState::Uninitialized)
    }

    fn set_state(&self, state: BuildState) {
        if let Ok(mut guard) = self.state.write() {
            *guard = state;
        }
    }

    fn current_index(&self) -> Option<Arc<RetrievalIndex>> {
        self.index.read().ok().and_then(|guard| guard.clone())
    }

    /// Return the ready index, building it first if necessary.
    ///
    /// With `force_rebuild` the cache lookup is skipped and chunking and
    /// embedding always run. The whole build transition is serialized by
    /// one mutex; a failed build leaves the manager in `Failed` but the
    /// next call starts over from scratch.
    #[inline]
    pub fn ensure_ready(&self, force_rebuild: bool) -> Result<Arc<RetrievalIndex>> {
        if !force_rebuild {
            if let Some(index) = self.current_index() {
                return Ok(index);
            }
        }

        let _guard = self
            .build_lock
            .lock()
            .map_err(|_| RagError::Index("Build lock poisoned".to_string()))?;

        // Another caller may have finished the build while we waited.
        if !force_rebuild {
            if let Some(index) = self.current_index() {
                return Ok(index);
            }
        }

        self.set_state(BuildState::Building);

        match self.build(force_rebuild) {
            Ok(index) => {
                if let Ok(mut slot) = self.index.write() {
                    *slot = Some(Arc::clone(&index));
                }
                self.set_state(BuildState::Ready);
                Ok(index)
            }
            Err(e) => {
                self.set_state(BuildState::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn build(&self, force_rebuild: bool) -> Result<Arc<RetrievalIndex>> {
        let documents = load_documents(&self.corpus_dir, &self.extensions)?;
        if documents.is_empty() {
            return Err(RagError::SourceData(format!(
                "No source data found in {}",
                self.corpus_dir.display()
            )));
        }

        let fingerprint = Fingerprint::compute(&documents);
        debug!("Corpus fingerprint: {fingerprint}");

        let components = if force_rebuild {
            None
        } else {
            self.load_cached_components(&fingerprint)
        };

        let components = match components {
            Some(components) => {
                info!(
                    "Cache hit: reusing {} chunks and embeddings",
                    components.chunks.len()
                );
                components
            }
            None => self.build_components(&fingerprint, &documents)?,
        };

        let index = RetrievalIndex::build(
            components.chunks,
            components.embeddings,
            Arc::clone(&self.embedder),
        )?;

        info!("Retrieval index ready with {} chunks", index.len());
        Ok(Arc::new(index))
    }

    fn build_components(
        &self,
        fingerprint: &Fingerprint,
        documents: &[crate::corpus::Document],
    ) -> Result<CachedComponents> {
        info!(
            "Cache miss: chunking and embedding {} documents",
            documents.len()
        );

        let chunks = chunk_documents(documents, self.tokenizer.as_ref(), self.max_tokens);
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let components = CachedComponents {
            chunks,
            embeddings,
            embedding_model: self.embedder.model_id().to_string(),
        };

        // A failed save degrades the next run, never this one.
        if !self
            .cache
            .save(COMPONENTS_CACHE_NAME, &components, Some(fingerprint))
        {
            warn!("Failed to persist pipeline components; continuing without cache");
        }

        Ok(components)
    }

    fn load_cached_components(&self, fingerprint: &Fingerprint) -> Option<CachedComponents> {
        let components: CachedComponents =
            self.cache.load(COMPONENTS_CACHE_NAME, Some(fingerprint))?;

        if components.embedding_model != self.embedder.model_id() {
            info!(
                "Cached embeddings were produced by '{}' but '{}' is configured; rebuilding",
                components.embedding_model,
                self.embedder.model_id()
            );
            return None;
        }

        if components.chunks.len() != components.embeddings.len() {
            warn!(
                "Cached components misaligned ({} chunks, {} embeddings); rebuilding",
                components.chunks.len(),
                components.embeddings.len()
            );
            return None;
        }

        Some(components)
    }

    /// Discard the cache entry and force a full rebuild.
    #[inline]
    pub fn rebuild(&self) -> Result<Arc<RetrievalIndex>> {
        info!("Rebuild requested; deleting cached components");
        self.cache.delete(COMPONENTS_CACHE_NAME);
        self.ensure_ready(true)
    }

    /// Answer a question using retrieved corpus context.
    #[inline]
    pub fn answer(&self, query: &str) -> Result<String> {
        let index = self.ensure_ready(false)?;

        let chunks = index.retrieve(query, self.top_k)?;
        debug!("Retrieved {} chunks for query", chunks.len());

        let prompt = build_prompt(query, &chunks);
        self.generator.generate(&prompt)
    }

    /// Retrieve context chunks without generating an answer.
    #[inline]
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>> {
        let index = self.ensure_ready(false)?;
        index.retrieve(query, top_k)
    }

    #[inline]
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }
}

fn build_prompt(query: &str, chunks: &[Chunk]) -> String {
    let context = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Answer the following question based only on the provided context. \
         If the answer cannot be found in the context, state \"I'm sorry, \
         I cannot find the answer to that in my knowledge base.\"\n\n\
         Context:\n{context}\n\n\
         Question:\n{query}\n\n\
         Answer:"
    )
}

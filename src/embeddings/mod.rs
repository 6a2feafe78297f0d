// Embedding and generation collaborator boundaries

pub mod ollama;

use crate::Result;

/// External embedding capability. Implementations must return one vector
/// per input text, positionally aligned with the input sequence, and must
/// embed later queries into the identical vector space.
pub trait EmbeddingProvider: Send + Sync {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Stable identifier for the model behind this provider. Cached
    /// embeddings are only valid for the model they were produced with.
    fn model_id(&self) -> &str;
}

/// External text-generation capability consumed by the RAG manager.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}

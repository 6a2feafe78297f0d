use super::*;

/// Embeds every query as a fixed vector; batch embedding is positional
/// over a lookup table. Enough to exercise the index math directly.
struct FixedEmbedder {
    query_vector: Vec<f32>,
}

impl EmbeddingProvider for FixedEmbedder {
    fn embed_batch(&self, texts: &[String]) -> crate::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| self.query_vector.clone()).collect())
    }

    fn embed_query(&self, _text: &str) -> crate::Result<Vec<f32>> {
        Ok(self.query_vector.clone())
    }

    fn model_id(&self) -> &str {
        "fixed-test-model"
    }
}

fn chunk(text: &str) -> Chunk {
    Chunk {
        text: text.to_string(),
        source: "test.txt".to_string(),
    }
}

fn build_index(vectors: Vec<Vec<f32>>, query_vector: Vec<f32>) -> RetrievalIndex {
    let chunks: Vec<Chunk> = (0..vectors.len()).map(|i| chunk(&format!("chunk {i}"))).collect();
    RetrievalIndex::build(chunks, vectors, Arc::new(FixedEmbedder { query_vector }))
        .expect("should build index")
}

#[test]
fn zero_chunks_is_a_build_error() {
    let result = RetrievalIndex::build(
        Vec::new(),
        Vec::new(),
        Arc::new(FixedEmbedder {
            query_vector: vec![0.0],
        }),
    );

    assert!(matches!(result, Err(crate::RagError::Index(_))));
}

#[test]
fn count_mismatch_is_a_build_error() {
    let result = RetrievalIndex::build(
        vec![chunk("a"), chunk("b")],
        vec![vec![1.0, 0.0]],
        Arc::new(FixedEmbedder {
            query_vector: vec![0.0, 0.0],
        }),
    );

    assert!(matches!(result, Err(crate::RagError::Index(_))));
}

#[test]
fn ragged_dimensions_are_a_build_error() {
    let result = RetrievalIndex::build(
        vec![chunk("a"), chunk("b")],
        vec![vec![1.0, 0.0], vec![1.0]],
        Arc::new(FixedEmbedder {
            query_vector: vec![0.0, 0.0],
        }),
    );

    assert!(matches!(result, Err(crate::RagError::Index(_))));
}

#[test]
fn retrieves_nearest_chunks_in_distance_order() {
    // Query at origin; chunk 2 is nearest, then 0, then 1.
    let index = build_index(
        vec![vec![1.0, 0.0], vec![3.0, 0.0], vec![0.5, 0.0]],
        vec![0.0, 0.0],
    );

    let results = index.retrieve("query", 2).expect("should retrieve");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].text, "chunk 2");
    assert_eq!(results[1].text, "chunk 0");
}

#[test]
fn distances_are_ascending() {
    let index = build_index(
        vec![vec![2.0, 0.0], vec![1.0, 0.0], vec![3.0, 0.0]],
        vec![0.0, 0.0],
    );

    let results = index.search("query", 3).expect("should search");

    assert_eq!(results.len(), 3);
    assert!(results[0].distance <= results[1].distance);
    assert!(results[1].distance <= results[2].distance);
}

#[test]
fn ties_break_by_original_position() {
    // Chunks 0 and 1 are equidistant from the query.
    let index = build_index(
        vec![vec![1.0, 0.0], vec![-1.0, 0.0], vec![5.0, 0.0]],
        vec![0.0, 0.0],
    );

    let results = index.retrieve("query", 2).expect("should retrieve");

    assert_eq!(results[0].text, "chunk 0");
    assert_eq!(results[1].text, "chunk 1");
}

#[test]
fn top_k_is_clamped_to_available_chunks() {
    let index = build_index(vec![vec![1.0], vec![2.0]], vec![0.0]);

    let results = index.retrieve("query", 50).expect("should retrieve");

    assert_eq!(results.len(), 2);
}

#[test]
fn top_k_zero_returns_nothing() {
    let index = build_index(vec![vec![1.0]], vec![0.0]);

    let results = index.retrieve("query", 0).expect("should retrieve");

    assert!(results.is_empty());
}

#[test]
fn mismatched_query_dimension_returns_empty_not_error() {
    // Index is 2-dimensional; the query embeds to 3 dims.
    let index = build_index(vec![vec![1.0, 0.0], vec![0.0, 1.0]], vec![0.0, 0.0, 0.0]);

    let results = index.retrieve("query", 2).expect("should not error");

    assert!(results.is_empty());
}

#[test]
fn reports_len_and_dimension() {
    let index = build_index(vec![vec![1.0, 2.0], vec![3.0, 4.0]], vec![0.0, 0.0]);

    assert_eq!(index.len(), 2);
    assert!(!index.is_empty());
    assert_eq!(index.dimension(), 2);
}

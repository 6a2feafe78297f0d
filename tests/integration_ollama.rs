#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Integration tests that require a local Ollama instance
// Run with: cargo test --test integration_ollama -- --ignored

use corpus_rag::config::OllamaConfig;
use corpus_rag::embeddings::ollama::OllamaClient;
use corpus_rag::embeddings::{EmbeddingProvider, TextGenerator};
use std::env;
use std::time::Duration;

const DEFAULT_OLLAMA_HOST: &str = "localhost";
const DEFAULT_OLLAMA_PORT: u16 = 11434;
const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text:latest";
const DEFAULT_GENERATION_MODEL: &str = "gemma2:2b";

fn create_integration_test_client() -> OllamaClient {
    let host = env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string());
    let port = env::var("OLLAMA_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_OLLAMA_PORT);
    let embedding_model =
        env::var("OLLAMA_EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());
    let generation_model = env::var("OLLAMA_GENERATION_MODEL")
        .unwrap_or_else(|_| DEFAULT_GENERATION_MODEL.to_string());

    let config = OllamaConfig {
        protocol: "http".to_string(),
        host,
        port,
        embedding_model,
        generation_model,
        batch_size: 5,
        embedding_dimension: 768,
    };

    OllamaClient::new(&config)
        .expect("Failed to create Ollama client")
        .with_timeout(Duration::from_secs(120))
        .with_retry_attempts(3)
}

#[test]
#[ignore = "requires a running Ollama instance"]
fn real_ollama_health_check() {
    let client = create_integration_test_client();

    let result = client.health_check();
    assert!(result.is_ok(), "health check failed: {result:?}");
}

#[test]
#[ignore = "requires a running Ollama instance"]
fn real_ollama_embeddings_are_aligned_and_uniform() {
    let client = create_integration_test_client();

    let texts = vec![
        "FUTA was established in 1981.".to_string(),
        "FUTA has 11 faculties.".to_string(),
        "The weather today is sunny.".to_string(),
    ];

    let vectors = client.embed_texts(&texts).expect("embedding failed");

    assert_eq!(vectors.len(), texts.len());
    let dimension = vectors[0].len();
    assert!(dimension > 0);
    assert!(vectors.iter().all(|v| v.len() == dimension));
}

#[test]
#[ignore = "requires a running Ollama instance"]
fn real_ollama_query_embedding_matches_batch_space() {
    let client = create_integration_test_client();

    let batch = client
        .embed_batch(&["reference text".to_string()])
        .expect("batch embedding failed");
    let query = client.embed_query("reference text").expect("query embedding failed");

    assert_eq!(batch[0].len(), query.len());
}

#[test]
#[ignore = "requires a running Ollama instance"]
fn real_ollama_generation_produces_text() {
    let client = create_integration_test_client();

    let response = client
        .generate("Reply with the single word: pong")
        .expect("generation failed");

    assert!(!response.trim().is_empty());
}

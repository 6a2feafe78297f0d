use super::*;
use tempfile::TempDir;

#[test]
fn defaults_are_valid() {
    let mut config = Config::default();
    config.base_dir = PathBuf::from("/tmp/test");

    assert!(config.validate().is_ok());
    assert_eq!(config.chunking.max_tokens, 256);
    assert_eq!(config.retrieval.top_k, 3);
    assert_eq!(config.ollama.port, 11434);
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let temp = TempDir::new().expect("should create temp dir");

    let config = Config::load_from(temp.path()).expect("should load defaults");

    assert_eq!(config, {
        let mut expected = Config::default();
        expected.base_dir = temp.path().to_path_buf();
        expected
    });
}

#[test]
fn save_then_load_round_trips() {
    let temp = TempDir::new().expect("should create temp dir");
    let mut config = Config::default();
    config.base_dir = temp.path().to_path_buf();
    config.ollama.host = "embedding-box".to_string();
    config.ollama.port = 9999;
    config.chunking.max_tokens = 128;
    config.retrieval.top_k = 5;
    config.corpus.data_dir = PathBuf::from("/srv/corpus");

    config.save().expect("should save");
    let loaded = Config::load_from(temp.path()).expect("should load");

    assert_eq!(loaded, config);
}

#[test]
fn partial_config_file_uses_section_defaults() {
    let temp = TempDir::new().expect("should create temp dir");
    std::fs::write(
        temp.path().join("config.toml"),
        "[chunking]\nmax_tokens = 64\n",
    )
    .expect("should write config");

    let config = Config::load_from(temp.path()).expect("should load");

    assert_eq!(config.chunking.max_tokens, 64);
    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.retrieval.top_k, 3);
}

#[test]
fn invalid_protocol_rejected() {
    let mut config = Config::default();
    config.ollama.protocol = "ftp".to_string();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));
}

#[test]
fn zero_port_rejected() {
    let mut config = Config::default();
    config.ollama.port = 0;

    assert!(matches!(config.validate(), Err(ConfigError::InvalidPort(0))));
}

#[test]
fn empty_model_rejected() {
    let mut config = Config::default();
    config.ollama.embedding_model = "  ".to_string();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidModel(_))
    ));
}

#[test]
fn zero_max_tokens_rejected() {
    let mut config = Config::default();
    config.chunking.max_tokens = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidMaxTokens(0))
    ));
}

#[test]
fn zero_top_k_rejected() {
    let mut config = Config::default();
    config.retrieval.top_k = 0;

    assert!(matches!(config.validate(), Err(ConfigError::InvalidTopK(0))));
}

#[test]
fn empty_extensions_rejected() {
    let mut config = Config::default();
    config.corpus.extensions.clear();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::EmptyExtensions)
    ));
}

#[test]
fn invalid_file_fails_to_load() {
    let temp = TempDir::new().expect("should create temp dir");
    std::fs::write(temp.path().join("config.toml"), "not [valid toml")
        .expect("should write config");

    assert!(Config::load_from(temp.path()).is_err());
}

#[test]
fn cache_dir_is_under_base_dir() {
    let mut config = Config::default();
    config.base_dir = PathBuf::from("/tmp/base");

    assert_eq!(config.cache_dir_path(), PathBuf::from("/tmp/base/cache"));
}

#[test]
fn ollama_url_is_well_formed() {
    let config = OllamaConfig::default();

    let url = config.ollama_url().expect("should build URL");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

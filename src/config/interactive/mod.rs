
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;

use super::{Config, ConfigError, OllamaConfig};
use crate::embeddings::ollama::OllamaClient;

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("corpus-rag configuration setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Corpus").bold().yellow());
    configure_corpus(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Ollama").bold().yellow());
    eprintln!("Configure the local Ollama instance used for embeddings and generation.");
    configure_ollama(&mut config.ollama)?;

    eprintln!();
    eprintln!("{}", style("Retrieval").bold().yellow());
    configure_retrieval(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());
    if test_ollama_connection(&config.ollama) {
        eprintln!("{}", style("Ollama connection successful").green());
    } else {
        eprintln!(
            "{}",
            style("Warning: could not connect to Ollama").yellow()
        );
        eprintln!("You can continue, but make sure Ollama is running before building the index.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("Configuration saved").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    eprintln!("{}", style("Current configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Corpus:").bold().yellow());
    eprintln!(
        "  Data directory: {}",
        style(config.corpus.data_dir.display()).cyan()
    );
    eprintln!(
        "  Extensions: {}",
        style(config.corpus.extensions.join(", ")).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Ollama:").bold().yellow());
    eprintln!("  Host: {}", style(&config.ollama.host).cyan());
    eprintln!("  Port: {}", style(config.ollama.port).cyan());
    eprintln!(
        "  Embedding model: {}",
        style(&config.ollama.embedding_model).cyan()
    );
    eprintln!(
        "  Generation model: {}",
        style(&config.ollama.generation_model).cyan()
    );
    eprintln!("  Batch size: {}", style(config.ollama.batch_size).cyan());

    eprintln!();
    eprintln!("{}", style("Pipeline:").bold().yellow());
    eprintln!(
        "  Max tokens per chunk: {}",
        style(config.chunking.max_tokens).cyan()
    );
    eprintln!("  Top-k: {}", style(config.retrieval.top_k).cyan());

    eprintln!();
    match config.ollama.ollama_url() {
        Ok(url) => eprintln!("  Ollama URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Ollama URL: {} ({e})", style("Invalid").red()),
    }

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    Config::load().map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config::default())
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_corpus(config: &mut Config) -> Result<()> {
    let data_dir: String = Input::new()
        .with_prompt("Corpus data directory")
        .default(config.corpus.data_dir.display().to_string())
        .interact_text()?;
    config.corpus.data_dir = PathBuf::from(data_dir);

    Ok(())
}

fn configure_ollama(ollama: &mut OllamaConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == ollama.protocol)
        .unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt("Ollama protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;
    ollama.protocol = protocols[protocol_index].to_string();

    ollama.host = Input::new()
        .with_prompt("Ollama host")
        .default(ollama.host.clone())
        .interact_text()?;

    ollama.port = Input::new()
        .with_prompt("Ollama port")
        .default(ollama.port)
        .validate_with(|port: &u16| -> Result<(), ConfigError> {
            if *port == 0 {
                Err(ConfigError::InvalidPort(*port))
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    ollama.embedding_model = Input::new()
        .with_prompt("Embedding model")
        .default(ollama.embedding_model.clone())
        .interact_text()?;

    ollama.generation_model = Input::new()
        .with_prompt("Generation model")
        .default(ollama.generation_model.clone())
        .interact_text()?;

    ollama.batch_size = Input::new()
        .with_prompt("Embedding batch size")
        .default(ollama.batch_size)
        .validate_with(|size: &u32| -> Result<(), ConfigError> {
            if *size == 0 || *size > 1000 {
                Err(ConfigError::InvalidBatchSize(*size))
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    Ok(())
}

fn configure_retrieval(config: &mut Config) -> Result<()> {
    config.chunking.max_tokens = Input::new()
        .with_prompt("Max tokens per chunk")
        .default(config.chunking.max_tokens)
        .validate_with(|n: &usize| -> Result<(), ConfigError> {
            if (1..=8192).contains(n) {
                Ok(())
            } else {
                Err(ConfigError::InvalidMaxTokens(*n))
            }
        })
        .interact_text()?;

    config.retrieval.top_k = Input::new()
        .with_prompt("Chunks retrieved per query (top-k)")
        .default(config.retrieval.top_k)
        .validate_with(|n: &usize| -> Result<(), ConfigError> {
            if (1..=100).contains(n) {
                Ok(())
            } else {
                Err(ConfigError::InvalidTopK(*n))
            }
        })
        .interact_text()?;

    Ok(())
}

fn test_ollama_connection(ollama: &OllamaConfig) -> bool {
    OllamaClient::new(ollama)
        .and_then(|client| client.health_check())
        .is_ok()
}

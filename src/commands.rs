// Command implementations for the CLI. This is the composition root:
// configuration, cache store, Ollama client, and manager are constructed
// here and passed down explicitly.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cache::CacheStore;
use crate::config::{Config, get_config_dir};
use crate::corpus::load_documents;
use crate::embeddings::ollama::OllamaClient;
use crate::fingerprint::Fingerprint;
use crate::rag::{CACHE_SCHEMA_VERSION, COMPONENTS_CACHE_NAME, RagManager};

fn load_config() -> Result<Config> {
    let config_dir = get_config_dir().context("Failed to determine config directory")?;
    Config::load_from(&config_dir).context("Failed to load configuration")
}

fn open_cache(config: &Config) -> Result<CacheStore> {
    CacheStore::new(config.cache_dir_path(), CACHE_SCHEMA_VERSION)
        .context("Failed to open cache store")
}

fn build_manager(config: &Config) -> Result<RagManager> {
    let cache = open_cache(config)?;
    let client = Arc::new(
        OllamaClient::new(&config.ollama).context("Failed to initialize Ollama client")?,
    );

    Ok(RagManager::new(
        config,
        cache,
        Arc::<OllamaClient>::clone(&client),
        client,
    ))
}

fn build_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Answer a single question and print the response.
#[inline]
pub fn ask(question: &str, top_k: Option<usize>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(top_k) = top_k {
        config.retrieval.top_k = top_k;
    }
    let manager = build_manager(&config)?;

    let spinner = build_spinner("Preparing retrieval index...");
    let index = manager.ensure_ready(false)?;
    spinner.finish_and_clear();
    info!("Index ready with {} chunks", index.len());

    let spinner = build_spinner("Thinking...");
    let answer = manager.answer(question)?;
    spinner.finish_and_clear();

    println!("{answer}");
    Ok(())
}

/// Interactive question loop. Type `exit` to quit.
#[inline]
pub fn chat() -> Result<()> {
    let config = load_config()?;
    let manager = build_manager(&config)?;

    let spinner = build_spinner("Preparing retrieval index...");
    manager.ensure_ready(false)?;
    spinner.finish_and_clear();

    println!("Ready. Ask a question, or type 'exit' to quit.");

    loop {
        let question: String = Input::new().with_prompt("Question").interact_text()?;
        if question.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        let spinner = build_spinner("Thinking...");
        let result = manager.answer(&question);
        spinner.finish_and_clear();

        match result {
            Ok(answer) => println!("\n{answer}\n"),
            Err(e) => eprintln!("{} {e}", style("Error:").red()),
        }
    }

    Ok(())
}

/// Build (or reuse) the pipeline components and retrieval index.
#[inline]
pub fn build(force: bool) -> Result<()> {
    let config = load_config()?;
    let manager = build_manager(&config)?;

    let spinner = build_spinner(if force {
        "Rebuilding pipeline components..."
    } else {
        "Building pipeline components..."
    });
    let index = manager.ensure_ready(force)?;
    spinner.finish_and_clear();

    println!(
        "Index ready: {} chunks, {} dimensions",
        index.len(),
        index.dimension()
    );
    Ok(())
}

/// Delete the cached components and rebuild from scratch.
#[inline]
pub fn rebuild() -> Result<()> {
    let config = load_config()?;
    let manager = build_manager(&config)?;

    let spinner = build_spinner("Rebuilding from scratch...");
    let index = manager.rebuild()?;
    spinner.finish_and_clear();

    println!(
        "Rebuilt index: {} chunks, {} dimensions",
        index.len(),
        index.dimension()
    );
    Ok(())
}

/// List every cache entry with its metadata.
#[inline]
pub fn cache_list() -> Result<()> {
    let config = load_config()?;
    let store = open_cache(&config)?;

    let entries = store.list_all();
    if entries.is_empty() {
        println!("No cache entries.");
        return Ok(());
    }

    println!("Cache entries ({} total):", entries.len());
    for entry in entries {
        println!();
        print_metadata(&entry);
    }
    Ok(())
}

/// Show metadata for one cache entry.
#[inline]
pub fn cache_info(name: &str) -> Result<()> {
    let config = load_config()?;
    let store = open_cache(&config)?;

    match store.describe(name) {
        Some(entry) => print_metadata(&entry),
        None => println!("No cache entry named '{name}'."),
    }
    Ok(())
}

/// Delete one cache entry.
#[inline]
pub fn cache_delete(name: &str) -> Result<()> {
    let config = load_config()?;
    let store = open_cache(&config)?;

    if store.delete(name) {
        println!("Deleted cache entry '{name}'.");
    } else {
        println!("Failed to delete cache entry '{name}'.");
    }
    Ok(())
}

/// Remove every cache entry.
#[inline]
pub fn cache_clear() -> Result<()> {
    let config = load_config()?;
    let store = open_cache(&config)?;

    let cleared = store.clear_all();
    println!("Cleared {cleared} cache entries.");
    Ok(())
}

fn print_metadata(entry: &crate::cache::CacheMetadata) {
    println!("{}", style(&entry.cache_name).bold());
    println!("  File: {}", entry.file_path.display());
    println!("  Size: {} bytes", entry.file_size);
    println!("  Version: {}", entry.cache_version);
    println!("  Created: {}", entry.created_at);
    if let Some(modified) = &entry.modified_time {
        println!("  Modified: {modified}");
    }
    match &entry.content_hash {
        Some(hash) => println!("  Content hash: {hash}"),
        None => println!("  Content hash: (none)"),
    }
}

/// Show corpus, cache, and collaborator status.
#[inline]
pub fn status() -> Result<()> {
    let config = load_config()?;

    println!("{}", style("Corpus").bold());
    match load_documents(&config.corpus.data_dir, &config.corpus.extensions) {
        Ok(documents) => {
            println!("  Directory: {}", config.corpus.data_dir.display());
            println!("  Documents: {}", documents.len());
            println!("  Fingerprint: {}", Fingerprint::compute(&documents));
        }
        Err(e) => println!("  Unavailable: {e}"),
    }

    println!();
    println!("{}", style("Cache").bold());
    let store = open_cache(&config)?;
    match store.describe(COMPONENTS_CACHE_NAME) {
        Some(entry) => {
            println!("  Entry: {}", entry.cache_name);
            println!("  Created: {}", entry.created_at);
            match &entry.content_hash {
                Some(hash) => println!("  Content hash: {hash}"),
                None => println!("  Content hash: (none)"),
            }
        }
        None => println!("  No cached components."),
    }

    println!();
    println!("{}", style("Ollama").bold());
    match OllamaClient::new(&config.ollama) {
        Ok(client) => match client.health_check() {
            Ok(()) => println!("  Reachable, models available."),
            Err(e) => println!("  Unhealthy: {e}"),
        },
        Err(e) => println!("  Client error: {e}"),
    }

    Ok(())
}

use clap::{Parser, Subcommand};
use corpus_rag::Result;
use corpus_rag::commands::{
    ask, build, cache_clear, cache_delete, cache_info, cache_list, chat, rebuild, status,
};
use corpus_rag::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "corpus-rag")]
#[command(about = "Retrieval-augmented question answering over a local document corpus")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question against the corpus
    Ask {
        /// The question to answer
        question: String,
        /// Number of context chunks to retrieve
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Interactive question-answering loop
    Chat,
    /// Build the retrieval index, reusing cached components when valid
    Build {
        /// Skip the cache and recompute everything
        #[arg(long)]
        force: bool,
    },
    /// Delete cached components and rebuild from scratch
    Rebuild,
    /// Inspect and manage the component cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
    /// Configure corpus location and Ollama connection
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Show corpus, cache, and collaborator status
    Status,
}

#[derive(Subcommand)]
enum CacheCommands {
    /// List all cache entries
    List,
    /// Show metadata for one cache entry
    Info {
        /// Cache entry name
        name: String,
    },
    /// Delete one cache entry
    Delete {
        /// Cache entry name
        name: String,
    },
    /// Remove every cache entry
    Clear,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ask { question, top_k } => {
            ask(&question, top_k)?;
        }
        Commands::Chat => {
            chat()?;
        }
        Commands::Build { force } => {
            build(force)?;
        }
        Commands::Rebuild => {
            rebuild()?;
        }
        Commands::Cache { command } => match command {
            CacheCommands::List => cache_list()?,
            CacheCommands::Info { name } => cache_info(&name)?,
            CacheCommands::Delete { name } => cache_delete(&name)?,
            CacheCommands::Clear => cache_clear()?,
        },
        Commands::Config { show } => {
            if show {
                show_config().map_err(corpus_rag::RagError::Other)?;
            } else {
                run_interactive_config().map_err(corpus_rag::RagError::Other)?;
            }
        }
        Commands::Status => {
            status()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["corpus-rag", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Status);
        }
    }

    #[test]
    fn ask_command_with_question() {
        let cli = Cli::try_parse_from(["corpus-rag", "ask", "When was FUTA established?"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ask { question, top_k } = parsed.command {
                assert_eq!(question, "When was FUTA established?");
                assert_eq!(top_k, None);
            }
        }
    }

    #[test]
    fn ask_command_with_top_k() {
        let cli = Cli::try_parse_from(["corpus-rag", "ask", "question", "--top-k", "5"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ask { top_k, .. } = parsed.command {
                assert_eq!(top_k, Some(5));
            }
        }
    }

    #[test]
    fn build_command_with_force() {
        let cli = Cli::try_parse_from(["corpus-rag", "build", "--force"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Build { force } = parsed.command {
                assert!(force);
            }
        }
    }

    #[test]
    fn cache_subcommands_parse() {
        assert!(Cli::try_parse_from(["corpus-rag", "cache", "list"]).is_ok());
        assert!(Cli::try_parse_from(["corpus-rag", "cache", "clear"]).is_ok());
        assert!(Cli::try_parse_from(["corpus-rag", "cache", "info", "rag_components"]).is_ok());
        assert!(Cli::try_parse_from(["corpus-rag", "cache", "delete", "rag_components"]).is_ok());
    }

    #[test]
    fn cache_info_requires_a_name() {
        let cli = Cli::try_parse_from(["corpus-rag", "cache", "info"]);
        assert!(cli.is_err());
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["corpus-rag", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["corpus-rag", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["corpus-rag", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use cortex_knowledge::ContextStore;
use cortex_knowledge::cli::Cli;
use cortex_knowledge::config::Config;

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("cortex-knowledge starting");

    match cli.command {
        cortex_knowledge::cli::Command::Ingest {
            paths,
            chunk_size,
            overlap,
            tags,
        } => {
            let store = ContextStore::open(&config.store_path)?;
            let ctx_id = store.ingest(
                &paths,
                cortex_knowledge::IngestOptions {
                    chunk_size: chunk_size.unwrap_or(cortex_knowledge::DEFAULT_CHUNK_SIZE),
                    overlap: overlap.unwrap_or(cortex_knowledge::DEFAULT_OVERLAP),
                    tags,
                },
            )?;
            println!("{} Ingested to context: {}", "✓".green(), ctx_id.cyan());
        }
        cortex_knowledge::cli::Command::Search {
            context_id,
            pattern,
            max_results,
            tags,
        } => {
            let store = ContextStore::open(&config.store_path)?;
            let matches = store.search(
                &context_id,
                &pattern,
                cortex_knowledge::SearchOptions {
                    max_results: max_results.unwrap_or(10),
                    tags,
                    ..Default::default()
                },
            )?;
            for m in matches {
                println!(
                    "{}:{} ({:.2}) {}",
                    m.chunk_id.yellow(),
                    m.offset.to_string().dimmed(),
                    m.relevance,
                    m.snippet
                );
            }
        }
        cortex_knowledge::cli::Command::Cat { chunk_id } => {
            let store = ContextStore::open(&config.store_path)?;
            let content = store.get_chunk(&chunk_id)?;
            println!("{}", content);
        }
        cortex_knowledge::cli::Command::Window { chunk_id, offset, radius } => {
            let store = ContextStore::open(&config.store_path)?;
            let content = store.get_window(&chunk_id, offset, radius)?;
            println!("{}", content);
        }
        cortex_knowledge::cli::Command::Stats { context_id } => {
            let store = ContextStore::open(&config.store_path)?;
            let stats = store.stats(&context_id)?;
            println!("Context: {}", context_id.cyan());
            println!("  Chunks: {}", stats.chunk_count);
            println!("  Total bytes: {}", stats.total_bytes);
            println!("  Sources: {}", stats.source_count);
        }
        cortex_knowledge::cli::Command::List => {
            let store = ContextStore::open(&config.store_path)?;
            let contexts = store.list_contexts()?;
            if contexts.is_empty() {
                println!("No contexts found");
            } else {
                for ctx in contexts {
                    println!("{}", ctx);
                }
            }
        }
        cortex_knowledge::cli::Command::Delete { context_id } => {
            let store = ContextStore::open(&config.store_path)?;
            store.delete(&context_id)?;
            println!("{} Deleted context: {}", "✓".green(), context_id);
        }
    }

    Ok(())
}

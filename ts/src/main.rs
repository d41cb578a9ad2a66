use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use cortex_memory::Store;
use cortex_memory::cli::{Cli, Command};
use cortex_memory::config::Config;

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
    let store = Store::open(&config.db_path).context("Failed to open memory store")?;

    info!("cortex-memory starting");

    match cli.command {
        Command::UserGet { field } => {
            let mem = store.get_user_memory()?;
            match field.as_deref() {
                Some("name") => println!("{}", mem.name.unwrap_or_default()),
                Some("role") => println!("{}", mem.role.unwrap_or_default()),
                Some("experience") => println!("{}", mem.experience.unwrap_or_default()),
                Some("os") => println!("{}", mem.os.unwrap_or_default()),
                Some("shell") => println!("{}", mem.shell.unwrap_or_default()),
                Some("editor") => println!("{}", mem.editor.unwrap_or_default()),
                Some(other) => eprintln!("{} unknown field: {other}", "✗".red()),
                None => {
                    println!("name:       {}", mem.name.unwrap_or_default());
                    println!("role:       {}", mem.role.unwrap_or_default());
                    println!("experience: {}", mem.experience.unwrap_or_default());
                    println!("os:         {}", mem.os.unwrap_or_default());
                    println!("shell:      {}", mem.shell.unwrap_or_default());
                    println!("editor:     {}", mem.editor.unwrap_or_default());
                }
            }
        }
        Command::UserSet { field, value } => {
            store.update_user_memory(&field, &value)?;
            println!("{} {field} set", "✓".green());
        }
        Command::ProjectGet => {
            let mem = store.get_project_memory()?;
            println!("summary: {}", mem.summary.unwrap_or_default());
            for c in mem.conventions {
                println!("  - {c}");
            }
        }
        Command::ProjectSet { summary, convention } => {
            store.set_project_memory(summary.as_deref(), &convention)?;
            println!("{} project memory updated", "✓".green());
        }
        Command::Insert { content, tags } => {
            let id = store.insert_archival(&content, &tags)?;
            println!("{} inserted archival entry {id}", "✓".green());
        }
        Command::Search { query, tags, k } => {
            let hits = store.search_archival(&query, &tags, k)?;
            if hits.is_empty() {
                println!("No matches");
            } else {
                for hit in hits {
                    println!("{} ({:.2}) {}", hit.id.to_string().yellow(), hit.relevance, hit.content);
                }
            }
        }
        Command::Tools => {
            let defs = store.get_tool_definitions()?;
            if defs.is_empty() {
                println!("No tool definitions registered");
            } else {
                for def in defs {
                    println!("{}: {}", def.name.cyan(), def.description);
                }
            }
        }
    }

    Ok(())
}

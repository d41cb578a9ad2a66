//! CLI entry point for the cognitive request-processing orchestrator.

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use cortex::cli::{Cli, Command, ModeCommand, OutputFormat, PersonaCommand};
use cortex::coordinators::{
    CognitiveCoordinator, DefaultToolsCoordinator, MemoryCoordinator, Mode, NoopCognitiveCoordinator, NoopMemoryCoordinator,
    NoopPersonaCoordinator, PersonaCoordinator, SqliteMemoryCoordinator,
};
use cortex::domain::Request;
use cortex::orchestrator::{Orchestrator, OrchestratorBuilder};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("cortex").join("logs");
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = match cli_log_level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("cortex.log")).context("Failed to create log file")?;
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn build_memory_coordinator() -> Arc<dyn MemoryCoordinator> {
    let data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from(".")).join("cortex");
    let db_path = data_dir.join("memory.sqlite3");
    let knowledge_dir = data_dir.join("knowledge");

    match SqliteMemoryCoordinator::open(db_path, knowledge_dir) {
        Ok(coordinator) => Arc::new(coordinator),
        Err(e) => {
            warn!(error = %e, "build_memory_coordinator: failed to open memory store, falling back to disabled");
            Arc::new(NoopMemoryCoordinator)
        }
    }
}

fn build_orchestrator() -> Arc<Orchestrator> {
    let cognitive: Arc<dyn CognitiveCoordinator> = Arc::new(NoopCognitiveCoordinator::default());
    let memory: Arc<dyn MemoryCoordinator> = build_memory_coordinator();
    let persona: Arc<dyn PersonaCoordinator> = Arc::new(NoopPersonaCoordinator::default());
    let tools = Arc::new(DefaultToolsCoordinator::standard());

    Arc::new(
        OrchestratorBuilder::new(cortex::config::OrchestratorConfig::default(), cognitive, memory, persona, tools).build(),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let orchestrator = build_orchestrator();

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Ask {
            input,
            command,
            unrestricted,
            format,
        }) => cmd_ask(&orchestrator, input, command, unrestricted, format).await,
        Some(Command::Repl) => cmd_repl(&orchestrator).await,
        Some(Command::Stats { format }) => cmd_stats(&orchestrator, format),
        Some(Command::Mode { command }) => cmd_mode(&orchestrator, command).await,
        Some(Command::Persona { command }) => cmd_persona(&orchestrator, command).await,
        None => cmd_repl(&orchestrator).await,
    }
}

async fn cmd_ask(orchestrator: &Orchestrator, input: String, as_command: bool, unrestricted: bool, format: OutputFormat) -> Result<()> {
    let mut request = if as_command { Request::command(input) } else { Request::chat(input) };
    request.context.unrestricted = unrestricted;

    let response = orchestrator.process(request).await;
    print_response(&response, format);
    Ok(())
}

async fn cmd_repl(orchestrator: &Orchestrator) -> Result<()> {
    println!("cortex REPL. Type 'exit' to quit.");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let mut request = Request::chat(line);
        request.context.unrestricted = true;
        let response = orchestrator.process(request).await;
        print_response(&response, OutputFormat::Text);
    }
    Ok(())
}

fn cmd_stats(orchestrator: &Orchestrator, format: OutputFormat) -> Result<()> {
    let snapshot = orchestrator.stats();
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "total": snapshot.total,
                "success": snapshot.success,
                "failure": snapshot.failure,
                "cancelled": snapshot.cancelled,
                "tool_calls": snapshot.tool_calls,
                "knowledge_hits": snapshot.knowledge_hits,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("total:         {}", snapshot.total);
            println!("success:       {}", snapshot.success);
            println!("failure:       {}", snapshot.failure);
            println!("cancelled:     {}", snapshot.cancelled);
            println!("tool_calls:    {}", snapshot.tool_calls);
            println!("knowledge_hits: {}", snapshot.knowledge_hits);
        }
    }
    Ok(())
}

async fn cmd_mode(orchestrator: &Orchestrator, command: ModeCommand) -> Result<()> {
    match command {
        ModeCommand::Get => {
            println!("{}", orchestrator.get_active_mode().await.as_str());
        }
        ModeCommand::Set { mode } => {
            let mode = Mode::parse(&mode).ok_or_else(|| eyre::eyre!("unknown mode: {mode}"))?;
            orchestrator.set_mode(mode, "cli").await?;
            println!("mode set to {}", mode.as_str());
        }
    }
    Ok(())
}

async fn cmd_persona(orchestrator: &Orchestrator, command: PersonaCommand) -> Result<()> {
    match command {
        PersonaCommand::Get => {
            let persona = orchestrator.get_active_persona().await?;
            println!("{}", persona.id);
        }
        PersonaCommand::Set { id } => {
            orchestrator.set_persona(&id).await?;
            println!("persona set to {id}");
        }
    }
    Ok(())
}

fn print_response(response: &cortex::domain::Response, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "request_id": response.request_id,
                "success": response.success,
                "content": response.content,
                "error": response.error,
                "duration_ms": response.duration.as_millis(),
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Text => {
            println!("{}", response.content);
            if let Some(error) = &response.error {
                eprintln!("error: {error}");
            }
        }
    }
}

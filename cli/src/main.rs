//! CLI entrypoint for thinkstep
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use thinkstep_application::{
    AvailabilityPort, LanguageModel, RunEvent, TaskController, TranscriptLogger,
};
use thinkstep_domain::{CANCELED_STATUS, PromptMode};
use thinkstep_infrastructure::{ConfigLoader, FileConfig, JsonlTranscriptLogger, LocalModelGateway};
use thinkstep_presentation::{
    ChatRepl, Cli, ConsoleFormatter, NoReporter, OutputConfig, ProgressReporter, ReplConfig,
    RunReporter, SimpleProgress,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    info!("Starting thinkstep");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    // === Configuration ===
    let mut file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&cli, &mut file_config);
    let playground = file_config.to_playground_config()?;

    OutputConfig {
        color: file_config.output.color,
    }
    .apply();

    // === Dependency Injection ===
    let gateway = Arc::new(LocalModelGateway::new(&file_config.model)?);
    let (tx, rx) = mpsc::unbounded_channel();
    let mut controller =
        TaskController::new(Arc::clone(&gateway), Arc::clone(&gateway), playground, tx);

    let transcript_path = cli
        .transcript
        .clone()
        .or_else(|| file_config.transcript.path.as_ref().map(Into::into));
    if let Some(path) = transcript_path {
        match JsonlTranscriptLogger::new(&path) {
            Some(logger) => {
                info!("Writing transcript to {}", logger.path().display());
                let logger: Arc<dyn TranscriptLogger> = Arc::new(logger);
                controller = controller.with_transcript_logger(logger);
            }
            None => warn!("Transcript disabled: cannot open {}", path.display()),
        }
    }
    let controller = Arc::new(controller);

    // Chat mode
    if cli.chat {
        if let Some(mode) = cli.mode {
            controller.select_mode(mode);
        }
        let repl_config = ReplConfig {
            show_progress: file_config.repl.show_progress && !cli.quiet,
            history_file: file_config.repl.history_file.clone(),
        };
        let mut repl =
            ChatRepl::new(controller, rx, file_config.model.name.clone()).with_config(repl_config);

        repl.run().await?;
        return Ok(ExitCode::SUCCESS);
    }

    // Single question mode - question is required
    let question = match cli.question {
        Some(q) => q,
        None => bail!("Question is required. Use --chat for interactive mode."),
    };
    let mode = cli.mode.unwrap_or(playground.initial_mode());

    let reporter: Box<dyn RunReporter> = if cli.quiet {
        Box::new(NoReporter)
    } else if file_config.repl.show_progress {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    run_once(&controller, rx, reporter.as_ref(), mode, &question).await
}

/// Answer one question and print the outcome
async fn run_once<G, A>(
    controller: &TaskController<G, A>,
    mut events: mpsc::UnboundedReceiver<RunEvent>,
    reporter: &dyn RunReporter,
    mode: PromptMode,
    question: &str,
) -> Result<ExitCode>
where
    G: LanguageModel + 'static,
    A: AvailabilityPort + 'static,
{
    if let Err(e) = controller.start(mode, question).await {
        eprintln!("{}", ConsoleFormatter::format_error(e.status_message()));
        if mode == PromptMode::None {
            eprintln!("Use --mode zero-shot, zero-shot-cot or self-consistency.");
        }
        return Ok(ExitCode::FAILURE);
    }

    let code = loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break ExitCode::FAILURE };
                reporter.on_event(&event);
                match event {
                    RunEvent::Result { answer, .. } => {
                        println!("{}", ConsoleFormatter::format_answer(mode, question, &answer));
                        break ExitCode::SUCCESS;
                    }
                    RunEvent::Error { message, .. } => {
                        eprintln!("{}", ConsoleFormatter::format_error(&message));
                        break ExitCode::FAILURE;
                    }
                    RunEvent::Canceled { .. } => {
                        eprintln!("{}", CANCELED_STATUS);
                        break ExitCode::from(130);
                    }
                    _ => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                controller.cancel();
            }
        }
    };

    controller.wait().await;
    Ok(code)
}

/// Command-line flags take precedence over every config source
fn apply_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(endpoint) = &cli.endpoint {
        config.model.endpoint = endpoint.clone();
    }
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }
}

/// Initialize logging based on verbosity level, optionally teeing to a file
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "thinkstep.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(EnvFilter::new(level))
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(EnvFilter::new(level))
                .with(stderr_layer)
                .init();
            None
        }
    }
}

//! REPL (Read-Eval-Print Loop) for interactive questions

use crate::ConsoleFormatter;
use crate::config::ReplConfig;
use crate::progress::reporter::{ProgressReporter, RunReporter, SimpleProgress};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use thinkstep_application::{AvailabilityPort, LanguageModel, RunEvent, TaskController};
use thinkstep_domain::{CANCELED_STATUS, DomainError, PromptMode};
use tokio::sync::mpsc;

/// A parsed slash command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Help,
    Modes,
    Status,
    Mode(Result<PromptMode, String>),
    Unknown(String),
}

impl Command {
    /// Parse a line starting with `/`
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.collect::<Vec<_>>().join(" ");
        match name {
            "/quit" | "/exit" | "/q" => Command::Quit,
            "/help" | "/h" | "/?" => Command::Help,
            "/modes" => Command::Modes,
            "/status" => Command::Status,
            "/mode" | "/m" if arg.is_empty() => Command::Mode(Err("Usage: /mode <name>".to_string())),
            "/mode" | "/m" => Command::Mode(arg.parse().map_err(|e: DomainError| e.to_string())),
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Interactive REPL around a [`TaskController`]
pub struct ChatRepl<G: LanguageModel + 'static, A: AvailabilityPort + 'static> {
    controller: Arc<TaskController<G, A>>,
    events: mpsc::UnboundedReceiver<RunEvent>,
    reporter: Box<dyn RunReporter>,
    config: ReplConfig,
    model_name: String,
}

impl<G: LanguageModel + 'static, A: AvailabilityPort + 'static> ChatRepl<G, A> {
    /// Create a REPL reading run events from `events`
    pub fn new(
        controller: Arc<TaskController<G, A>>,
        events: mpsc::UnboundedReceiver<RunEvent>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            controller,
            events,
            reporter: Box::new(ProgressReporter::new()),
            config: ReplConfig::default(),
            model_name: model_name.into(),
        }
    }

    /// Set REPL options; hides the spinner when `show_progress` is off
    pub fn with_config(mut self, config: ReplConfig) -> Self {
        if !config.show_progress {
            self.reporter = Box::new(SimpleProgress);
        }
        self.config = config;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = self.config.history_path();

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    // Handle commands
                    if line.starts_with('/') {
                        if self.handle_command(Command::parse(line)) {
                            break;
                        }
                        continue;
                    }

                    self.process_question(line).await;
                }
                // Ctrl-C at the prompt: nothing is running, ignore
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│             thinkstep - Chat Mode           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {}", self.model_name);
        println!("{}", ConsoleFormatter::format_mode(self.controller.current_mode()));
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /mode <name>     - Select a mode (zero-shot, zero-shot-cot, self-consistency)");
        println!("  /modes           - List modes");
        println!("  /status          - Show mode and run state");
        println!("  /help, /h, /?    - Show this help");
        println!("  /quit, /exit, /q - Exit chat");
        println!();
        println!("Press Ctrl-C while a question is being answered to cancel it.");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => {
                println!("Bye!");
                return true;
            }
            Command::Help => {
                println!();
                Self::print_help();
            }
            Command::Modes => {
                println!();
                println!(
                    "{}",
                    ConsoleFormatter::format_modes(self.controller.current_mode())
                );
            }
            Command::Status => {
                println!();
                println!("{}", ConsoleFormatter::format_mode(self.controller.current_mode()));
                println!("Model: {}", self.model_name);
                println!("State: {}", self.controller.state());
                if let Some(outcome) = self.controller.last_outcome() {
                    println!("Last run: {}", outcome);
                }
                println!();
            }
            Command::Mode(Ok(mode)) => {
                self.controller.select_mode(mode);
                self.print_pending();
            }
            Command::Mode(Err(e)) => {
                println!("{}", e);
                println!("Type /modes for available modes");
            }
            Command::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    /// Print mode changes and status lines queued outside a run
    fn print_pending(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                RunEvent::ModeChanged { mode, .. } => {
                    println!("{}", ConsoleFormatter::format_mode(mode));
                }
                RunEvent::Status(status) => {
                    println!("{}", ConsoleFormatter::format_status(&status));
                }
                _ => {}
            }
        }
    }

    async fn process_question(&mut self, question: &str) {
        println!();

        let mode = self.controller.current_mode();
        if self.controller.submit(question).await.is_err() {
            // The rejection reason arrives as a status event
            self.print_pending();
            println!();
            return;
        }

        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else { break };
                    self.reporter.on_event(&event);
                    match event {
                        RunEvent::Result { answer, .. } => {
                            println!("{}", ConsoleFormatter::format_answer(mode, question, &answer));
                            break;
                        }
                        RunEvent::Error { message, .. } => {
                            eprintln!("{}", ConsoleFormatter::format_error(&message));
                            break;
                        }
                        RunEvent::Canceled { .. } => {
                            println!("{}", CANCELED_STATUS);
                            break;
                        }
                        _ => {}
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    self.controller.cancel();
                }
            }
        }

        self.controller.wait().await;
        println!();
    }
}

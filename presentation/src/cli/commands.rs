//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;
use thinkstep_domain::{DomainError, PromptMode};

/// CLI arguments for thinkstep
#[derive(Parser, Debug)]
#[command(name = "thinkstep")]
#[command(author, version, about = "Prompting-strategy playground for a local language model")]
#[command(long_about = r#"
thinkstep answers a question with a local language model using one of three
prompting strategies:

  zero-shot         The question is sent as-is
  zero-shot-cot     The model is told to think step by step
  self-consistency  Three step-by-step answers are generated in parallel,
                    compared, and merged into one final answer

Configuration files are loaded from (in priority order):
1. THINKSTEP_* environment variables (e.g. THINKSTEP_MODEL__NAME)
2. --config <path>     Explicit config file
3. ./thinkstep.toml    Project-level config
4. ~/.config/thinkstep/config.toml   Global config

Example:
  thinkstep -m zero-shot "What is 2+2?"
  thinkstep -m sc "Is the sky blue?"
  thinkstep --chat --model phi3
"#)]
pub struct Cli {
    /// The question to answer (not required in chat mode)
    pub question: Option<String>,

    /// Prompting strategy: zero-shot (zs), zero-shot-cot (cot), self-consistency (sc)
    #[arg(short, long, value_name = "MODE", value_parser = parse_mode)]
    pub mode: Option<PromptMode>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Base URL of the local model server
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Model name on the server
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append a JSONL transcript of every run to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

fn parse_mode(s: &str) -> Result<PromptMode, String> {
    let mode: PromptMode = s.parse().map_err(|e: DomainError| e.to_string())?;
    if mode.allows_submission() {
        Ok(mode)
    } else {
        Err("choose zero-shot, zero-shot-cot or self-consistency".to_string())
    }
}

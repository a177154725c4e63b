//! Console output formatter for run results

use colored::Colorize;
use thinkstep_domain::PromptMode;

/// Formats answers, errors and mode information for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the final answer of a run
    pub fn format_answer(mode: PromptMode, question: &str, answer: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            format!("=== {} ===", mode.label()).cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), question));
        output.push_str(answer.trim_end());
        output.push('\n');

        output
    }

    /// Format a run failure; `message` already reads "Error: ..."
    pub fn format_error(message: &str) -> String {
        message.red().bold().to_string()
    }

    /// Format a status line
    pub fn format_status(status: &str) -> String {
        format!("{} {}", "->".cyan(), status.dimmed())
    }

    /// Format the active mode with its description
    pub fn format_mode(mode: PromptMode) -> String {
        format!(
            "{} {}\n{}",
            "Mode:".cyan().bold(),
            mode.label().yellow().bold(),
            Self::indent(mode.description(), "  ")
        )
    }

    /// List the selectable modes, marking the active one
    pub fn format_modes(current: PromptMode) -> String {
        let mut output = format!("{}\n", "Modes:".cyan().bold());
        for mode in PromptMode::selectable() {
            let marker = if mode == current { "*" } else { " " };
            output.push_str(&format!(
                " {} {:<18} {}\n",
                marker,
                mode.as_str(),
                mode.description().dimmed()
            ));
        }
        output
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

//! Prompting mode definitions.
//!
//! [`PromptMode`] is the single user-facing axis of the playground:
//! - ZeroShot: the raw question, no instructions
//! - ZeroShotCoT: the raw question with a "think step by step" nudge
//! - SelfConsistency: three chain-of-thought answers reduced to one by the model itself

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prompting mode used for the next submission.
///
/// `None` is the initial state and disables submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptMode {
    /// No mode selected yet
    #[default]
    None,
    /// One call, empty instruction
    ZeroShot,
    /// One call with the chain-of-thought instruction
    #[serde(rename = "zero-shot-cot")]
    ZeroShotCoT,
    /// Three concurrent CoT calls, then evaluation and finalization
    SelfConsistency,
}

impl PromptMode {
    /// Modes that can actually be submitted, in menu order
    pub fn selectable() -> [PromptMode; 3] {
        [
            PromptMode::ZeroShot,
            PromptMode::ZeroShotCoT,
            PromptMode::SelfConsistency,
        ]
    }

    /// Human-readable label shown in the mode menu
    pub fn label(&self) -> &'static str {
        match self {
            PromptMode::None => "Select Mode",
            PromptMode::ZeroShot => "Zero-Shot",
            PromptMode::ZeroShotCoT => "Zero-Shot-CoT",
            PromptMode::SelfConsistency => "Self-Consistency",
        }
    }

    /// Description shown below the mode menu
    pub fn description(&self) -> &'static str {
        match self {
            PromptMode::None => "Please select a mode",
            PromptMode::ZeroShot => {
                "This mode will process your prompt without any instructions."
            }
            PromptMode::ZeroShotCoT => {
                "This mode will process your input as a simple Chain-of-Thought prompt."
            }
            PromptMode::SelfConsistency => {
                "This mode will first generate three CoT answers to your prompt and choose the most common one for its final answer."
            }
        }
    }

    /// Machine identifier (also accepted by `FromStr`)
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptMode::None => "none",
            PromptMode::ZeroShot => "zero-shot",
            PromptMode::ZeroShotCoT => "zero-shot-cot",
            PromptMode::SelfConsistency => "self-consistency",
        }
    }

    /// Whether a question may be submitted in this mode
    pub fn allows_submission(&self) -> bool {
        !matches!(self, PromptMode::None)
    }

    /// Number of model calls a run in this mode performs
    pub fn call_count(&self) -> usize {
        match self {
            PromptMode::None => 0,
            PromptMode::ZeroShot | PromptMode::ZeroShotCoT => 1,
            PromptMode::SelfConsistency => 5,
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for PromptMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(PromptMode::None),
            "zero-shot" | "zeroshot" | "zs" => Ok(PromptMode::ZeroShot),
            "zero-shot-cot" | "zeroshotcot" | "cot" | "zscot" => Ok(PromptMode::ZeroShotCoT),
            "self-consistency" | "selfconsistency" | "sc" => Ok(PromptMode::SelfConsistency),
            _ => Err(DomainError::InvalidMode(s.to_string())),
        }
    }
}

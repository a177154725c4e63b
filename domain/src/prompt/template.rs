//! Instruction texts and prompt templates for each prompting mode

use crate::orchestration::mode::PromptMode;
use std::fmt;

/// System-level behavior directive given to a model session (Value Object)
///
/// Immutable; an empty instruction means "no instructions".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction(String);

impl Instruction {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The empty instruction used by zero-shot prompting
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Instruction {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Templates for the instructions and inputs used at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Chain-of-thought nudge
    pub const CHAIN_OF_THOUGHT: &'static str = "Let's think step by step.";

    /// Compare three solutions and merge the two most similar
    pub const SELF_CONSISTENCY_EVALUATION: &'static str = "You are provided with three solutions to the same problem. Compare every solution to each other and choose the most common solution. Your output should be a unified answer consisting of the two solutions, which are the most similar in their results. Always include the result itself in your output.";

    /// Rephrase the merged solution into one definitive answer
    pub const SELF_CONSISTENCY_RESULT: &'static str = "You are provided with two similar solutions to the same question. Rephrase them into one unified answer and output only that unified definitive answer/solution. Do not mention your evaluation process or that there were more that one solution. Always include the result itself in your output.";

    /// Instruction for the answering calls of a mode
    ///
    /// Self-consistency answers with chain-of-thought; `None` has no calls
    /// and gets the empty instruction.
    pub fn answer_instruction(mode: PromptMode) -> Instruction {
        match mode {
            PromptMode::ZeroShotCoT | PromptMode::SelfConsistency => Self::chain_of_thought(),
            PromptMode::ZeroShot | PromptMode::None => Instruction::empty(),
        }
    }

    pub fn chain_of_thought() -> Instruction {
        Instruction::new(Self::CHAIN_OF_THOUGHT)
    }

    pub fn evaluation_instruction() -> Instruction {
        Instruction::new(Self::SELF_CONSISTENCY_EVALUATION)
    }

    pub fn result_instruction() -> Instruction {
        Instruction::new(Self::SELF_CONSISTENCY_RESULT)
    }

    /// Input for the evaluation call: the three raw answers tagged in order
    pub fn evaluation_prompt(answers: &[String; 3]) -> String {
        format!(
            "SOLUTION 1: {} SOLUTION 2: {} SOLUTION 3: {}",
            answers[0], answers[1], answers[2]
        )
    }
}

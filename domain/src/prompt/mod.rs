//! Prompt instructions and input templates

pub mod template;

pub use template::{Instruction, PromptTemplate};

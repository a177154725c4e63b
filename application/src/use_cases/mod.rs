//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod run_prompt;
pub mod task_controller;

#[cfg(test)]
pub(crate) mod test_support;

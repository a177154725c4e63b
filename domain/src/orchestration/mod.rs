//! Prompt orchestration domain
//!
//! Prompting modes, the mode selector, and the stages and lifecycle
//! states a run passes through.

pub mod entities;
pub mod mode;
pub mod selector;

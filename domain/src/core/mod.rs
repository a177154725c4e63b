//! Core domain concepts shared across all subdomains.
//!
//! - [`question::Question`]: a validated, non-blank question
//! - [`sampling::SamplingOptions`]: sampling parameters passed to every model call
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod question;
pub mod sampling;
pub mod string;

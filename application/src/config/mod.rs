//! Application-level configuration.
//!
//! - [`PlaygroundConfig`]: sampling parameters and the initially selected mode

pub mod playground_config;

pub use playground_config::PlaygroundConfig;

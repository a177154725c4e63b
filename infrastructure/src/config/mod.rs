//! Configuration file loading for thinkstep
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables: `THINKSTEP_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./thinkstep.toml` or `./.thinkstep.toml`
//! 4. Global: `<config_dir>/thinkstep/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_ENDPOINT, DEFAULT_MODEL_NAME, FileConfig, FileModelConfig,
    FileOutputConfig, FilePlaygroundConfig, FileReplConfig, FileSamplingConfig,
    FileTranscriptConfig,
};
pub use loader::ConfigLoader;

//! CLI interface for phrase-trie
//!
//! Provides command-line utilities for grammar inspection and queries.

pub mod args;
pub mod commands;
pub mod detect;
pub mod paths;

pub use args::{Cli, Commands};
pub use detect::{detect_format, FormatDetection};
pub use paths::{config_dir, PersistentConfig};

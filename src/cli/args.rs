//! CLI argument definitions

use crate::serialization::GrammarFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "phrase-trie")]
#[command(about = "Phrase autocompletion over grammars of word patterns")]
#[command(version)]
pub struct Cli {
    /// Custom configuration file path
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive REPL
    Repl {
        /// Grammar file to load
        #[arg(short, long)]
        grammar: Option<PathBuf>,

        /// Serialization format (auto-detected if not specified)
        #[arg(short = 'f', long)]
        format: Option<GrammarFormat>,

        /// Scope to query
        #[arg(short, long)]
        scope: Option<String>,

        /// Words available for resolving lookups
        #[arg(short = 'a', long)]
        lookahead: Option<usize>,

        /// Result limit
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Suggest completions for an input
    Suggest {
        /// Input words typed so far (the last may be partial)
        input: Vec<String>,

        /// Grammar file
        #[arg(short, long)]
        grammar: Option<PathBuf>,

        /// Serialization format (auto-detected if not specified)
        #[arg(short = 'f', long)]
        format: Option<GrammarFormat>,

        /// Scope to query
        #[arg(short, long)]
        scope: Option<String>,

        /// Words available for resolving lookups
        #[arg(short = 'a', long)]
        lookahead: Option<usize>,

        /// Limit results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List the patterns of one scope or of every scope
    Patterns {
        /// Scope to list (all scopes if not specified)
        scope: Option<String>,

        /// Grammar file
        #[arg(short, long)]
        grammar: Option<PathBuf>,

        /// Serialization format (auto-detected if not specified)
        #[arg(short = 'f', long)]
        format: Option<GrammarFormat>,
    },

    /// Load a grammar and report its size
    Check {
        /// Grammar file
        grammar: Option<PathBuf>,

        /// Serialization format (auto-detected if not specified)
        #[arg(short = 'f', long)]
        format: Option<GrammarFormat>,
    },

    /// Convert a grammar between formats
    Convert {
        /// Input grammar file
        input: PathBuf,

        /// Output grammar file
        output: PathBuf,

        /// Input format (auto-detected if not specified)
        #[arg(long)]
        from_format: Option<GrammarFormat>,

        /// Output format (taken from the output extension if not specified)
        #[arg(long)]
        to_format: Option<GrammarFormat>,
    },

    /// Show or update user settings
    Settings {
        /// Set default grammar path
        #[arg(long)]
        set_grammar: Option<PathBuf>,

        /// Set default scope
        #[arg(long)]
        set_scope: Option<String>,

        /// Set default lookahead
        #[arg(long)]
        set_lookahead: Option<usize>,

        /// Set default result limit
        #[arg(long)]
        set_limit: Option<usize>,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

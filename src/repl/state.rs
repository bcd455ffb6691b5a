//! REPL state management
//!
//! Holds the grammar being explored and the query parameters.

use crate::cli::commands::{load_grammar, pick_scope, save_grammar};
use crate::cli::detect::detect_format;
use crate::cli::paths::PersistentConfig;
use crate::dictionary::Dictionary;
use crate::pattern::IntoTokens;
use crate::serialization::{Grammar, GrammarFormat};
use crate::suggestion::Suggestion;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// REPL state
pub struct ReplState {
    /// The grammar being explored
    pub dictionary: Dictionary,
    /// Scope queried by `suggest` (picked automatically if unset)
    pub scope: Option<String>,
    /// Words available for resolving lookups
    pub lookahead: usize,
    /// Maximum number of suggestions shown
    pub limit: Option<usize>,
    /// Format used when saving
    pub format: GrammarFormat,
    /// File the grammar was loaded from
    pub grammar_path: Option<PathBuf>,
    /// Config file override
    pub config_path: Option<PathBuf>,
}

impl ReplState {
    /// Create a state with an empty grammar
    pub fn new() -> Self {
        Self {
            dictionary: Dictionary::new(),
            scope: None,
            lookahead: 0,
            limit: None,
            format: GrammarFormat::default(),
            grammar_path: None,
            config_path: None,
        }
    }

    /// Apply a merged configuration
    pub fn configure(&mut self, config: &PersistentConfig) {
        self.scope = config.scope.clone();
        self.lookahead = config.lookahead.unwrap_or(0);
        self.limit = config.limit;
        if let Some(format) = config.format {
            self.format = format;
        }
    }

    /// Name of the scope queries run against
    pub fn current_scope(&self) -> Result<String> {
        pick_scope(&self.dictionary, self.scope.as_deref())
    }

    /// Suggestions for `input` in the current scope, limited
    pub fn suggest(&self, input: &[String]) -> Result<Vec<Suggestion>> {
        let name = self.current_scope()?;
        let scope = self.dictionary.scope(&name)?;
        let mut suggestions = scope.suggest(input, self.lookahead);
        if let Some(limit) = self.limit {
            suggestions.truncate(limit);
        }
        Ok(suggestions)
    }

    /// Describe every walk of `input` through the current scope
    pub fn matches(&self, input: &[String]) -> Result<Vec<(usize, usize)>> {
        let name = self.current_scope()?;
        let scope = self.dictionary.scope(&name)?;
        let tokens = input.into_tokens();
        Ok(scope
            .match_pattern(&tokens)
            .iter()
            .map(|m| (m.nodes.len(), m.remainder.len()))
            .collect())
    }

    /// Replace the grammar with the one stored at `path`
    pub fn load_from_file(&mut self, path: &Path, format: Option<GrammarFormat>) -> Result<usize> {
        let detection = detect_format(path, format)?;
        let grammar = load_grammar(path, detection.format)?;
        self.dictionary = grammar
            .build()
            .with_context(|| format!("Invalid grammar: {}", path.display()))?;
        self.format = detection.format;
        self.grammar_path = Some(path.to_path_buf());
        if let Some(scope) = &self.scope {
            if self.dictionary.resolve(scope).is_none() {
                self.scope = None;
            }
        }
        Ok(grammar.pattern_count())
    }

    /// Write the grammar to `path`
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let grammar = Grammar::from_dictionary(&self.dictionary);
        save_grammar(&grammar, path, GrammarFormat::from_path(path))
    }

    /// Persist the current settings
    pub fn save_config(&self) -> Result<()> {
        let config = PersistentConfig {
            grammar_path: self.grammar_path.clone(),
            format: Some(self.format),
            scope: self.scope.clone(),
            lookahead: Some(self.lookahead),
            limit: self.limit,
        };
        config.save_to(self.config_path.clone())
    }
}

impl Default for ReplState {
    fn default() -> Self {
        Self::new()
    }
}

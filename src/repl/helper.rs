//! Rustyline helper integration
//!
//! Provides completion, hinting, highlighting, and validation for the REPL.
//! Arguments of `suggest` are completed by the grammar itself.

use super::highlighter::CommandHighlighter;
use super::state::ReplState;
use crate::dictionary::Dictionary;
use crate::suggestion::Segment;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};
use std::borrow::Cow;

/// REPL helper
pub struct PhraseHelper {
    highlighter: CommandHighlighter,
    hinter: HistoryHinter,
    commands: Vec<String>,
    dictionary: Dictionary,
    scope: Option<String>,
    lookahead: usize,
}

impl PhraseHelper {
    /// Create a new helper instance
    pub fn new() -> Self {
        Self {
            highlighter: CommandHighlighter::new(),
            hinter: HistoryHinter::new(),
            commands: vec![
                "suggest",
                "match",
                "add",
                "define",
                "remove",
                "scope",
                "scopes",
                "patterns",
                "lookahead",
                "limit",
                "load",
                "save",
                "stats",
                "settings",
                "help",
                "exit",
                "quit",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            dictionary: Dictionary::new(),
            scope: None,
            lookahead: 0,
        }
    }

    /// Take a snapshot of the grammar and query settings
    pub fn set_grammar(&mut self, state: &ReplState) {
        self.dictionary = state.dictionary.clone();
        self.scope = state.current_scope().ok();
        self.lookahead = state.lookahead;
    }

    fn complete_words(&self, words: &[&str], partial: bool) -> Vec<Pair> {
        let Some(scope) = self
            .scope
            .as_deref()
            .and_then(|name| self.dictionary.scope(name).ok())
        else {
            return Vec::new();
        };

        let mut candidates: Vec<Pair> = Vec::new();
        for suggestion in scope.suggest(words, self.lookahead) {
            let candidate = if partial {
                suggestion.completed_word()
            } else {
                match suggestion.segments().first() {
                    Some(Segment::Word(word)) => Some(word.clone()),
                    _ => None,
                }
            };
            if let Some(candidate) = candidate {
                if !candidates.iter().any(|c| c.replacement == candidate) {
                    candidates.push(Pair {
                        display: candidate.clone(),
                        replacement: candidate,
                    });
                }
            }
        }
        candidates
    }

    fn complete_from<'a>(
        options: impl Iterator<Item = &'a str>,
        prefix: &str,
    ) -> Vec<Pair> {
        options
            .filter(|option| option.starts_with(prefix))
            .map(|option| Pair {
                display: option.to_string(),
                replacement: option.to_string(),
            })
            .collect()
    }
}

impl Default for PhraseHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for PhraseHelper {}

impl Completer for PhraseHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let line = &line[..pos];
        let parts: Vec<&str> = line.split_whitespace().collect();
        let trailing_space = line.ends_with(char::is_whitespace);

        if parts.is_empty() {
            let candidates = self
                .commands
                .iter()
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                })
                .collect();
            return Ok((0, candidates));
        }

        let start = line.rfind(char::is_whitespace).map(|i| i + 1).unwrap_or(0);

        if parts.len() == 1 && !trailing_space {
            let prefix = parts[0].to_lowercase();
            let candidates = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(&prefix))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                })
                .collect();
            return Ok((start, candidates));
        }

        let cmd = parts[0].to_lowercase();
        let prefix = if trailing_space {
            ""
        } else {
            parts.last().copied().unwrap_or_default()
        };
        // Index of the argument under the cursor
        let arg = if trailing_space {
            parts.len()
        } else {
            parts.len() - 1
        };

        match cmd.as_str() {
            "suggest" | "s" => {
                let words = &parts[1..];
                if words.is_empty() {
                    return Ok((pos, Vec::new()));
                }
                let mut candidates = self.complete_words(words, !trailing_space);
                if candidates.is_empty() && !trailing_space {
                    // The last word is complete; offer the next one after a space
                    candidates = self
                        .complete_words(words, false)
                        .into_iter()
                        .map(|pair| Pair {
                            display: pair.display,
                            replacement: format!(" {}", pair.replacement),
                        })
                        .collect();
                    return Ok((pos, candidates));
                }
                Ok((if trailing_space { pos } else { start }, candidates))
            }
            "scope" | "use" | "patterns" | "dump" | "list" | "add" | "insert" | "remove"
            | "rm"
                if arg == 1 =>
            {
                Ok((start, Self::complete_from(self.dictionary.scope_names(), prefix)))
            }
            "help" | "?" if arg == 1 => Ok((
                start,
                Self::complete_from(self.commands.iter().map(String::as_str), prefix),
            )),
            "load" if arg == 2 => Ok((
                start,
                Self::complete_from(["json", "bincode"].into_iter(), prefix),
            )),
            _ => Ok((0, vec![])),
        }
    }
}

impl Hinter for PhraseHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<Self::Hint> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for PhraseHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize, forced: bool) -> bool {
        self.highlighter.highlight_char(line, pos, forced)
    }
}

impl Validator for PhraseHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        // Always accept input (validation happens during execution)
        Ok(ValidationResult::Valid(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> PhraseHelper {
        let mut state = ReplState::new();
        state.dictionary.define("devices", ["fan", "light"]).unwrap();
        state
            .dictionary
            .define("main", ["turn on <device:devices>", "turn off", "tune"])
            .unwrap();
        state.scope = Some("main".to_string());

        let mut helper = PhraseHelper::new();
        helper.set_grammar(&state);
        helper
    }

    fn replacements(pairs: &[Pair]) -> Vec<&str> {
        pairs.iter().map(|p| p.replacement.as_str()).collect()
    }

    #[test]
    fn test_complete_partial_word() {
        let helper = helper();
        assert_eq!(
            replacements(&helper.complete_words(&["tu"], true)),
            vec!["tune", "turn"]
        );
    }

    #[test]
    fn test_complete_next_word() {
        let helper = helper();
        assert_eq!(
            replacements(&helper.complete_words(&["turn"], false)),
            vec!["off", "on"]
        );
    }

    #[test]
    fn test_no_scope_no_candidates() {
        let helper = PhraseHelper::new();
        assert!(helper.complete_words(&["turn"], true).is_empty());
    }
}

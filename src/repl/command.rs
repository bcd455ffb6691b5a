//! Command parsing and execution
//!
//! Defines all REPL commands and their execution logic.

use super::state::ReplState;
use crate::cli::commands::format_suggestion;
use crate::serialization::GrammarFormat;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Suggest completions: suggest <words...>
    Suggest {
        /// Input typed so far
        input: Vec<String>,
    },
    /// Show raw matches: match <words...>
    Match {
        /// Input typed so far
        input: Vec<String>,
    },
    /// Add a pattern: add <scope> <pattern>
    Add {
        /// Target scope
        scope: String,
        /// Pattern in text syntax
        pattern: String,
    },
    /// Create a scope: define <scope> [pattern ; pattern ...]
    Define {
        /// New scope name
        scope: String,
        /// Patterns in text syntax
        patterns: Vec<String>,
    },
    /// Remove a pattern: remove <scope> <pattern>
    Remove {
        /// Target scope
        scope: String,
        /// Pattern in text syntax
        pattern: String,
    },
    /// Show or switch the queried scope: scope [name]
    Scope {
        /// Scope to switch to
        name: Option<String>,
    },
    /// List scopes: scopes
    Scopes,
    /// List patterns: patterns [scope]
    Patterns {
        /// Scope to list (current scope if not specified)
        scope: Option<String>,
    },
    /// Set lookahead: lookahead <n>
    Lookahead {
        /// Words available for resolving lookups
        lookahead: Option<usize>,
    },
    /// Set result limit: limit <n>
    Limit {
        /// Result limit
        limit: Option<usize>,
    },
    /// Load grammar from file: load <path> [format]
    Load {
        /// Path to grammar file
        path: PathBuf,
        /// Format (auto-detected if not specified)
        format: Option<GrammarFormat>,
    },
    /// Save grammar to file: save [path]
    Save {
        /// Path to save to (loaded file if not specified)
        path: Option<PathBuf>,
    },
    /// Show statistics: stats | info
    Stats,
    /// Show settings: settings
    Settings,
    /// Show help: help [command]
    Help {
        /// Help topic
        topic: Option<String>,
    },
    /// Exit REPL: exit | quit
    Exit,
}

/// Command result
pub enum CommandResult {
    /// Continue REPL
    Continue(String),
    /// Exit REPL
    Exit,
    /// No output
    Silent,
}

impl Command {
    /// Parse command from input string
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(anyhow::anyhow!("Empty command"));
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();
        let args = &parts[1..];

        match cmd.as_str() {
            "suggest" | "s" => Ok(Self::Suggest {
                input: args.iter().map(|s| s.to_string()).collect(),
            }),
            "match" | "m" => Ok(Self::Match {
                input: args.iter().map(|s| s.to_string()).collect(),
            }),
            "add" | "insert" => Self::parse_add(args),
            "define" | "def" => Self::parse_define(args),
            "remove" | "rm" => Self::parse_remove(args),
            "scope" | "use" => Ok(Self::Scope {
                name: args.first().map(|s| s.to_string()),
            }),
            "scopes" => Ok(Self::Scopes),
            "patterns" | "dump" | "list" => Ok(Self::Patterns {
                scope: args.first().map(|s| s.to_string()),
            }),
            "lookahead" | "la" => Self::parse_lookahead(args),
            "limit" => Self::parse_limit(args),
            "load" => Self::parse_load(args),
            "save" => Ok(Self::Save {
                path: args.first().map(PathBuf::from),
            }),
            "stats" | "info" => Ok(Self::Stats),
            "settings" | "set" => Ok(Self::Settings),
            "help" | "?" => Ok(Self::Help {
                topic: args.first().map(|s| s.to_string()),
            }),
            "exit" | "quit" => Ok(Self::Exit),
            _ => Err(anyhow::anyhow!(
                "Unknown command: '{}'. Type 'help' for available commands.",
                cmd
            )),
        }
    }

    fn parse_add(args: &[&str]) -> Result<Self> {
        if args.len() < 2 {
            return Err(anyhow::anyhow!("Usage: add <scope> <pattern>"));
        }
        Ok(Self::Add {
            scope: args[0].to_string(),
            pattern: args[1..].join(" "),
        })
    }

    fn parse_define(args: &[&str]) -> Result<Self> {
        if args.is_empty() {
            return Err(anyhow::anyhow!(
                "Usage: define <scope> [pattern ; pattern ...]"
            ));
        }
        let patterns = args[1..]
            .join(" ")
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();
        Ok(Self::Define {
            scope: args[0].to_string(),
            patterns,
        })
    }

    fn parse_remove(args: &[&str]) -> Result<Self> {
        if args.len() < 2 {
            return Err(anyhow::anyhow!("Usage: remove <scope> <pattern>"));
        }
        Ok(Self::Remove {
            scope: args[0].to_string(),
            pattern: args[1..].join(" "),
        })
    }

    fn parse_lookahead(args: &[&str]) -> Result<Self> {
        if args.is_empty() {
            return Ok(Self::Lookahead { lookahead: None });
        }
        Ok(Self::Lookahead {
            lookahead: Some(args[0].parse().context("Invalid lookahead value")?),
        })
    }

    fn parse_limit(args: &[&str]) -> Result<Self> {
        let limit = if args.is_empty() || args[0].to_lowercase() == "none" || args[0] == "0" {
            None
        } else {
            Some(args[0].parse().context("Invalid limit value")?)
        };
        Ok(Self::Limit { limit })
    }

    fn parse_load(args: &[&str]) -> Result<Self> {
        if args.is_empty() {
            return Err(anyhow::anyhow!("Usage: load <path> [json|bincode]"));
        }

        let format = match args.get(1).map(|s| s.to_lowercase()) {
            None => None,
            Some(f) if f == "json" => Some(GrammarFormat::Json),
            Some(f) if f == "bincode" || f == "bin" => Some(GrammarFormat::Bincode),
            Some(f) => {
                return Err(anyhow::anyhow!(
                    "Invalid format: '{}'. Valid formats: json, bincode",
                    f
                ))
            }
        };

        Ok(Self::Load {
            path: PathBuf::from(args[0]),
            format,
        })
    }

    /// Whether the command changes the grammar
    pub fn modifies_grammar(&self) -> bool {
        matches!(
            self,
            Self::Add { .. } | Self::Define { .. } | Self::Load { .. }
        )
    }

    /// Execute command
    pub fn execute(&self, state: &mut ReplState) -> Result<CommandResult> {
        match self {
            Self::Suggest { input } => {
                let suggestions = state.suggest(input)?;
                if suggestions.is_empty() {
                    return Ok(CommandResult::Continue(format!("{}", "No suggestions".yellow())));
                }

                let typed = input.join(" ");
                let mut output = String::new();
                for (i, suggestion) in suggestions.iter().enumerate() {
                    output.push_str(&format!(
                        "  {}. {}\n",
                        i + 1,
                        format_suggestion(&typed, suggestion)
                    ));
                }
                output.push_str(&format!("{} suggestion(s)", suggestions.len()));
                Ok(CommandResult::Continue(output))
            }

            Self::Match { input } => {
                let matches = state.matches(input)?;
                if matches.is_empty() {
                    return Ok(CommandResult::Continue(format!("{}", "No matches".yellow())));
                }

                let mut output = String::new();
                for (i, (depth, remainder)) in matches.iter().enumerate() {
                    let status = if *remainder == 0 {
                        "complete".green()
                    } else {
                        format!("{} token(s) left", remainder).yellow()
                    };
                    output.push_str(&format!("  {}. stack depth {}, {}\n", i + 1, depth, status));
                }
                output.push_str(&format!("{} match(es)", matches.len()));
                Ok(CommandResult::Continue(output))
            }

            Self::Add { scope, pattern } => {
                state.dictionary.scope_mut(scope)?.add(pattern.as_str())?;
                Ok(CommandResult::Continue(format!(
                    "Added {} to {}",
                    pattern.green(),
                    scope.cyan()
                )))
            }

            Self::Define { scope, patterns } => {
                state.dictionary.define(scope.as_str(), patterns)?;
                Ok(CommandResult::Continue(format!(
                    "Defined {} with {} pattern(s)",
                    scope.cyan(),
                    patterns.len().to_string().green().bold()
                )))
            }

            Self::Remove { scope, pattern } => {
                state.dictionary.scope_mut(scope)?.remove(pattern.as_str())?;
                Ok(CommandResult::Silent)
            }

            Self::Scope { name: None } => Ok(CommandResult::Continue(format!(
                "Current scope: {}",
                state.current_scope()?.cyan()
            ))),

            Self::Scope { name: Some(name) } => {
                state.dictionary.scope(name)?;
                state.scope = Some(name.clone());
                Ok(CommandResult::Continue(format!("Scope set to {}", name.cyan())))
            }

            Self::Scopes => {
                let current = state.current_scope().ok();
                let mut output = String::new();
                for name in state.dictionary.scope_names() {
                    let patterns = state.dictionary.scope(name)?.patterns().len();
                    let marker = if current.as_deref() == Some(name) { "*" } else { " " };
                    output.push_str(&format!(
                        " {} {} ({} pattern(s))\n",
                        marker.green().bold(),
                        name.cyan(),
                        patterns
                    ));
                }
                output.push_str(&format!("{} scope(s)", state.dictionary.len()));
                Ok(CommandResult::Continue(output))
            }

            Self::Patterns { scope } => {
                let name = match scope {
                    Some(name) => name.clone(),
                    None => state.current_scope()?,
                };
                let patterns = state.dictionary.scope(&name)?.patterns();
                let mut output = format!("{}\n", name.bold().underline());
                for pattern in &patterns {
                    output.push_str(&format!("  {}\n", pattern.to_string().green()));
                }
                output.push_str(&format!("{} pattern(s)", patterns.len()));
                Ok(CommandResult::Continue(output))
            }

            Self::Lookahead { lookahead } => {
                if let Some(lookahead) = lookahead {
                    state.lookahead = *lookahead;
                }
                Ok(CommandResult::Continue(format!(
                    "Lookahead: {}",
                    state.lookahead.to_string().green()
                )))
            }

            Self::Limit { limit } => {
                state.limit = *limit;
                let shown = limit.map(|l| l.to_string()).unwrap_or_else(|| "none".to_string());
                Ok(CommandResult::Continue(format!("Result limit: {}", shown.green())))
            }

            Self::Load { path, format } => {
                let count = state.load_from_file(path, *format)?;
                Ok(CommandResult::Continue(format!(
                    "Loaded {} pattern(s) in {} scope(s) from {}",
                    count.to_string().green().bold(),
                    state.dictionary.len().to_string().green(),
                    path.display().to_string().cyan()
                )))
            }

            Self::Save { path } => {
                let path = path
                    .clone()
                    .or_else(|| state.grammar_path.clone())
                    .context("Usage: save <path> (no grammar file loaded)")?;
                state.save_to_file(&path)?;
                state.grammar_path = Some(path.clone());
                Ok(CommandResult::Continue(format!(
                    "Saved grammar to {}",
                    path.display().to_string().cyan()
                )))
            }

            Self::Stats => {
                let grammar = crate::serialization::Grammar::from_dictionary(&state.dictionary);
                Ok(CommandResult::Continue(format!(
                    "{}\n  Scopes:   {}\n  Patterns: {}\n  Nodes:    {}",
                    "Grammar Statistics".bold().underline(),
                    state.dictionary.len().to_string().green(),
                    grammar.pattern_count().to_string().green(),
                    state.dictionary.node_count().to_string().green()
                )))
            }

            Self::Settings => {
                let scope = state
                    .current_scope()
                    .unwrap_or_else(|_| "(none)".to_string());
                let grammar = state
                    .grammar_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(unsaved)".to_string());
                let limit = state
                    .limit
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "none".to_string());
                Ok(CommandResult::Continue(format!(
                    "{}\n  Scope:     {}\n  Lookahead: {}\n  Limit:     {}\n  Format:    {}\n  Grammar:   {}",
                    "Current Settings".bold().underline(),
                    scope.cyan(),
                    state.lookahead.to_string().green(),
                    limit.green(),
                    state.format.to_string().green(),
                    grammar.cyan()
                )))
            }

            Self::Help { topic } => Ok(CommandResult::Continue(match topic {
                Some(topic) => Self::command_help(topic),
                None => Self::general_help(),
            })),

            Self::Exit => Ok(CommandResult::Exit),
        }
    }

    fn general_help() -> String {
        format!(
            r#"{}

{}
  suggest, s <words...>         Suggest completions for the input
  match, m <words...>           Show how the input walks the scope

{}
  define <scope> [p1 ; p2 ...]  Create a scope with optional patterns
  add <scope> <pattern>         Add a pattern to a scope
  remove <scope> <pattern>      Remove a pattern (not supported)
  scopes                        List scopes
  patterns, dump [scope]        List the patterns of a scope

{}
  scope, use [name]             Show or switch the queried scope
  lookahead, la [n]             Words available for resolving lookups
  limit <n>                     Set result limit (0 or 'none' to remove)
  settings                      Show current settings

{}
  load <path> [json|bincode]    Load grammar from file
  save [path]                   Save grammar to file
  stats, info                   Show grammar statistics

{}
  help, ? [command]             Show this help or help for specific command
  exit, quit                    Exit REPL

{}
  phrase-trie> define devices fan ; kitchen light
  phrase-trie> define main turn on <device:devices>
  phrase-trie> s turn o
  phrase-trie> lookahead 2
  phrase-trie> s turn on

Pattern syntax: words separated by spaces, lookups as <alias:ctx1|ctx2>
or <ctx> (alias and context share a name)."#,
            "phrase-trie REPL - Interactive Grammar Explorer".bold().underline(),
            "Queries:".bold(),
            "Grammar:".bold(),
            "Configuration:".bold(),
            "Files:".bold(),
            "Utility:".bold(),
            "Examples:".bold(),
        )
    }

    fn command_help(topic: &str) -> String {
        let (usage, description) = match topic.to_lowercase().as_str() {
            "suggest" | "s" => (
                "suggest <words...>",
                "Lists every completion of the input in the current scope. The last\n  \
                 word may be partial. Lookups stay as <alias> placeholders unless\n  \
                 lookahead is set.",
            ),
            "match" | "m" => (
                "match <words...>",
                "Lists every walk of the input through the scope with the depth of\n  \
                 its lookup stack and how many tokens it left unconsumed.",
            ),
            "define" | "def" => (
                "define <scope> [pattern ; pattern ...]",
                "Registers a new scope. Patterns are separated by ';' and may\n  \
                 reference the scope itself.",
            ),
            "add" | "insert" => (
                "add <scope> <pattern>",
                "Adds a pattern to an existing scope. Every context a lookup names\n  \
                 must already be defined.",
            ),
            "remove" | "rm" => (
                "remove <scope> <pattern>",
                "Pattern removal is not supported; the grammar is left unchanged.",
            ),
            "lookahead" | "la" => (
                "lookahead [n]",
                "Sets how many words may be spent replacing lookup placeholders\n  \
                 with concrete patterns from their contexts. 0 keeps placeholders.",
            ),
            "load" => (
                "load <path> [json|bincode]",
                "Replaces the grammar with the one stored at <path>.",
            ),
            "save" => (
                "save [path]",
                "Writes the grammar; the format follows the file extension.",
            ),
            _ => return format!("No help for '{}'. Type 'help' for all commands.", topic),
        };
        format!(
            "{}\n  {}\n\n{}\n  {}",
            "Usage:".bold(),
            usage.cyan(),
            "Description:".bold(),
            description
        )
    }
}

//! CLI command implementations

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::dictionary::Dictionary;
use crate::serialization::{Grammar, GrammarFormat};
use crate::suggestion::{Segment, Suggestion};

use super::args::Commands;
use super::detect::detect_format;
use super::paths::PersistentConfig;

/// Scope queried when none is configured and the grammar defines it
pub const DEFAULT_SCOPE: &str = "main";

/// Execute a CLI command
pub fn execute(command: Commands, config_path: Option<PathBuf>) -> Result<()> {
    let stored = PersistentConfig::load_from(config_path.clone()).unwrap_or_default();

    match command {
        Commands::Repl { .. } => bail!("The REPL is started by the phrase-trie binary"),
        Commands::Suggest {
            input,
            grammar,
            format,
            scope,
            lookahead,
            limit,
        } => {
            let config = stored.merge_with_cli(&PersistentConfig {
                grammar_path: grammar,
                format,
                scope,
                lookahead,
                limit,
            });
            cmd_suggest(&input, &config)
        }
        Commands::Patterns {
            scope,
            grammar,
            format,
        } => {
            let config = stored.merge_with_cli(&PersistentConfig {
                grammar_path: grammar,
                format,
                ..Default::default()
            });
            cmd_patterns(scope.as_deref(), &config)
        }
        Commands::Check { grammar, format } => {
            let config = stored.merge_with_cli(&PersistentConfig {
                grammar_path: grammar,
                format,
                ..Default::default()
            });
            cmd_check(&config)
        }
        Commands::Convert {
            input,
            output,
            from_format,
            to_format,
        } => cmd_convert(&input, &output, from_format, to_format),
        Commands::Settings {
            set_grammar,
            set_scope,
            set_lookahead,
            set_limit,
            reset,
        } => cmd_settings(
            stored,
            config_path,
            set_grammar,
            set_scope,
            set_lookahead,
            set_limit,
            reset,
        ),
    }
}

/// Suggest command
fn cmd_suggest(input: &[String], config: &PersistentConfig) -> Result<()> {
    let (dictionary, _) = load_configured(config)?;
    let scope_name = pick_scope(&dictionary, config.scope.as_deref())?;
    let scope = dictionary.scope(&scope_name)?;

    let mut suggestions = scope.suggest(input, config.lookahead.unwrap_or(0));
    if let Some(limit) = config.limit {
        suggestions.truncate(limit);
    }

    if suggestions.is_empty() {
        println!("{}", "No suggestions".yellow());
    } else {
        let typed = input.join(" ");
        for (i, suggestion) in suggestions.iter().enumerate() {
            println!("   {}. {}", i + 1, format_suggestion(&typed, suggestion));
        }
        println!();
        println!("{} suggestion(s) in scope {}", suggestions.len(), scope_name.cyan());
    }

    Ok(())
}

/// Patterns command
fn cmd_patterns(scope: Option<&str>, config: &PersistentConfig) -> Result<()> {
    let (dictionary, _) = load_configured(config)?;

    let names: Vec<String> = match scope {
        Some(name) => vec![name.to_string()],
        None => dictionary.scope_names().map(String::from).collect(),
    };

    for name in names {
        let scope = dictionary.scope(&name)?;
        println!("{}", name.bold().underline());
        for pattern in scope.patterns() {
            println!("  {}", pattern.to_string().green());
        }
        println!();
    }

    Ok(())
}

/// Check command
fn cmd_check(config: &PersistentConfig) -> Result<()> {
    let path = config.resolve_grammar_path()?;
    let detection = detect_format(&path, config.format)?;
    let grammar = load_grammar(&path, detection.format)?;
    let dictionary = grammar
        .build()
        .with_context(|| format!("Invalid grammar: {}", path.display()))?;

    println!("{}", "Grammar Information".bold().underline());
    println!();
    println!("  Path:     {}", path.display().to_string().cyan());
    println!(
        "  Format:   {} (detected via {})",
        detection.format.to_string().green(),
        detection.method.to_string().yellow()
    );
    println!("  Scopes:   {}", dictionary.len().to_string().green());
    println!("  Patterns: {}", grammar.pattern_count().to_string().green());
    println!("  Nodes:    {}", dictionary.node_count().to_string().green());
    println!();
    for (name, patterns) in &grammar.scopes {
        println!("    {} ({} pattern(s))", name.cyan(), patterns.len());
    }

    Ok(())
}

/// Convert command
fn cmd_convert(
    input: &Path,
    output: &Path,
    from_format: Option<GrammarFormat>,
    to_format: Option<GrammarFormat>,
) -> Result<()> {
    let detection = detect_format(input, from_format)?;
    let grammar = load_grammar(input, detection.format)?;
    grammar
        .build()
        .with_context(|| format!("Invalid grammar: {}", input.display()))?;

    let to_format = to_format.unwrap_or_else(|| GrammarFormat::from_path(output));
    save_grammar(&grammar, output, to_format)?;

    println!(
        "Converted {} ({}) -> {} ({})",
        input.display().to_string().cyan(),
        detection.format.to_string().green(),
        output.display().to_string().cyan(),
        to_format.to_string().green()
    );
    Ok(())
}

/// Settings command
fn cmd_settings(
    mut config: PersistentConfig,
    config_path: Option<PathBuf>,
    set_grammar: Option<PathBuf>,
    set_scope: Option<String>,
    set_lookahead: Option<usize>,
    set_limit: Option<usize>,
    reset: bool,
) -> Result<()> {
    if reset {
        config = PersistentConfig::default();
    }

    let changed = reset
        || set_grammar.is_some()
        || set_scope.is_some()
        || set_lookahead.is_some()
        || set_limit.is_some();

    if let Some(path) = set_grammar {
        config.format = Some(GrammarFormat::from_path(&path));
        config.grammar_path = Some(path);
    }
    if set_scope.is_some() {
        config.scope = set_scope;
    }
    if set_lookahead.is_some() {
        config.lookahead = set_lookahead;
    }
    if set_limit.is_some() {
        config.limit = set_limit;
    }

    if changed {
        config.save_to(config_path)?;
        println!("{}", "Settings saved".green());
        println!();
    }

    println!("{}", "Settings".bold().underline());
    println!();
    let unset = || "(unset)".dimmed().to_string();
    println!(
        "  Grammar:   {}",
        config
            .grammar_path
            .as_ref()
            .map(|p| p.display().to_string().cyan().to_string())
            .unwrap_or_else(unset)
    );
    println!(
        "  Format:    {}",
        config.format.map(|f| f.to_string()).unwrap_or_else(unset)
    );
    println!(
        "  Scope:     {}",
        config.scope.clone().unwrap_or_else(unset)
    );
    println!("  Lookahead: {}", config.lookahead.unwrap_or(0));
    println!(
        "  Limit:     {}",
        config.limit.map(|l| l.to_string()).unwrap_or_else(|| "none".to_string())
    );

    Ok(())
}

/// Load the grammar a merged configuration points at and build it
pub fn load_configured(config: &PersistentConfig) -> Result<(Dictionary, PathBuf)> {
    let path = config.resolve_grammar_path()?;
    if !path.exists() {
        bail!(
            "Grammar file not found: {}. Pass --grammar or run 'phrase-trie settings --set-grammar <path>'.",
            path.display()
        );
    }
    let detection = detect_format(&path, config.format)?;
    let dictionary = load_grammar(&path, detection.format)?
        .build()
        .with_context(|| format!("Invalid grammar: {}", path.display()))?;
    Ok((dictionary, path))
}

/// Read a grammar file in the given format
pub fn load_grammar(path: &Path, format: GrammarFormat) -> Result<Grammar> {
    Grammar::load_as(path, format)
        .with_context(|| format!("Failed to read {} grammar: {}", format, path.display()))
}

/// Write a grammar file in the given format
pub fn save_grammar(grammar: &Grammar, path: &Path, format: GrammarFormat) -> Result<()> {
    grammar
        .save_as(path, format)
        .with_context(|| format!("Failed to write grammar: {}", path.display()))
}

/// Choose the scope to query
///
/// An explicit name must exist. Otherwise `main` is used if defined, else the
/// first registered scope.
pub fn pick_scope(dictionary: &Dictionary, requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        if dictionary.resolve(name).is_none() {
            bail!("Unknown scope: '{}'", name);
        }
        return Ok(name.to_string());
    }
    if dictionary.resolve(DEFAULT_SCOPE).is_some() {
        return Ok(DEFAULT_SCOPE.to_string());
    }
    dictionary
        .scope_names()
        .next()
        .map(String::from)
        .context("Grammar defines no scopes")
}

/// Render a suggestion after the typed input
///
/// The typed text is dimmed, completed characters and words are green and
/// unresolved placeholders yellow.
pub fn format_suggestion(typed: &str, suggestion: &Suggestion) -> String {
    let mut out = typed.dimmed().to_string();
    if suggestion.is_empty() {
        out.push_str(&format!(" {}", "(complete)".bright_black()));
        return out;
    }
    for segment in suggestion.segments() {
        match segment {
            Segment::Text(text) => out.push_str(&text.green().to_string()),
            Segment::Word(word) => out.push_str(&format!(" {}", word.green())),
            Segment::Lookup(placeholder) => {
                out.push_str(&format!(" {}", format!("<{}>", placeholder.alias).yellow()));
            }
        }
    }
    out
}

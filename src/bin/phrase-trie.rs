//! phrase-trie - Phrase autocompletion over grammars of word patterns
//!
//! Provides CLI utilities and an interactive REPL for grammar exploration.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use phrase_trie::cli::commands;
use phrase_trie::cli::paths::PersistentConfig;
use phrase_trie::cli::{Cli, Commands};
use phrase_trie::repl::{Command, CommandResult, PhraseHelper, ReplConfig, ReplState};
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Repl {
            grammar,
            format,
            scope,
            lookahead,
            limit,
        } => run_repl(
            cli.config,
            PersistentConfig {
                grammar_path: grammar,
                format,
                scope,
                lookahead,
                limit,
            },
        ),
        command => commands::execute(command, cli.config),
    };

    if let Err(e) = result {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` unless `--verbose` is given
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("phrase_trie=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    // Ignore a subscriber installed by an embedding process
    let _ = tracing_subscriber::registry().with(stderr_layer).try_init();
}

fn run_repl(config_path: Option<PathBuf>, overrides: PersistentConfig) -> anyhow::Result<()> {
    let stored = PersistentConfig::load_from(config_path.clone()).unwrap_or_default();
    let config = stored.merge_with_cli(&overrides);

    print_banner();

    let mut state = ReplState::new();
    state.configure(&config);
    state.config_path = config_path;

    // Auto-load the configured grammar if it exists
    if let Ok(path) = config.resolve_grammar_path() {
        if path.exists() {
            println!(
                "  Loading grammar from {}...",
                path.display().to_string().cyan()
            );
            match state.load_from_file(&path, config.format) {
                Ok(count) => {
                    println!(
                        "  Loaded {} pattern(s) in {} scope(s)",
                        count.to_string().green().bold(),
                        state.dictionary.len().to_string().green()
                    );
                }
                Err(e) => {
                    eprintln!("  {}: Could not load grammar: {:#}", "Warning".yellow(), e);
                }
            }
            println!();
        }
    }

    let repl_config = ReplConfig::default();

    let rustyline_config = Config::builder()
        .auto_add_history(true)
        .max_history_size(repl_config.max_history)?
        .history_ignore_dups(true)?
        .history_ignore_space(true)
        .build();

    let mut helper = PhraseHelper::new();
    helper.set_grammar(&state);
    let mut editor: Editor<PhraseHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(rustyline_config)?;
    editor.set_helper(Some(helper));

    if let Some(history_path) = &repl_config.history_file {
        if history_path.exists() {
            let _ = editor.load_history(history_path);
        }
    }

    loop {
        let prompt = match state.current_scope() {
            Ok(scope) => format!(
                "{}[{}]> ",
                "phrase-trie".bright_cyan().bold(),
                scope.bright_yellow()
            ),
            Err(_) => repl_config.prompt.bright_cyan().bold().to_string(),
        };

        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "Use 'exit' or Ctrl+D to quit".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}: {:?}", "Readline error".red().bold(), err);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}: {}", "Error".red().bold(), e);
                continue;
            }
        };

        match command.execute(&mut state) {
            Ok(CommandResult::Continue(output)) => println!("{}", output),
            Ok(CommandResult::Silent) => {}
            Ok(CommandResult::Exit) => break,
            Err(e) => eprintln!("{}: {:#}", "Error".red().bold(), e),
        }

        // Completion follows the grammar and settings
        if let Some(helper) = editor.helper_mut() {
            helper.set_grammar(&state);
        }
    }

    if let Some(history_path) = &repl_config.history_file {
        if let Err(e) = editor.save_history(history_path) {
            eprintln!("{}: Failed to save history: {}", "Warning".yellow(), e);
        }
    }

    if let Err(e) = state.save_config() {
        eprintln!("{}: Failed to save config: {}", "Warning".yellow(), e);
    }

    Ok(())
}

fn print_banner() {
    println!();
    println!(
        "{}",
        "═══════════════════════════════════════════════════════".bright_cyan()
    );
    println!(
        "{}",
        "   phrase-trie - Phrase Autocompletion".bright_cyan().bold()
    );
    println!(
        "{}",
        "═══════════════════════════════════════════════════════".bright_cyan()
    );
    println!();
    println!("  Version: {}", env!("CARGO_PKG_VERSION").green());
    println!("  Type {} for available commands", "'help'".yellow().bold());
    println!(
        "  Type {} or press {} to exit",
        "'exit'".yellow().bold(),
        "Ctrl+D".yellow().bold()
    );
    println!();
    println!("{}", "  Quick Start:".bold());
    println!(
        "    • Define a scope:   {}",
        "define devices fan ; kitchen light".cyan()
    );
    println!(
        "    • Reference it:     {}",
        "define main turn on <device:devices>".cyan()
    );
    println!("    • Get suggestions:  {}", "suggest turn o".cyan());
    println!("    • Show settings:    {}", "settings".cyan());
    println!();
}

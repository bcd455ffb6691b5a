//! Syntax highlighting for REPL input

use colored::Colorize;
use rustyline::highlight::Highlighter;

/// Command highlighter
pub struct CommandHighlighter {
    commands: Vec<String>,
}

impl CommandHighlighter {
    pub fn new() -> Self {
        Self {
            commands: vec![
                "suggest",
                "s",
                "match",
                "m",
                "add",
                "insert",
                "define",
                "def",
                "remove",
                "rm",
                "scope",
                "use",
                "scopes",
                "patterns",
                "dump",
                "list",
                "lookahead",
                "la",
                "limit",
                "load",
                "save",
                "stats",
                "info",
                "settings",
                "set",
                "help",
                "?",
                "exit",
                "quit",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }

    fn highlight_command(&self, line: &str) -> String {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return line.to_string();
        }

        let cmd = parts[0].to_lowercase();
        if !self.commands.iter().any(|c| c == &cmd) {
            return line.to_string();
        }

        let highlighted_cmd = parts[0].blue().bold().to_string();
        if parts.len() == 1 {
            return highlighted_cmd;
        }
        format!("{}{}", highlighted_cmd, self.highlight_args(&parts[1..], &cmd))
    }

    fn highlight_args(&self, args: &[&str], cmd: &str) -> String {
        let names_scope = matches!(
            cmd,
            "add" | "insert" | "define" | "def" | "remove" | "rm" | "scope" | "use" | "patterns"
                | "dump" | "list"
        );

        let mut result = String::new();
        for (i, part) in args.iter().enumerate() {
            result.push(' ');

            if i == 0 && names_scope {
                result.push_str(&part.cyan().to_string());
            } else if part.starts_with('<') || part.ends_with('>') {
                // Lookups in yellow
                result.push_str(&part.yellow().to_string());
            } else if *part == ";" {
                result.push_str(&part.magenta().bold().to_string());
            } else if part.parse::<usize>().is_ok() {
                result.push_str(&part.magenta().to_string());
            } else {
                result.push_str(part);
            }
        }

        result
    }
}

impl Default for CommandHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for CommandHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> std::borrow::Cow<'l, str> {
        std::borrow::Cow::Owned(self.highlight_command(line))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

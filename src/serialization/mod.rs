//! Grammar serialization support.
//!
//! A [`Grammar`] is the portable form of a [`Dictionary`]: every scope name
//! with the patterns stored under it. Grammars are written and read by the
//! [`GrammarSerializer`] implementations in this module.
//!
//! # Example
//!
//! ```rust
//! use phrase_trie::serialization::{Grammar, GrammarSerializer, JsonSerializer};
//! use phrase_trie::Dictionary;
//!
//! let mut dictionary = Dictionary::new();
//! dictionary.define("colors", ["red", "blue"]).unwrap();
//! dictionary.define("main", ["<color:colors> light"]).unwrap();
//!
//! let mut buffer = Vec::new();
//! JsonSerializer::serialize(&Grammar::from_dictionary(&dictionary), &mut buffer).unwrap();
//!
//! let loaded = JsonSerializer::deserialize(&buffer[..]).unwrap().build().unwrap();
//! let main = loaded.scope("main").unwrap();
//! assert_eq!(main.suggest("blue", 0)[0].to_string(), " light");
//! ```

use crate::dictionary::Dictionary;
use crate::error::{PatternError, ScopeError};
use crate::pattern::Pattern;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

// Serializer implementations
mod bincode_impl;
mod json_impl;

// Re-exports
pub use self::bincode_impl::BincodeSerializer;
pub use self::json_impl::JsonSerializer;

/// Every scope of a dictionary with its patterns.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Grammar {
    /// Patterns by scope name
    pub scopes: BTreeMap<String, Vec<Pattern>>,
}

impl Grammar {
    /// Create an empty grammar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the patterns of every scope in `dictionary`.
    pub fn from_dictionary(dictionary: &Dictionary) -> Self {
        let scopes = dictionary
            .scope_names()
            .filter_map(|name| dictionary.scope(name).ok())
            .map(|scope| (scope.name().to_string(), scope.patterns()))
            .collect();
        Grammar { scopes }
    }

    /// Build a dictionary holding every scope of the grammar.
    ///
    /// All scopes are registered before any pattern is inserted, so scopes may
    /// reference each other regardless of order.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::UnknownContext`] if a lookup names a scope the
    /// grammar does not define.
    pub fn build(&self) -> Result<Dictionary, ScopeError> {
        let mut dictionary = Dictionary::new();
        for name in self.scopes.keys() {
            dictionary.declare(name.as_str())?;
        }
        for (name, patterns) in &self.scopes {
            let mut scope = dictionary.scope_mut(name)?;
            for pattern in patterns {
                scope.add(pattern)?;
            }
        }
        debug!(
            scopes = dictionary.len(),
            nodes = dictionary.node_count(),
            "built grammar"
        );
        Ok(dictionary)
    }

    /// Total number of patterns across all scopes.
    pub fn pattern_count(&self) -> usize {
        self.scopes.values().map(Vec::len).sum()
    }

    /// Read a grammar from `path`, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SerializationError> {
        let path = path.as_ref();
        Self::load_as(path, GrammarFormat::from_path(path))
    }

    /// Read a grammar from `path` in the given format.
    pub fn load_as(
        path: impl AsRef<Path>,
        format: GrammarFormat,
    ) -> Result<Self, SerializationError> {
        let reader = BufReader::new(File::open(path)?);
        match format {
            GrammarFormat::Json => JsonSerializer::deserialize(reader),
            GrammarFormat::Bincode => BincodeSerializer::deserialize(reader),
        }
    }

    /// Write the grammar to `path`, picking the format from its extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SerializationError> {
        let path = path.as_ref();
        self.save_as(path, GrammarFormat::from_path(path))
    }

    /// Write the grammar to `path` in the given format.
    pub fn save_as(
        &self,
        path: impl AsRef<Path>,
        format: GrammarFormat,
    ) -> Result<(), SerializationError> {
        let mut writer = BufWriter::new(File::create(path)?);
        match format {
            GrammarFormat::Json => JsonSerializer::serialize(self, &mut writer)?,
            GrammarFormat::Bincode => BincodeSerializer::serialize(self, &mut writer)?,
        }
        writer.flush()?;
        Ok(())
    }
}

/// On-disk grammar formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum GrammarFormat {
    /// Human-readable JSON
    #[default]
    Json,
    /// Compact bincode
    Bincode,
}

impl GrammarFormat {
    /// Guess the format from a file extension; anything but `.bin` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("bin") => GrammarFormat::Bincode,
            _ => GrammarFormat::Json,
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            GrammarFormat::Json => "json",
            GrammarFormat::Bincode => "bin",
        }
    }
}

impl std::fmt::Display for GrammarFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrammarFormat::Json => write!(f, "json"),
            GrammarFormat::Bincode => write!(f, "bincode"),
        }
    }
}

/// Trait for serializing and deserializing grammars.
pub trait GrammarSerializer {
    /// Serialize a grammar to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    fn serialize<W: Write>(grammar: &Grammar, writer: W) -> Result<(), SerializationError>;

    /// Deserialize a grammar from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or decoding fails, or a pattern is malformed.
    fn deserialize<R: Read>(reader: R) -> Result<Grammar, SerializationError>;
}

/// Errors that can occur during serialization/deserialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// Error during bincode serialization
    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),
    /// Error during JSON serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A stored pattern could not be parsed
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] PatternError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Element, IntoPattern, Word};

    fn sample() -> Dictionary {
        let mut dictionary = Dictionary::new();
        dictionary.define("colors", ["red", "blue"]).unwrap();
        dictionary
            .define("main", ["turn on", "<color:colors> light", "again <main>"])
            .unwrap();
        dictionary
    }

    fn texts(dictionary: &Dictionary, scope: &str, input: &str) -> Vec<String> {
        dictionary
            .scope(scope)
            .unwrap()
            .suggest(input, 0)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_bincode_roundtrip() {
        let grammar = Grammar::from_dictionary(&sample());
        let mut buffer = Vec::new();

        BincodeSerializer::serialize(&grammar, &mut buffer).unwrap();
        let loaded = BincodeSerializer::deserialize(&buffer[..]).unwrap();

        assert_eq!(loaded, grammar);
    }

    #[test]
    fn test_bincode_keeps_angle_bracket_words() {
        let pattern = vec![
            Element::from(Word::new("a<b").unwrap()),
            Element::from(Word::new("<main>").unwrap()),
        ]
        .into_pattern()
        .unwrap();
        let mut grammar = Grammar::new();
        grammar.scopes.insert("main".to_string(), vec![pattern]);

        let mut buffer = Vec::new();
        BincodeSerializer::serialize(&grammar, &mut buffer).unwrap();
        let loaded = BincodeSerializer::deserialize(&buffer[..]).unwrap();

        assert_eq!(loaded, grammar);
        let stored = &loaded.scopes["main"][0];
        assert!(stored.iter().all(|element| matches!(element, Element::Word(_))));

        let dictionary = loaded.build().unwrap();
        assert_eq!(texts(&dictionary, "main", "a<b"), vec![" <main>"]);
    }

    #[test]
    fn test_load_as_ignores_extension() {
        let grammar = Grammar::from_dictionary(&sample());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grammar.json");

        grammar.save_as(&path, GrammarFormat::Bincode).unwrap();
        assert!(Grammar::load(&path).is_err());
        assert_eq!(Grammar::load_as(&path, GrammarFormat::Bincode).unwrap(), grammar);
    }

    #[test]
    fn test_json_roundtrip() {
        let original = sample();
        let grammar = Grammar::from_dictionary(&original);
        let mut buffer = Vec::new();

        JsonSerializer::serialize(&grammar, &mut buffer).unwrap();
        let loaded = JsonSerializer::deserialize(&buffer[..]).unwrap();
        assert_eq!(loaded, grammar);

        let rebuilt = loaded.build().unwrap();
        for input in ["", "tu", "red", "again turn"] {
            assert_eq!(texts(&rebuilt, "main", input), texts(&original, "main", input));
        }
    }

    #[test]
    fn test_json_accepts_text_patterns() {
        let json = r#"{
            "scopes": {
                "colors": ["red", ["dark", "blue"]],
                "main": ["<color:colors> light", [{"shade": ["colors"]}, "lamp"]]
            }
        }"#;
        let grammar = JsonSerializer::deserialize(json.as_bytes()).unwrap();
        assert_eq!(grammar.pattern_count(), 4);

        let dictionary = grammar.build().unwrap();
        assert_eq!(texts(&dictionary, "main", "dark blue"), vec![" light", " lamp"]);
    }

    #[test]
    fn test_build_rejects_unknown_context() {
        let mut grammar = Grammar::new();
        grammar
            .scopes
            .insert("main".to_string(), vec!["<x:missing>".parse().unwrap()]);
        assert!(matches!(
            grammar.build(),
            Err(ScopeError::UnknownContext { .. })
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(GrammarFormat::from_path(Path::new("g.bin")), GrammarFormat::Bincode);
        assert_eq!(GrammarFormat::from_path(Path::new("g.json")), GrammarFormat::Json);
        assert_eq!(GrammarFormat::from_path(Path::new("grammar")), GrammarFormat::Json);
    }
}

//! # phrase-trie
//!
//! Phrase autocompletion over a grammar of word patterns.
//!
//! Patterns are sequences of literal words and lookup placeholders. A lookup
//! names one or more other scopes ("contexts") whose patterns may stand in at
//! that position, so a grammar of scopes behaves like a set of non-terminals:
//!
//! ```text
//! devices: "fan" | "kitchen light"
//! main:    "turn on <device:devices>" | "turn off <device:devices>"
//! ```
//!
//! Given partially typed input, a scope reports every way it can be
//! completed, matching through lookups and splicing the referenced patterns
//! back into the enclosing one.
//!
//! ## Example
//!
//! ```rust
//! use phrase_trie::prelude::*;
//!
//! let mut dictionary = Dictionary::new();
//! dictionary.define("devices", ["fan", "kitchen light"]).unwrap();
//! dictionary
//!     .define("main", ["turn on <device:devices>", "turn off <device:devices>"])
//!     .unwrap();
//!
//! let main = dictionary.scope("main").unwrap();
//!
//! let texts: Vec<String> = main.suggest("turn o", 0).iter().map(|s| s.to_string()).collect();
//! assert_eq!(texts, vec!["ff <device>", "n <device>"]);
//!
//! let texts: Vec<String> = main.suggest("turn on", 2).iter().map(|s| s.to_string()).collect();
//! assert_eq!(texts, vec![" fan", " kitchen light"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dictionary;
pub mod error;
pub mod pattern;
pub mod scope;
pub mod suggestion;
pub mod trie;

#[cfg(feature = "serialization")]
pub mod serialization;

/// Interactive REPL for exploring grammars
#[cfg(feature = "cli")]
pub mod repl;

/// CLI interface and utilities
#[cfg(feature = "cli")]
pub mod cli;

pub use dictionary::Dictionary;
pub use error::{PatternError, ScopeError};
pub use scope::{Scope, ScopeMut};
pub use suggestion::{Segment, Suggestion};

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::dictionary::Dictionary;
    pub use crate::error::{PatternError, ScopeError};
    pub use crate::pattern::{Element, IntoPattern, IntoTokens, Lookup, Pattern, Word};
    pub use crate::scope::{Scope, ScopeMut};
    pub use crate::suggestion::{Placeholder, Segment, Suggestion};
    pub use crate::trie::{Match, ScopeId};

    #[cfg(feature = "serialization")]
    pub use crate::serialization::{
        BincodeSerializer, Grammar, GrammarSerializer, JsonSerializer,
    };
}

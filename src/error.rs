//! Error types for pattern construction and scope operations.

use thiserror::Error;

/// Errors raised while normalizing a pattern or one of its elements.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A word was constructed from an empty string.
    #[error("Word is empty")]
    EmptyWord,

    /// A word contained a whitespace separator.
    ///
    /// Words are atomic tokens; multi-word literals must be split into
    /// separate pattern elements.
    #[error("Word {0:?} contains whitespace")]
    WordContainsWhitespace(String),

    /// A lookup element declared no aliases.
    #[error("Lookup declares no aliases")]
    EmptyLookup,

    /// A lookup alias referenced no contexts.
    #[error("Lookup alias '{0}' references no contexts")]
    NoContexts(String),

    /// A token of the text pattern syntax could not be parsed.
    #[error("Invalid pattern token {token:?}: {reason}")]
    Syntax {
        /// The offending token
        token: String,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Errors raised by [`Dictionary`](crate::Dictionary) and scope operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// A lookup referenced a context that is not registered in the dictionary.
    ///
    /// Insertion is validated before any node is created, so a failing
    /// `add` leaves the scope untouched.
    #[error("No such context '{context}' (referenced by lookup '{alias}')")]
    UnknownContext {
        /// The lookup alias naming the context
        alias: String,
        /// The unresolved context name
        context: String,
    },

    /// The requested scope is not registered.
    #[error("Scope '{0}' does not exist")]
    UnknownScope(String),

    /// A scope with this name is already registered.
    #[error("Scope '{0}' already exists")]
    ScopeExists(String),

    /// Pattern removal is not supported; the scope was not modified.
    #[error("Pattern removal is not supported")]
    RemovalUnsupported,

    /// The pattern itself was malformed.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// A specialized `Result` type for scope operations.
pub type Result<T> = std::result::Result<T, ScopeError>;

//! Pattern literals: words, lookups and the sequences built from them.
//!
//! A [`Pattern`] is an ordered sequence of [`Element`]s. Each element is
//! either a literal [`Word`] or a [`Lookup`] placeholder naming one or more
//! contexts whose own patterns may stand in at that position.
//!
//! # Examples
//!
//! ```
//! use phrase_trie::pattern::{Element, Lookup, Pattern, Word};
//!
//! let pattern: Pattern = "turn on the <device:devices|appliances>".parse().unwrap();
//! assert_eq!(pattern.len(), 4);
//! assert_eq!(pattern.elements()[0], Element::Word(Word::new("turn").unwrap()));
//!
//! let lookup = Lookup::single("device", ["devices", "appliances"]).unwrap();
//! assert_eq!(pattern.elements()[3], Element::Lookup(lookup));
//! ```

mod parse;

pub use parse::parse_pattern;

use crate::error::PatternError;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// An atomic token: a non-empty string without whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Word(String);

impl Word {
    /// Create a word, rejecting empty strings and embedded whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use phrase_trie::pattern::Word;
    ///
    /// assert!(Word::new("lights").is_ok());
    /// assert!(Word::new("").is_err());
    /// assert!(Word::new("turn on").is_err());
    /// ```
    pub fn new(text: impl Into<String>) -> Result<Self, PatternError> {
        let text = text.into();
        if text.is_empty() {
            return Err(PatternError::EmptyWord);
        }
        if text.chars().any(char::is_whitespace) {
            return Err(PatternError::WordContainsWhitespace(text));
        }
        Ok(Word(text))
    }

    /// Wrap a token already known to be non-empty and whitespace-free.
    pub(crate) fn from_token(token: &str) -> Self {
        debug_assert!(!token.is_empty() && !token.contains(char::is_whitespace));
        Word(token.to_string())
    }

    /// The word as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Word {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Word {
    type Error = PatternError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Word::new(text)
    }
}

impl TryFrom<&str> for Word {
    type Error = PatternError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Word::new(text)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> String {
        word.0
    }
}

/// A placeholder mapping each alias to the contexts that may satisfy it.
///
/// Every alias is an independent alternative: inserting a pattern containing
/// a lookup with two aliases branches the pattern into two paths.
///
/// Aliases are kept sorted by name, not in declaration order, so
/// `<size:sizes,color:colors>` and `<color:colors,size:sizes>` are the same
/// lookup and both suggest the `color` branch first. Lookup edges in the trie
/// follow the same order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        try_from = "BTreeMap<String, ContextList>",
        into = "BTreeMap<String, ContextList>"
    )
)]
pub struct Lookup {
    aliases: BTreeMap<String, Vec<String>>,
}

impl Lookup {
    /// Create an empty lookup. Add aliases with [`Lookup::with`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lookup with a single alias.
    ///
    /// # Examples
    ///
    /// ```
    /// use phrase_trie::pattern::Lookup;
    ///
    /// let lookup = Lookup::single("color", ["colors"]).unwrap();
    /// assert_eq!(lookup.contexts("color"), Some(&["colors".to_string()][..]));
    /// ```
    pub fn single<I, S>(alias: impl Into<String>, contexts: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().with(alias, contexts)
    }

    /// Add an alias, returning the extended lookup.
    ///
    /// Re-declaring an alias replaces its context list.
    pub fn with<I, S>(mut self, alias: impl Into<String>, contexts: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let alias = alias.into();
        let contexts: Vec<String> = contexts.into_iter().map(Into::into).collect();
        if contexts.is_empty() {
            return Err(PatternError::NoContexts(alias));
        }
        self.aliases.insert(alias, contexts);
        Ok(self)
    }

    /// Single-alias lookup over contexts already known to be non-empty.
    pub(crate) fn from_parts(alias: String, contexts: Vec<String>) -> Self {
        debug_assert!(!contexts.is_empty());
        let mut aliases = BTreeMap::new();
        aliases.insert(alias, contexts);
        Lookup { aliases }
    }

    /// Iterate over `(alias, contexts)` pairs, sorted by alias.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.aliases
            .iter()
            .map(|(alias, contexts)| (alias.as_str(), contexts.as_slice()))
    }

    /// Contexts referenced by `alias`, if declared.
    pub fn contexts(&self, alias: &str) -> Option<&[String]> {
        self.aliases.get(alias).map(Vec::as_slice)
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether the lookup declares no aliases.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    fn validate(&self) -> Result<(), PatternError> {
        if self.aliases.is_empty() {
            return Err(PatternError::EmptyLookup);
        }
        match self.aliases.iter().find(|(_, contexts)| contexts.is_empty()) {
            Some((alias, _)) => Err(PatternError::NoContexts(alias.clone())),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        for (i, (alias, contexts)) in self.aliases.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if contexts.len() == 1 && contexts[0] == *alias {
                f.write_str(alias)?;
            } else {
                write!(f, "{}:{}", alias, contexts.join("|"))?;
            }
        }
        f.write_str(">")
    }
}

/// Serialized form of a lookup's context list: one name or several.
#[cfg(feature = "serialization")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
#[doc(hidden)]
pub enum ContextList {
    One(String),
    Many(Vec<String>),
}

#[cfg(feature = "serialization")]
impl TryFrom<BTreeMap<String, ContextList>> for Lookup {
    type Error = PatternError;

    fn try_from(map: BTreeMap<String, ContextList>) -> Result<Self, Self::Error> {
        let aliases = map
            .into_iter()
            .map(|(alias, contexts)| match contexts {
                ContextList::One(name) => (alias, vec![name]),
                ContextList::Many(names) => (alias, names),
            })
            .collect();
        let lookup = Lookup { aliases };
        lookup.validate()?;
        Ok(lookup)
    }
}

#[cfg(feature = "serialization")]
impl From<Lookup> for BTreeMap<String, ContextList> {
    fn from(lookup: Lookup) -> Self {
        lookup
            .aliases
            .into_iter()
            .map(|(alias, mut contexts)| {
                let list = if contexts.len() == 1 {
                    ContextList::One(contexts.remove(0))
                } else {
                    ContextList::Many(contexts)
                };
                (alias, list)
            })
            .collect()
    }
}

/// One position of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum Element {
    /// A literal word
    Word(Word),
    /// A contextual placeholder
    Lookup(Lookup),
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Word(word) => word.fmt(f),
            Element::Lookup(lookup) => lookup.fmt(f),
        }
    }
}

impl From<Word> for Element {
    fn from(word: Word) -> Self {
        Element::Word(word)
    }
}

impl From<Lookup> for Element {
    fn from(lookup: Lookup) -> Self {
        Element::Lookup(lookup)
    }
}

/// An ordered sequence of words and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "PatternRepr", into = "PatternRepr")
)]
pub struct Pattern(Vec<Element>);

impl Pattern {
    /// Create an empty pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// The pattern's elements in order.
    pub fn elements(&self) -> &[Element] {
        &self.0
    }

    /// Append an element.
    pub fn push(&mut self, element: impl Into<Element>) {
        self.0.push(element.into());
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the pattern has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.0.iter()
    }

    fn validate(&self) -> Result<(), PatternError> {
        self.0.iter().try_for_each(|element| match element {
            Element::Word(_) => Ok(()),
            Element::Lookup(lookup) => lookup.validate(),
        })
    }
}

impl From<Vec<Element>> for Pattern {
    fn from(elements: Vec<Element>) -> Self {
        Pattern(elements)
    }
}

impl FromIterator<Element> for Pattern {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Pattern(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_pattern(text)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            element.fmt(f)?;
        }
        Ok(())
    }
}

/// Serialized form of a pattern: an element list or a text-syntax string.
#[cfg(feature = "serialization")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
#[doc(hidden)]
pub enum PatternRepr {
    Text(String),
    Elements(Vec<Element>),
}

#[cfg(feature = "serialization")]
impl TryFrom<PatternRepr> for Pattern {
    type Error = PatternError;

    fn try_from(repr: PatternRepr) -> Result<Self, Self::Error> {
        match repr {
            PatternRepr::Text(text) => parse_pattern(&text),
            PatternRepr::Elements(elements) => {
                let pattern = Pattern(elements);
                pattern.validate()?;
                Ok(pattern)
            }
        }
    }
}

#[cfg(feature = "serialization")]
impl From<Pattern> for PatternRepr {
    fn from(pattern: Pattern) -> Self {
        PatternRepr::Elements(pattern.0)
    }
}

/// Normalization of the accepted pattern arguments into a [`Pattern`].
///
/// A bare word or lookup becomes a one-element pattern; strings are parsed
/// with the text pattern syntax (see [`parse_pattern`]).
pub trait IntoPattern {
    /// Convert into a validated pattern.
    fn into_pattern(self) -> Result<Pattern, PatternError>;
}

impl IntoPattern for Pattern {
    fn into_pattern(self) -> Result<Pattern, PatternError> {
        self.validate()?;
        Ok(self)
    }
}

impl IntoPattern for &Pattern {
    fn into_pattern(self) -> Result<Pattern, PatternError> {
        self.clone().into_pattern()
    }
}

impl IntoPattern for Vec<Element> {
    fn into_pattern(self) -> Result<Pattern, PatternError> {
        Pattern(self).into_pattern()
    }
}

impl IntoPattern for Element {
    fn into_pattern(self) -> Result<Pattern, PatternError> {
        Pattern(vec![self]).into_pattern()
    }
}

impl IntoPattern for Word {
    fn into_pattern(self) -> Result<Pattern, PatternError> {
        Ok(Pattern(vec![Element::Word(self)]))
    }
}

impl IntoPattern for Lookup {
    fn into_pattern(self) -> Result<Pattern, PatternError> {
        Element::Lookup(self).into_pattern()
    }
}

impl IntoPattern for &str {
    fn into_pattern(self) -> Result<Pattern, PatternError> {
        parse_pattern(self)
    }
}

impl IntoPattern for String {
    fn into_pattern(self) -> Result<Pattern, PatternError> {
        parse_pattern(&self)
    }
}

impl IntoPattern for &String {
    fn into_pattern(self) -> Result<Pattern, PatternError> {
        parse_pattern(self)
    }
}

/// Normalization of query input into a token sequence.
///
/// Strings are split on whitespace, so `"turn on"` and `["turn", "on"]`
/// produce the same tokens. Empty strings contribute no tokens.
pub trait IntoTokens {
    /// Convert into input tokens.
    fn into_tokens(self) -> Vec<Word>;
}

fn tokenize(text: &str) -> impl Iterator<Item = Word> + '_ {
    text.split_whitespace().map(Word::from_token)
}

impl IntoTokens for &str {
    fn into_tokens(self) -> Vec<Word> {
        tokenize(self).collect()
    }
}

impl IntoTokens for String {
    fn into_tokens(self) -> Vec<Word> {
        tokenize(&self).collect()
    }
}

impl IntoTokens for &String {
    fn into_tokens(self) -> Vec<Word> {
        tokenize(self).collect()
    }
}

impl IntoTokens for Word {
    fn into_tokens(self) -> Vec<Word> {
        vec![self]
    }
}

impl IntoTokens for Vec<Word> {
    fn into_tokens(self) -> Vec<Word> {
        self
    }
}

impl IntoTokens for &[Word] {
    fn into_tokens(self) -> Vec<Word> {
        self.to_vec()
    }
}

impl IntoTokens for &[&str] {
    fn into_tokens(self) -> Vec<Word> {
        self.iter().flat_map(|text| tokenize(text)).collect()
    }
}

impl IntoTokens for Vec<&str> {
    fn into_tokens(self) -> Vec<Word> {
        self.as_slice().into_tokens()
    }
}

impl<const N: usize> IntoTokens for [&str; N] {
    fn into_tokens(self) -> Vec<Word> {
        self.as_slice().into_tokens()
    }
}

impl IntoTokens for &[String] {
    fn into_tokens(self) -> Vec<Word> {
        self.iter().flat_map(|text| tokenize(text)).collect()
    }
}

impl IntoTokens for Vec<String> {
    fn into_tokens(self) -> Vec<Word> {
        self.as_slice().into_tokens()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_validation() {
        assert_eq!(Word::new("on").unwrap().as_str(), "on");
        assert_eq!(Word::new(""), Err(PatternError::EmptyWord));
        assert_eq!(
            Word::new("a b"),
            Err(PatternError::WordContainsWhitespace("a b".to_string()))
        );
    }

    #[test]
    fn test_lookup_builder() {
        let lookup = Lookup::single("color", ["colors"])
            .unwrap()
            .with("shade", ["shades", "tints"])
            .unwrap();
        assert_eq!(lookup.len(), 2);
        let aliases: Vec<&str> = lookup.aliases().map(|(alias, _)| alias).collect();
        assert_eq!(aliases, vec!["color", "shade"]);
        assert_eq!(
            lookup.contexts("shade"),
            Some(&["shades".to_string(), "tints".to_string()][..])
        );
    }

    #[test]
    fn test_lookup_without_contexts_rejected() {
        let empty: [&str; 0] = [];
        assert_eq!(
            Lookup::single("color", empty),
            Err(PatternError::NoContexts("color".to_string()))
        );
        assert_eq!(
            Lookup::new().into_pattern(),
            Err(PatternError::EmptyLookup)
        );
    }

    #[test]
    fn test_normalization() {
        let word = Word::new("lights").unwrap();
        assert_eq!(word.clone().into_pattern().unwrap().len(), 1);

        let pattern = "turn on".into_pattern().unwrap();
        assert_eq!(
            pattern.elements(),
            &[
                Element::Word(Word::new("turn").unwrap()),
                Element::Word(Word::new("on").unwrap())
            ]
        );

        assert!("".into_pattern().unwrap().is_empty());
    }

    #[test]
    fn test_tokens() {
        let expected = vec![Word::new("turn").unwrap(), Word::new("on").unwrap()];
        assert_eq!("turn on".into_tokens(), expected);
        assert_eq!(["turn", "on"].into_tokens(), expected);
        assert_eq!(vec!["turn on".to_string()].into_tokens(), expected);
        assert!("   ".into_tokens().is_empty());
    }

    #[test]
    fn test_display_round_trip() {
        let text = "turn <device:devices|rooms> <color> off";
        let pattern: Pattern = text.parse().unwrap();
        assert_eq!(pattern.to_string(), text);
    }
}

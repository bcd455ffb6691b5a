//! Text syntax for patterns.
//!
//! Tokens are separated by whitespace. A token wrapped in angle brackets is
//! a lookup, everything else is a word:
//!
//! - `<alias:ctx>` references a single context under `alias`
//! - `<alias:ctx1|ctx2>` references several contexts under one alias
//! - `<ctx>` is shorthand for `<ctx:ctx>`
//! - `<a:x,b:y>` declares two alternative aliases in one lookup

use super::{Element, Lookup, Pattern, Word};
use crate::error::PatternError;

/// Parse a pattern written in the text syntax.
///
/// An empty or all-whitespace string yields an empty pattern.
///
/// # Examples
///
/// ```
/// use phrase_trie::pattern::parse_pattern;
///
/// let pattern = parse_pattern("set <color:colors> light").unwrap();
/// assert_eq!(pattern.len(), 3);
/// assert!(parse_pattern("set <color").is_err());
/// ```
pub fn parse_pattern(text: &str) -> Result<Pattern, PatternError> {
    text.split_whitespace().map(parse_token).collect()
}

fn parse_token(token: &str) -> Result<Element, PatternError> {
    let syntax = |reason| PatternError::Syntax {
        token: token.to_string(),
        reason,
    };

    let Some(inner) = token.strip_prefix('<') else {
        if token.contains(['<', '>']) {
            return Err(syntax("stray angle bracket"));
        }
        return Ok(Element::Word(Word::from_token(token)));
    };

    let inner = inner
        .strip_suffix('>')
        .ok_or_else(|| syntax("unterminated lookup"))?;
    if inner.is_empty() {
        return Err(syntax("empty lookup"));
    }
    if inner.contains(['<', '>']) {
        return Err(syntax("nested angle bracket"));
    }

    let mut lookup = Lookup::new();
    for binding in inner.split(',') {
        let (alias, contexts) = binding.split_once(':').unwrap_or((binding, binding));
        if alias.is_empty() {
            return Err(syntax("empty alias"));
        }
        let contexts: Vec<&str> = contexts.split('|').collect();
        if contexts.iter().any(|context| context.is_empty()) {
            return Err(syntax("empty context name"));
        }
        lookup = lookup.with(alias, contexts)?;
    }

    Ok(Element::Lookup(lookup))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Element {
        Element::Word(Word::new(text).unwrap())
    }

    #[test]
    fn test_words_only() {
        let pattern = parse_pattern("turn  on\tthe lights").unwrap();
        assert_eq!(
            pattern.elements(),
            &[word("turn"), word("on"), word("the"), word("lights")]
        );
    }

    #[test]
    fn test_lookup_forms() {
        let pattern = parse_pattern("<color> <device:devices|rooms> <a:x,b:y>").unwrap();
        let expected = vec![
            Element::Lookup(Lookup::single("color", ["color"]).unwrap()),
            Element::Lookup(Lookup::single("device", ["devices", "rooms"]).unwrap()),
            Element::Lookup(
                Lookup::single("a", ["x"])
                    .unwrap()
                    .with("b", ["y"])
                    .unwrap(),
            ),
        ];
        assert_eq!(pattern.elements(), expected.as_slice());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_pattern("").unwrap().is_empty());
        assert!(parse_pattern("  \n ").unwrap().is_empty());
    }

    #[test]
    fn test_syntax_errors() {
        for bad in ["<color", "<>", "<:colors>", "<color:>", "<a:x|>", "col>or", "<<a>>"] {
            assert!(
                matches!(parse_pattern(bad), Err(PatternError::Syntax { .. })),
                "expected syntax error for {:?}",
                bad
            );
        }
    }
}

//! Completion enumeration over the phrase trie.
//!
//! Starting from any node, completion walks every outgoing edge down to the
//! pattern terminals below it. Lookup edges are not entered: they become
//! [`Placeholder`] segments in the resulting suggestions, which keeps the
//! enumeration finite even when scopes reference each other.

use super::{Arena, NodeId, NodeKind};
use crate::pattern::Word;
use crate::suggestion::{Placeholder, Segment, Suggestion};

/// Every way to complete the pattern space below `node`.
///
/// `input` is the token sequence the caller has already consumed to reach
/// `node`. When `node` sits inside a word, its last token is the partially
/// typed word and is recorded as the suggestion's stem. An empty suggestion
/// means some pattern is already satisfied at `node`.
///
/// # Examples
///
/// ```
/// use phrase_trie::Dictionary;
///
/// let mut dictionary = Dictionary::new();
/// dictionary.define("main", ["lights on", "lights off"]).unwrap();
///
/// let main = dictionary.scope("main").unwrap();
/// let suggestions = main.suggest("li", 0);
/// let texts: Vec<String> = suggestions.iter().map(|s| s.to_string()).collect();
/// assert_eq!(texts, vec!["ghts off", "ghts on"]);
/// assert_eq!(suggestions[0].stem(), Some("li"));
/// ```
pub fn complete_pattern(arena: &Arena, node: NodeId, input: &[Word]) -> Vec<Suggestion> {
    let mut path = Vec::new();
    let mut out = Vec::new();
    collect(arena, node, &mut path, &mut out);

    if let Some(stem) = input.last() {
        for suggestion in &mut out {
            if matches!(suggestion.segments().first(), Some(Segment::Text(_))) {
                suggestion.set_stem(stem.as_str());
            }
        }
    }

    out
}

fn collect(arena: &Arena, id: NodeId, path: &mut Vec<Segment>, out: &mut Vec<Suggestion>) {
    let node = arena.node(id);

    if node.is_end() {
        out.push(Suggestion::new(path.clone()));
    }

    for &(c, child) in node.char_edges() {
        let opened = push_char(path, c);
        collect(arena, child, path, out);
        pop_char(path, opened);
    }

    for &(c, child) in node.word_edges() {
        path.push(Segment::Word(c.to_string()));
        collect(arena, child, path, out);
        path.pop();
    }

    for &lookup in node.lookup_edges() {
        if let NodeKind::Lookup { alias, contexts } = arena.node(lookup).kind() {
            path.push(Segment::Lookup(Placeholder {
                alias: alias.clone(),
                contexts: contexts.clone(),
            }));
            collect(arena, lookup, path, out);
            path.pop();
        }
    }
}

/// Append `c` to the word being spelled, opening a text segment if needed.
fn push_char(path: &mut Vec<Segment>, c: char) -> bool {
    match path.last_mut() {
        Some(Segment::Text(text) | Segment::Word(text)) => {
            text.push(c);
            false
        }
        _ => {
            path.push(Segment::Text(c.to_string()));
            true
        }
    }
}

fn pop_char(path: &mut Vec<Segment>, opened: bool) {
    if opened {
        path.pop();
    } else if let Some(Segment::Text(text) | Segment::Word(text)) = path.last_mut() {
        text.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dictionary;

    fn word(text: &str) -> Segment {
        Segment::Word(text.to_string())
    }

    #[test]
    fn test_root_enumerates_all_patterns() {
        let mut dictionary = Dictionary::new();
        dictionary.define("colors", ["red", "blue"]).unwrap();
        dictionary
            .define("main", ["turn on", "turn off", "<color:colors> light"])
            .unwrap();

        let main = dictionary.resolve("main").unwrap();
        let completions = complete_pattern(dictionary.arena(), dictionary.root(main), &[]);
        assert_eq!(completions.len(), 3);
        assert_eq!(completions[0].segments(), &[word("turn"), word("off")]);
        assert_eq!(completions[1].segments(), &[word("turn"), word("on")]);
        match &completions[2].segments()[0] {
            Segment::Lookup(placeholder) => assert_eq!(placeholder.alias, "color"),
            other => panic!("expected placeholder, got {:?}", other),
        }
        assert_eq!(completions[2].segments()[1], word("light"));
    }

    #[test]
    fn test_terminal_yields_empty_suggestion() {
        let mut dictionary = Dictionary::new();
        dictionary.define("main", ["go", "go home"]).unwrap();
        let main = dictionary.scope("main").unwrap();

        let suggestions = main.suggest("go", 0);
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions[0].is_empty());
        assert_eq!(suggestions[1].segments(), &[word("home")]);
        assert_eq!(suggestions[1].stem(), None);
    }

    #[test]
    fn test_char_push_pop_restores_path() {
        let mut path = vec![word("tu")];
        let opened = push_char(&mut path, 'r');
        assert!(!opened);
        assert_eq!(path, vec![word("tur")]);
        pop_char(&mut path, opened);
        assert_eq!(path, vec![word("tu")]);

        let mut path = Vec::new();
        let opened = push_char(&mut path, 'g');
        assert!(opened);
        pop_char(&mut path, opened);
        assert!(path.is_empty());
    }
}

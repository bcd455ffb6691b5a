//! Scope views: querying and inserting patterns.
//!
//! A scope is a trie root inside a [`Dictionary`]. [`Scope`] borrows the
//! dictionary immutably and answers queries; [`ScopeMut`] borrows it mutably
//! and inserts patterns.

use crate::dictionary::{Dictionary, Resolved};
use crate::error::{Result, ScopeError};
use crate::pattern::{Element, IntoPattern, IntoTokens, Lookup, Pattern, Word};
use crate::suggestion::Suggestion;
use crate::trie::completion::complete_pattern;
use crate::trie::{Edge, Match, Matcher, NodeId, NodeKind, ScopeId};
use rustc_hash::FxHashSet;
use tracing::debug;

/// Read-only view of one scope.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'d> {
    dictionary: &'d Dictionary,
    id: ScopeId,
}

impl<'d> Scope<'d> {
    pub(crate) fn new(dictionary: &'d Dictionary, id: ScopeId) -> Self {
        Scope { dictionary, id }
    }

    /// The scope's id.
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// The scope's name.
    pub fn name(&self) -> &'d str {
        self.dictionary.name(self.id).unwrap_or_default()
    }

    /// The dictionary the scope belongs to.
    pub fn dictionary(&self) -> &'d Dictionary {
        self.dictionary
    }

    /// Every way `tokens` can be walked from the scope root.
    ///
    /// Matches that stop on a pattern terminal with tokens left over are
    /// included; see [`Match::is_complete`].
    pub fn match_pattern<'i>(&self, tokens: &'i [Word]) -> Vec<Match<'i>> {
        let mut matcher = Matcher::new(self.dictionary.arena(), self.dictionary.roots());
        matcher.match_scope(self.id, tokens)
    }

    /// Completions of the scope's pattern space after `input`, without
    /// matching through lookups.
    pub fn complete_pattern(&self, input: &[Word]) -> Vec<Suggestion> {
        complete_pattern(self.dictionary.arena(), self.root(), input)
    }

    /// Suggest every completion of `input`.
    ///
    /// Only walks that consume the whole input count. Each is unwound into
    /// suggestions: the deepest node completes the partially typed word, and
    /// every lookup crossed on the way out adds the rest of its enclosing
    /// pattern.
    ///
    /// Distinct walks can unwind to the same continuation, e.g. when two
    /// contexts of one lookup both hold the typed word. The pooled list keeps
    /// only the first of identical suggestions, so its length counts distinct
    /// continuations rather than walks.
    ///
    /// With a non-zero `lookahead`, placeholders are then replaced by
    /// concrete words from their contexts, at most `lookahead` words per
    /// suggestion (see [`Suggestion::resolve_lookups`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use phrase_trie::Dictionary;
    ///
    /// let mut dictionary = Dictionary::new();
    /// dictionary.define("main", ["turn on", "turn off"]).unwrap();
    ///
    /// let main = dictionary.scope("main").unwrap();
    /// let texts: Vec<String> = main.suggest("turn", 0).iter().map(|s| s.to_string()).collect();
    /// assert_eq!(texts, vec![" off", " on"]);
    /// ```
    pub fn suggest(&self, input: impl IntoTokens, lookahead: usize) -> Vec<Suggestion> {
        let input = input.into_tokens();
        let matches = self.match_pattern(&input);

        let mut suggestions: Vec<Suggestion> = matches
            .iter()
            .filter(|candidate| candidate.is_complete())
            .flat_map(|candidate| self.unwind(candidate, &input))
            .collect();
        dedup(&mut suggestions);

        if lookahead > 0 {
            suggestions = suggestions
                .iter()
                .flat_map(|suggestion| suggestion.resolve_lookups(self.dictionary, lookahead))
                .collect();
            dedup(&mut suggestions);
        }

        debug!(
            scope = self.name(),
            tokens = input.len(),
            matches = matches.len(),
            suggestions = suggestions.len(),
            "suggest"
        );
        suggestions
    }

    /// Turn a match's node stack back into suggestions.
    fn unwind(&self, candidate: &Match<'_>, input: &[Word]) -> Vec<Suggestion> {
        let arena = self.dictionary.arena();
        let Some((&innermost, outer)) = candidate.nodes.split_first() else {
            return Vec::new();
        };

        let mut suggestions = complete_pattern(arena, innermost, input);
        for &node in outer {
            let tails = complete_pattern(arena, node, &[]);
            suggestions = suggestions
                .iter()
                .flat_map(|head| tails.iter().map(move |tail| head.concat(tail)))
                .collect();
        }
        suggestions
    }

    /// Every pattern stored in the scope.
    ///
    /// Patterns are rebuilt from the trie, so a lookup declaring several
    /// aliases comes back as one pattern per alias.
    pub fn patterns(&self) -> Vec<Pattern> {
        let mut out = Vec::new();
        self.collect_patterns(self.root(), &mut Vec::new(), &mut out);
        out
    }

    fn collect_patterns(&self, id: NodeId, path: &mut Vec<PathElement>, out: &mut Vec<Pattern>) {
        let arena = self.dictionary.arena();
        let node = arena.node(id);

        if node.is_end() {
            out.push(path.iter().map(PathElement::to_element).collect());
        }

        for &(c, child) in node.char_edges() {
            if let Some(PathElement::Word(word)) = path.last_mut() {
                word.push(c);
            }
            self.collect_patterns(child, path, out);
            if let Some(PathElement::Word(word)) = path.last_mut() {
                word.pop();
            }
        }

        for &(c, child) in node.word_edges() {
            path.push(PathElement::Word(c.to_string()));
            self.collect_patterns(child, path, out);
            path.pop();
        }

        for &lookup in node.lookup_edges() {
            if let NodeKind::Lookup { alias, contexts } = arena.node(lookup).kind() {
                let names = contexts
                    .iter()
                    .filter_map(|&scope| self.dictionary.name(scope))
                    .map(str::to_string)
                    .collect();
                path.push(PathElement::Lookup(Lookup::from_parts(alias.clone(), names)));
                self.collect_patterns(lookup, path, out);
                path.pop();
            }
        }
    }

    fn root(&self) -> NodeId {
        self.dictionary.root(self.id)
    }
}

enum PathElement {
    Word(String),
    Lookup(Lookup),
}

impl PathElement {
    fn to_element(&self) -> Element {
        match self {
            PathElement::Word(text) => Element::Word(Word::from_token(text)),
            PathElement::Lookup(lookup) => Element::Lookup(lookup.clone()),
        }
    }
}

fn dedup(suggestions: &mut Vec<Suggestion>) {
    let mut seen = FxHashSet::default();
    suggestions.retain(|suggestion| seen.insert(suggestion.clone()));
}

/// Mutable view of one scope.
#[derive(Debug)]
pub struct ScopeMut<'d> {
    dictionary: &'d mut Dictionary,
    id: ScopeId,
}

impl<'d> ScopeMut<'d> {
    pub(crate) fn new(dictionary: &'d mut Dictionary, id: ScopeId) -> Self {
        ScopeMut { dictionary, id }
    }

    /// The scope's id.
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Reborrow as a read-only view.
    pub fn as_scope(&self) -> Scope<'_> {
        Scope::new(self.dictionary, self.id)
    }

    /// Insert a pattern.
    ///
    /// Accepts a [`Word`], a [`Lookup`], a [`Pattern`] or a string in the
    /// text pattern syntax. An empty pattern is a no-op. Existing edges are
    /// shared and never overwritten.
    ///
    /// # Errors
    ///
    /// [`ScopeError::UnknownContext`] if a lookup names a scope missing from
    /// the dictionary. All names are resolved before the trie is touched, so
    /// the scope is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use phrase_trie::{Dictionary, ScopeError};
    ///
    /// let mut dictionary = Dictionary::new();
    /// dictionary.declare("main").unwrap();
    ///
    /// let mut main = dictionary.scope_mut("main").unwrap();
    /// main.add("lights on").unwrap();
    /// assert!(matches!(main.add("<x:missing>"), Err(ScopeError::UnknownContext { .. })));
    /// ```
    pub fn add(&mut self, pattern: impl IntoPattern) -> Result<()> {
        let pattern = pattern.into_pattern()?;
        if pattern.is_empty() {
            return Ok(());
        }

        let resolved = self.dictionary.resolve_pattern(&pattern, None)?;
        let root = self.dictionary.root(self.id);
        self.insert(root, &resolved);
        debug!(scope = self.id, %pattern, nodes = self.dictionary.node_count(), "added pattern");
        Ok(())
    }

    /// Pattern removal is not supported.
    ///
    /// Always returns [`ScopeError::RemovalUnsupported`] and leaves the scope
    /// untouched.
    pub fn remove(&mut self, pattern: impl IntoPattern) -> Result<()> {
        let pattern = pattern.into_pattern()?;
        debug!(scope = self.id, %pattern, "remove requested");
        Err(ScopeError::RemovalUnsupported)
    }

    fn insert(&mut self, node: NodeId, elements: &[Resolved<'_>]) {
        let Some((element, rest)) = elements.split_first() else {
            return;
        };
        match element {
            Resolved::Word(word) => {
                let arena = &mut self.dictionary.arena;
                let mut chars = word.chars();
                let Some(first) = chars.next() else {
                    return;
                };
                let mut current = arena.ensure_child(node, Edge::Word, first);
                for c in chars {
                    current = arena.ensure_child(current, Edge::Char, c);
                }
                self.advance(current, rest);
            }
            Resolved::Lookup(aliases) => {
                for (alias, contexts) in aliases {
                    let lookup = self.dictionary.arena.ensure_lookup(node, alias, contexts);
                    self.advance(lookup, rest);
                }
            }
        }
    }

    fn advance(&mut self, node: NodeId, rest: &[Resolved<'_>]) {
        if rest.is_empty() {
            self.dictionary.arena.mark_end(node);
        } else {
            self.insert(node, rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestion::Segment;

    fn texts(suggestions: &[Suggestion]) -> Vec<String> {
        suggestions.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_shared_prefix_reuses_nodes() {
        let mut dictionary = Dictionary::new();
        dictionary.define("main", ["turn on"]).unwrap();
        let before = dictionary.node_count();
        dictionary.scope_mut("main").unwrap().add("turn off").unwrap();
        // only the two 'f' nodes are new
        assert_eq!(dictionary.node_count(), before + 2);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut dictionary = Dictionary::new();
        dictionary.define("main", ["turn on"]).unwrap();
        let before = dictionary.node_count();
        dictionary.scope_mut("main").unwrap().add("turn on").unwrap();
        assert_eq!(dictionary.node_count(), before);
    }

    #[test]
    fn test_empty_pattern_is_noop() {
        let mut dictionary = Dictionary::new();
        dictionary.declare("main").unwrap();
        let before = dictionary.node_count();
        dictionary.scope_mut("main").unwrap().add("").unwrap();
        dictionary.scope_mut("main").unwrap().add(Pattern::new()).unwrap();
        assert_eq!(dictionary.node_count(), before);
        assert!(dictionary.scope("main").unwrap().suggest("", 0).is_empty());
    }

    #[test]
    fn test_multi_alias_lookup_branches() {
        let mut dictionary = Dictionary::new();
        dictionary.define("colors", ["red"]).unwrap();
        dictionary.define("sizes", ["big"]).unwrap();
        dictionary
            .define("main", ["<color:colors,size:sizes> box"])
            .unwrap();
        let main = dictionary.scope("main").unwrap();

        assert_eq!(texts(&main.suggest("red", 0)), vec![" box"]);
        assert_eq!(texts(&main.suggest("big", 0)), vec![" box"]);
        assert_eq!(texts(&main.suggest("", 0)), vec![" <color> box", " <size> box"]);
    }

    #[test]
    fn test_identical_continuations_reported_once() {
        let mut dictionary = Dictionary::new();
        dictionary.define("colors", ["red", "blue"]).unwrap();
        dictionary.define("hues", ["red"]).unwrap();
        dictionary.define("main", ["<c:colors|hues> light"]).unwrap();
        let main = dictionary.scope("main").unwrap();

        assert_eq!(main.match_pattern(&"red".into_tokens()).len(), 2);
        assert_eq!(texts(&main.suggest("red", 0)), vec![" light"]);
    }

    #[test]
    fn test_multi_alias_order_ignores_declaration_order() {
        let mut dictionary = Dictionary::new();
        dictionary.define("colors", ["red"]).unwrap();
        dictionary.define("sizes", ["big"]).unwrap();
        dictionary
            .define("main", ["<size:sizes,color:colors> box"])
            .unwrap();
        let main = dictionary.scope("main").unwrap();

        assert_eq!(texts(&main.suggest("", 0)), vec![" <color> box", " <size> box"]);
        assert_eq!(
            "<size:sizes,color:colors>".into_pattern(),
            "<color:colors,size:sizes>".into_pattern()
        );
    }

    #[test]
    fn test_unwind_crosses_lookup_boundaries() {
        let mut dictionary = Dictionary::new();
        dictionary.define("colors", ["red", "red orange"]).unwrap();
        dictionary.define("items", ["<color:colors> light"]).unwrap();
        dictionary.define("main", ["buy <item:items> now"]).unwrap();
        let main = dictionary.scope("main").unwrap();

        let suggestions = main.suggest("buy re", 0);
        assert_eq!(
            texts(&suggestions),
            vec!["d light now", "d orange light now"]
        );
        assert_eq!(suggestions[0].stem(), Some("re"));
        assert_eq!(suggestions[0].completed_word(), Some("red".to_string()));
    }

    #[test]
    fn test_suggest_with_lookahead() {
        let mut dictionary = Dictionary::new();
        dictionary.define("colors", ["red", "blue"]).unwrap();
        dictionary.define("main", ["set <color:colors> light"]).unwrap();
        let main = dictionary.scope("main").unwrap();

        assert_eq!(texts(&main.suggest("set", 0)), vec![" <color> light"]);
        let resolved = main.suggest("set", 1);
        assert_eq!(texts(&resolved), vec![" blue light", " red light"]);
        assert!(resolved
            .iter()
            .all(|s| !s.segments().iter().any(|seg| matches!(seg, Segment::Lookup(_)))));
    }

    #[test]
    fn test_remove_is_rejected_without_mutation() {
        let mut dictionary = Dictionary::new();
        dictionary.define("main", ["turn on"]).unwrap();
        let before = dictionary.node_count();
        assert_eq!(
            dictionary.scope_mut("main").unwrap().remove("turn on"),
            Err(ScopeError::RemovalUnsupported)
        );
        assert_eq!(dictionary.node_count(), before);
        assert_eq!(texts(&dictionary.scope("main").unwrap().suggest("turn", 0)), vec![" on"]);
    }

    #[test]
    fn test_patterns_round_trip() {
        let mut dictionary = Dictionary::new();
        dictionary.define("colors", ["red"]).unwrap();
        dictionary
            .define("main", ["turn on", "turn off", "<color:colors> light", "go"])
            .unwrap();
        let patterns: Vec<String> = dictionary
            .scope("main")
            .unwrap()
            .patterns()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            patterns,
            vec!["go", "turn off", "turn on", "<color:colors> light"]
        );
    }
}

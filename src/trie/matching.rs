//! Pattern matching over the phrase trie.
//!
//! Matching walks input tokens through the trie starting at a word boundary.
//! A token is consumed by following the `words` edge for its first character
//! and then the `chars` edges for the rest. After a complete token the walk is
//! at a word boundary again and may continue with the next token, either
//! through more word edges or by descending into a lookup.
//!
//! Lookup nodes delegate to the scopes they reference. A match found inside a
//! referenced scope is spliced back into the enclosing pattern: the lookup
//! node is pushed onto the match's node stack, and if the referenced pattern
//! ended with tokens left over, matching resumes from the lookup node's own
//! children.

use super::{Arena, NodeId, NodeKind, ScopeId};
use crate::pattern::Word;
use rustc_hash::FxHashSet;
use tracing::trace;

/// One way of walking a token sequence through the trie.
///
/// `nodes` is a stack: the first entry is the deepest node reached (where the
/// last examined characters live); every further entry is a lookup node whose
/// referenced scope the walk is still inside, outermost last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'i> {
    /// Traversed node stack, innermost first
    pub nodes: Vec<NodeId>,
    /// Tokens left unconsumed
    pub remainder: &'i [Word],
}

impl<'i> Match<'i> {
    fn at(node: NodeId, remainder: &'i [Word]) -> Self {
        Match {
            nodes: vec![node],
            remainder,
        }
    }

    /// Whether every input token was consumed.
    pub fn is_complete(&self) -> bool {
        self.remainder.is_empty()
    }
}

/// Stateful matcher for a single query.
///
/// Scopes may reference each other cyclically. The matcher tracks which
/// `(scope, remaining tokens)` pairs are being resolved on the current path
/// and refuses to re-enter one, so a lookup cycle that consumes no tokens
/// terminates instead of recursing forever.
pub struct Matcher<'d> {
    arena: &'d Arena,
    roots: &'d [NodeId],
    active: FxHashSet<(ScopeId, usize)>,
}

impl<'d> Matcher<'d> {
    /// Create a matcher over `arena`, where `roots[scope]` is each scope's root.
    pub fn new(arena: &'d Arena, roots: &'d [NodeId]) -> Self {
        Matcher {
            arena,
            roots,
            active: FxHashSet::default(),
        }
    }

    /// Match `tokens` starting at `node`.
    ///
    /// Returns every way the tokens can be walked from `node`, including
    /// partial walks that stop on a pattern terminal with tokens remaining.
    pub fn match_pattern<'i>(&mut self, node: NodeId, tokens: &'i [Word]) -> Vec<Match<'i>> {
        let arena = self.arena;
        match arena.node(node).kind() {
            NodeKind::Lookup { contexts, .. } => self.match_lookup(node, contexts, tokens),
            NodeKind::Root { .. } | NodeKind::Char(_) => self.match_boundary(node, tokens),
        }
    }

    /// Match `tokens` from the root of `scope`.
    pub fn match_scope<'i>(&mut self, scope: ScopeId, tokens: &'i [Word]) -> Vec<Match<'i>> {
        let key = (scope, tokens.len());
        if !self.active.insert(key) {
            trace!(scope, remaining = tokens.len(), "lookup cycle cut");
            return Vec::new();
        }

        let root = self.roots[scope as usize];
        let matches = self.match_boundary(root, tokens);
        self.active.remove(&key);
        matches
    }

    /// Base primitive: match from a word boundary without entering `node`'s
    /// own referenced scopes.
    fn match_boundary<'i>(&mut self, node: NodeId, tokens: &'i [Word]) -> Vec<Match<'i>> {
        let Some((token, rest)) = tokens.split_first() else {
            return vec![Match::at(node, tokens)];
        };

        let arena = self.arena;
        let mut matches = Vec::new();

        if let Some(end) = self.walk_token(node, token) {
            if rest.is_empty() {
                matches.push(Match::at(end, rest));
            } else {
                // The pattern may stop after this word even though input remains;
                // an enclosing lookup can pick the remainder up.
                if arena.node(end).is_end() {
                    matches.push(Match::at(end, rest));
                }
                matches.extend(self.match_boundary(end, rest));
            }
        }

        for &lookup in arena.node(node).lookup_edges() {
            matches.extend(self.match_pattern(lookup, tokens));
        }

        matches
    }

    /// Follow one token from a word boundary, returning the node of its last char.
    fn walk_token(&self, node: NodeId, token: &str) -> Option<NodeId> {
        let mut chars = token.chars();
        let first = chars.next()?;
        let mut current = self.arena.node(node).word_child(first)?;
        for c in chars {
            current = self.arena.node(current).char_child(c)?;
        }
        Some(current)
    }

    fn match_lookup<'i>(
        &mut self,
        lookup: NodeId,
        contexts: &[ScopeId],
        tokens: &'i [Word],
    ) -> Vec<Match<'i>> {
        let arena = self.arena;
        let lookup_is_end = arena.node(lookup).is_end();
        let mut matches = Vec::new();

        for &scope in contexts {
            let inner = self.match_scope(scope, tokens);
            trace!(lookup, scope, candidates = inner.len(), "resolving lookup");

            for mut candidate in inner {
                let Some(&top) = candidate.nodes.last() else {
                    continue;
                };
                let top = arena.node(top);
                let terminal = top.is_end();

                // A terminal leaf says nothing more once the lookup node stands in for it.
                if terminal && top.is_leaf() {
                    candidate.nodes.pop();
                }
                candidate.nodes.push(lookup);

                if candidate.is_complete() {
                    matches.push(candidate);
                    continue;
                }

                // A prefix inside the referenced scope cannot be continued outside it.
                if !terminal {
                    continue;
                }

                let remainder = candidate.remainder;
                if lookup_is_end {
                    matches.push(candidate);
                }
                matches.extend(self.match_boundary(lookup, remainder));
            }
        }

        matches
    }
}

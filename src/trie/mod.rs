//! Arena-backed phrase trie.
//!
//! Every scope of a [`Dictionary`](crate::Dictionary) lives in one shared
//! [`Arena`]. Nodes are addressed by [`NodeId`] and scopes by [`ScopeId`], so
//! lookup nodes can point at other scopes (including their own) without
//! ownership cycles.
//!
//! Each node carries three sorted edge lists:
//!
//! - `chars`: the next character of the word currently being spelled
//! - `words`: the first character of the next word
//! - `lookups`: a lookup placeholder starting at the next position
//!
//! A scope root represents the boundary before the first word, so its
//! `chars` list is always empty and words begin through `words`.

pub mod completion;
pub mod matching;

pub use matching::{Match, Matcher};

use smallvec::SmallVec;

/// Index of a node in the [`Arena`].
pub type NodeId = usize;

/// Index of a scope in the [`Dictionary`](crate::Dictionary).
pub type ScopeId = u32;

/// Variant payload of a trie node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The root of a scope
    Root {
        /// Scope this root belongs to
        scope: ScopeId,
    },
    /// A character position inside a word
    Char(char),
    /// A lookup placeholder bound to an alias and its contexts
    Lookup {
        /// Alias of the placeholder
        alias: String,
        /// Referenced scopes, in declaration order (never empty)
        contexts: SmallVec<[ScopeId; 2]>,
    },
}

/// A trie vertex.
#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    // Sorted by label; most nodes have very few children
    chars: SmallVec<[(char, NodeId); 4]>,
    words: SmallVec<[(char, NodeId); 2]>,
    lookups: SmallVec<[NodeId; 2]>,
    end: bool,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            chars: SmallVec::new(),
            words: SmallVec::new(),
            lookups: SmallVec::new(),
            end: false,
        }
    }

    /// The node's variant payload.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Whether some inserted pattern terminates exactly here.
    pub fn is_end(&self) -> bool {
        self.end
    }

    /// Whether the node has no outgoing edges of any kind.
    pub fn is_leaf(&self) -> bool {
        self.chars.is_empty() && self.words.is_empty() && self.lookups.is_empty()
    }

    /// Child continuing the current word with `c`.
    pub fn char_child(&self, c: char) -> Option<NodeId> {
        find_edge(&self.chars, c)
    }

    /// Child starting the next word with `c`.
    pub fn word_child(&self, c: char) -> Option<NodeId> {
        find_edge(&self.words, c)
    }

    /// `(char, child)` edges continuing the current word.
    pub fn char_edges(&self) -> &[(char, NodeId)] {
        &self.chars
    }

    /// `(char, child)` edges starting the next word.
    pub fn word_edges(&self) -> &[(char, NodeId)] {
        &self.words
    }

    /// Lookup children, in alias order.
    pub fn lookup_edges(&self) -> &[NodeId] {
        &self.lookups
    }
}

fn find_edge(edges: &[(char, NodeId)], c: char) -> Option<NodeId> {
    if edges.len() < 16 {
        edges.iter().find(|(label, _)| *label == c).map(|(_, id)| *id)
    } else {
        edges
            .binary_search_by_key(&c, |(label, _)| *label)
            .ok()
            .map(|i| edges[i].1)
    }
}

fn insert_edge_sorted<A>(edges: &mut SmallVec<A>, label: char, target: NodeId)
where
    A: smallvec::Array<Item = (char, NodeId)>,
{
    match edges.binary_search_by_key(&label, |(l, _)| *l) {
        Ok(pos) => edges[pos] = (label, target),
        Err(pos) => edges.insert(pos, (label, target)),
    }
}

/// Which character edge list to follow or extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Continue the current word
    Char,
    /// Start the next word
    Word,
}

/// Storage for the nodes of every scope.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node has been allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this arena.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(kind));
        id
    }

    pub(crate) fn alloc_root(&mut self, scope: ScopeId) -> NodeId {
        self.alloc(NodeKind::Root { scope })
    }

    /// Follow the `edge` labelled `c` from `parent`, creating the child if absent.
    pub(crate) fn ensure_child(&mut self, parent: NodeId, edge: Edge, c: char) -> NodeId {
        let existing = match edge {
            Edge::Char => self.nodes[parent].char_child(c),
            Edge::Word => self.nodes[parent].word_child(c),
        };
        if let Some(child) = existing {
            return child;
        }

        debug_assert!(
            !(edge == Edge::Char && matches!(self.nodes[parent].kind, NodeKind::Root { .. })),
            "scope roots never continue a word"
        );

        let child = self.alloc(NodeKind::Char(c));
        let node = &mut self.nodes[parent];
        match edge {
            Edge::Char => insert_edge_sorted(&mut node.chars, c, child),
            Edge::Word => insert_edge_sorted(&mut node.words, c, child),
        }
        child
    }

    /// Find or create the lookup child of `parent` bound to `alias` and `contexts`.
    ///
    /// An existing lookup edge is reused only if both alias and contexts
    /// match; otherwise a sibling is added so no edge is ever overwritten.
    pub(crate) fn ensure_lookup(
        &mut self,
        parent: NodeId,
        alias: &str,
        contexts: &[ScopeId],
    ) -> NodeId {
        let existing = self.nodes[parent].lookups.iter().copied().find(|&id| {
            matches!(
                &self.nodes[id].kind,
                NodeKind::Lookup { alias: a, contexts: c } if a == alias && c.as_slice() == contexts
            )
        });
        if let Some(child) = existing {
            return child;
        }

        let child = self.alloc(NodeKind::Lookup {
            alias: alias.to_string(),
            contexts: contexts.iter().copied().collect(),
        });
        let pos = self.nodes[parent]
            .lookups
            .partition_point(|&id| self.nodes[id].lookup_alias() <= Some(alias));
        self.nodes[parent].lookups.insert(pos, child);
        child
    }

    pub(crate) fn mark_end(&mut self, id: NodeId) {
        self.nodes[id].end = true;
    }
}

impl Node {
    fn lookup_alias(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Lookup { alias, .. } => Some(alias),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_stay_sorted() {
        let mut arena = Arena::new();
        let root = arena.alloc_root(0);
        for c in ['t', 'b', 'x', 'a'] {
            arena.ensure_child(root, Edge::Word, c);
        }
        let labels: Vec<char> = arena.node(root).word_edges().iter().map(|(c, _)| *c).collect();
        assert_eq!(labels, vec!['a', 'b', 't', 'x']);
        assert!(arena.node(root).char_edges().is_empty());
    }

    #[test]
    fn test_ensure_child_reuses_nodes() {
        let mut arena = Arena::new();
        let root = arena.alloc_root(0);
        let t1 = arena.ensure_child(root, Edge::Word, 't');
        let t2 = arena.ensure_child(root, Edge::Word, 't');
        assert_eq!(t1, t2);
        assert_eq!(arena.len(), 2);

        let u = arena.ensure_child(t1, Edge::Char, 'u');
        assert_eq!(arena.node(t1).char_child('u'), Some(u));
        assert_eq!(arena.node(t1).word_child('u'), None);
    }

    #[test]
    fn test_lookup_edges_keyed_by_alias_and_contexts() {
        let mut arena = Arena::new();
        let root = arena.alloc_root(0);
        let a = arena.ensure_lookup(root, "color", &[1]);
        let b = arena.ensure_lookup(root, "color", &[1]);
        let c = arena.ensure_lookup(root, "color", &[2]);
        let d = arena.ensure_lookup(root, "amount", &[3]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(arena.node(root).lookup_edges(), &[d, a, c]);
    }

    #[test]
    fn test_leaf_and_end() {
        let mut arena = Arena::new();
        let root = arena.alloc_root(0);
        assert!(arena.node(root).is_leaf());
        let x = arena.ensure_child(root, Edge::Word, 'x');
        arena.mark_end(x);
        assert!(!arena.node(root).is_leaf());
        assert!(arena.node(x).is_leaf());
        assert!(arena.node(x).is_end());
    }
}

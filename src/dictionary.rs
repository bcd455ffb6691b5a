//! Scope registry.
//!
//! A [`Dictionary`] owns every scope of a grammar together with the node
//! arena they share. Scopes are addressed by name when defined and by
//! [`ScopeId`] once lookups have been resolved.

use crate::error::{Result, ScopeError};
use crate::pattern::{Element, IntoPattern, Pattern};
use crate::scope::{Scope, ScopeMut};
use crate::trie::{Arena, NodeId, ScopeId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

/// A named collection of scopes.
///
/// # Examples
///
/// ```
/// use phrase_trie::Dictionary;
///
/// let mut dictionary = Dictionary::new();
/// dictionary.define("colors", ["red", "blue"]).unwrap();
/// dictionary.define("main", ["<color:colors> light"]).unwrap();
///
/// let main = dictionary.scope("main").unwrap();
/// let texts: Vec<String> = main.suggest("red", 0).iter().map(|s| s.to_string()).collect();
/// assert_eq!(texts, vec![" light"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    pub(crate) arena: Arena,
    roots: Vec<NodeId>,
    names: Vec<String>,
    index: FxHashMap<String, ScopeId>,
}

/// A pattern element whose context names have been turned into scope ids.
#[derive(Debug)]
pub(crate) enum Resolved<'p> {
    Word(&'p str),
    Lookup(Vec<(&'p str, SmallVec<[ScopeId; 2]>)>),
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty scope.
    ///
    /// Declaring scopes up front lets later definitions reference each other
    /// in any order.
    pub fn declare(&mut self, name: impl Into<String>) -> Result<ScopeId> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(ScopeError::ScopeExists(name));
        }

        let id = self.roots.len() as ScopeId;
        let root = self.arena.alloc_root(id);
        self.roots.push(root);
        self.index.insert(name.clone(), id);
        debug!(scope = %name, id, "declared scope");
        self.names.push(name);
        Ok(id)
    }

    /// Register a scope and insert `patterns` into it.
    ///
    /// Patterns may reference the scope being defined. Every pattern is
    /// normalized and every referenced context resolved before anything is
    /// registered, so a failing definition leaves the dictionary unchanged.
    ///
    /// # Errors
    ///
    /// - [`ScopeError::ScopeExists`] if `name` is taken
    /// - [`ScopeError::UnknownContext`] if a lookup names an unregistered scope
    /// - [`ScopeError::Pattern`] if a pattern is malformed
    pub fn define<I, P>(&mut self, name: impl Into<String>, patterns: I) -> Result<ScopeId>
    where
        I: IntoIterator<Item = P>,
        P: IntoPattern,
    {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(ScopeError::ScopeExists(name));
        }

        let patterns = patterns
            .into_iter()
            .map(|pattern| pattern.into_pattern())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let pending = (name.as_str(), self.roots.len() as ScopeId);
        for pattern in &patterns {
            self.resolve_pattern(pattern, Some(pending))?;
        }

        let id = self.declare(name)?;
        let mut scope = self.scope_mut_by_id(id);
        for pattern in &patterns {
            scope.add(pattern)?;
        }
        debug!(id, patterns = patterns.len(), nodes = self.arena.len(), "defined scope");
        Ok(id)
    }

    /// Look up a scope id by name.
    pub fn resolve(&self, name: &str) -> Option<ScopeId> {
        self.index.get(name).copied()
    }

    /// Borrow a scope for querying.
    pub fn scope(&self, name: &str) -> Result<Scope<'_>> {
        let id = self
            .resolve(name)
            .ok_or_else(|| ScopeError::UnknownScope(name.to_string()))?;
        Ok(Scope::new(self, id))
    }

    /// Borrow a scope for inserting patterns.
    pub fn scope_mut(&mut self, name: &str) -> Result<ScopeMut<'_>> {
        let id = self
            .resolve(name)
            .ok_or_else(|| ScopeError::UnknownScope(name.to_string()))?;
        Ok(self.scope_mut_by_id(id))
    }

    fn scope_mut_by_id(&mut self, id: ScopeId) -> ScopeMut<'_> {
        ScopeMut::new(self, id)
    }

    /// Scope names in registration order.
    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Name of the scope with the given id.
    pub fn name(&self, id: ScopeId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// Number of registered scopes.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether no scope is registered.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of trie nodes across all scopes.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// The node arena shared by all scopes.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Root node of a scope.
    ///
    /// # Panics
    ///
    /// Panics if `scope` was not issued by this dictionary.
    pub fn root(&self, scope: ScopeId) -> NodeId {
        self.roots[scope as usize]
    }

    pub(crate) fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Resolve every context name of `pattern` without mutating anything.
    ///
    /// `pending` names a scope about to be registered under the given id.
    pub(crate) fn resolve_pattern<'p>(
        &self,
        pattern: &'p Pattern,
        pending: Option<(&str, ScopeId)>,
    ) -> Result<Vec<Resolved<'p>>> {
        pattern
            .iter()
            .map(|element| match element {
                Element::Word(word) => Ok(Resolved::Word(word.as_str())),
                Element::Lookup(lookup) => lookup
                    .aliases()
                    .map(|(alias, contexts)| {
                        let ids = contexts
                            .iter()
                            .map(|context| {
                                self.resolve(context)
                                    .or_else(|| {
                                        pending
                                            .filter(|(name, _)| name == context)
                                            .map(|(_, id)| id)
                                    })
                                    .ok_or_else(|| ScopeError::UnknownContext {
                                        alias: alias.to_string(),
                                        context: context.clone(),
                                    })
                            })
                            .collect::<Result<SmallVec<_>>>()?;
                        Ok((alias, ids))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Resolved::Lookup),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_resolve() {
        let mut dictionary = Dictionary::new();
        let a = dictionary.declare("a").unwrap();
        let b = dictionary.declare("b").unwrap();
        assert_ne!(a, b);
        assert_eq!(dictionary.resolve("b"), Some(b));
        assert_eq!(dictionary.name(a), Some("a"));
        assert_eq!(dictionary.len(), 2);
        assert_eq!(
            dictionary.declare("a"),
            Err(ScopeError::ScopeExists("a".to_string()))
        );
        assert_eq!(dictionary.scope_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_define_self_reference() {
        let mut dictionary = Dictionary::new();
        let id = dictionary
            .define("list", ["item", "item and <rest:list>"])
            .unwrap();
        assert_eq!(dictionary.resolve("list"), Some(id));
    }

    #[test]
    fn test_failed_define_registers_nothing() {
        let mut dictionary = Dictionary::new();
        dictionary.define("colors", ["red"]).unwrap();
        let nodes = dictionary.node_count();

        let err = dictionary
            .define("main", ["turn on", "<device:devices>"])
            .unwrap_err();
        assert_eq!(
            err,
            ScopeError::UnknownContext {
                alias: "device".to_string(),
                context: "devices".to_string(),
            }
        );
        assert_eq!(dictionary.resolve("main"), None);
        assert_eq!(dictionary.node_count(), nodes);
    }

    #[test]
    fn test_unknown_scope() {
        let dictionary = Dictionary::new();
        assert!(matches!(
            dictionary.scope("missing"),
            Err(ScopeError::UnknownScope(name)) if name == "missing"
        ));
    }
}

//! Suggestion value type.
//!
//! A [`Suggestion`] is everything that could follow a query's input: a
//! sequence of [`Segment`]s made of characters finishing the current word,
//! new words and unresolved lookup placeholders.

use crate::dictionary::Dictionary;
use crate::trie::completion::complete_pattern;
use crate::trie::ScopeId;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::fmt;
use tracing::trace;

/// An unresolved lookup inside a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    /// Alias of the lookup
    pub alias: String,
    /// Scopes whose patterns may fill the placeholder
    pub contexts: SmallVec<[ScopeId; 2]>,
}

/// One piece of a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Characters continuing the word being typed
    Text(String),
    /// A new word
    Word(String),
    /// A lookup that still has to be filled
    Lookup(Placeholder),
}

/// A completion of the input.
///
/// Displayed as the text to append to the input: `Text` segments attach
/// directly, `Word` segments are preceded by a space, placeholders render as
/// ` <alias>`. The empty suggestion means the input already satisfies a
/// pattern.
///
/// # Examples
///
/// ```
/// use phrase_trie::suggestion::{Segment, Suggestion};
///
/// let head = Suggestion::new(vec![Segment::Text("ghts".into())]);
/// let tail = Suggestion::new(vec![Segment::Word("on".into())]);
/// assert_eq!(head.concat(&tail).to_string(), "ghts on");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Suggestion {
    stem: Option<String>,
    segments: Vec<Segment>,
}

impl Suggestion {
    /// Create a suggestion from its segments.
    pub fn new(segments: Vec<Segment>) -> Self {
        Suggestion {
            stem: None,
            segments,
        }
    }

    /// The segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether nothing remains to be typed.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The partially typed word the first segment continues, if any.
    pub fn stem(&self) -> Option<&str> {
        self.stem.as_deref()
    }

    pub(crate) fn set_stem(&mut self, stem: &str) {
        self.stem = Some(stem.to_string());
    }

    /// The word being typed once completed, e.g. `"lights"` for stem `"li"`.
    pub fn completed_word(&self) -> Option<String> {
        match (self.stem.as_deref(), self.segments.first()) {
            (Some(stem), Some(Segment::Text(rest))) => Some(format!("{}{}", stem, rest)),
            _ => None,
        }
    }

    /// Whether the suggestion holds no unresolved placeholder.
    pub fn is_resolved(&self) -> bool {
        self.placeholders().next().is_none()
    }

    /// Iterate over the unresolved placeholders.
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Lookup(placeholder) => Some(placeholder),
            _ => None,
        })
    }

    /// Append `other` after `self`, preserving order.
    ///
    /// The stem of `self` is kept. If `other` starts by continuing a word,
    /// its characters join the last word of `self`.
    pub fn concat(&self, other: &Suggestion) -> Suggestion {
        let mut segments = self.segments.clone();
        let mut rest = other.segments.iter();

        if let Some(Segment::Text(tail)) = other.segments.first() {
            if let Some(Segment::Text(head) | Segment::Word(head)) = segments.last_mut() {
                head.push_str(tail);
                rest.next();
            }
        }
        segments.extend(rest.cloned());

        Suggestion {
            stem: self.stem.clone().or_else(|| other.stem.clone()),
            segments,
        }
    }

    /// Replace placeholders with concrete words from their contexts.
    ///
    /// Placeholders are resolved left to right, spending at most `lookahead`
    /// words in total. Each placeholder is replaced by every pattern of its
    /// contexts that fits the remaining budget (nested placeholders included).
    /// If some pattern does not fit, a copy keeping the placeholder is
    /// returned as well and resolution stops there.
    ///
    /// A placeholder whose contexts hold no pattern at all cannot be satisfied,
    /// and suggestions depending on it are dropped. Context ids unknown to
    /// `dictionary` count as empty contexts.
    pub fn resolve_lookups(&self, dictionary: &Dictionary, lookahead: usize) -> Vec<Suggestion> {
        let mut resolver = Resolver {
            dictionary,
            active: FxHashSet::default(),
        };

        // (segments so far, remaining budget, stopped)
        let mut partials: Vec<(Vec<Segment>, usize, bool)> = vec![(Vec::new(), lookahead, false)];

        for segment in &self.segments {
            let Segment::Lookup(placeholder) = segment else {
                for (prefix, _, _) in &mut partials {
                    prefix.push(segment.clone());
                }
                continue;
            };

            let mut next = Vec::with_capacity(partials.len());
            for (prefix, budget, stopped) in partials {
                if stopped {
                    let mut kept = prefix;
                    kept.push(segment.clone());
                    next.push((kept, budget, true));
                    continue;
                }

                let (expansions, overflow) = resolver.expand(placeholder, budget);
                for (expansion, cost) in expansions {
                    let mut resolved = prefix.clone();
                    resolved.extend(expansion);
                    next.push((resolved, budget - cost, false));
                }
                if overflow {
                    let mut kept = prefix;
                    kept.push(segment.clone());
                    next.push((kept, budget, true));
                }
            }
            partials = next;
        }

        partials
            .into_iter()
            .map(|(segments, _, _)| Suggestion {
                stem: self.stem.clone(),
                segments,
            })
            .collect()
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => f.write_str(text)?,
                Segment::Word(word) => write!(f, " {}", word)?,
                Segment::Lookup(placeholder) => write!(f, " <{}>", placeholder.alias)?,
            }
        }
        Ok(())
    }
}

/// Expands placeholders into concrete words within a word budget.
struct Resolver<'d> {
    dictionary: &'d Dictionary,
    // (scope, budget) pairs being expanded on the current path
    active: FxHashSet<(ScopeId, usize)>,
}

type Expansion = (Vec<Segment>, usize);

impl Resolver<'_> {
    /// Every concrete expansion of `placeholder` costing at most `budget`
    /// words, and whether some expansion was cut short.
    fn expand(&mut self, placeholder: &Placeholder, budget: usize) -> (Vec<Expansion>, bool) {
        let mut expansions = Vec::new();
        let mut overflow = false;

        for &scope in &placeholder.contexts {
            // Ids issued by another dictionary have no patterns here
            let Some(&root) = self.dictionary.roots().get(scope as usize) else {
                trace!(scope, "unknown context skipped");
                continue;
            };
            if !self.active.insert((scope, budget)) {
                trace!(scope, budget, "lookahead cycle cut");
                overflow = true;
                continue;
            }

            for completion in complete_pattern(self.dictionary.arena(), root, &[]) {
                let (resolved, cut) = self.resolve_fully(completion.segments(), budget);
                expansions.extend(resolved);
                overflow |= cut;
            }

            self.active.remove(&(scope, budget));
        }

        (expansions, overflow)
    }

    fn resolve_fully(&mut self, segments: &[Segment], budget: usize) -> (Vec<Expansion>, bool) {
        let mut partials: Vec<Expansion> = vec![(Vec::new(), 0)];
        let mut overflow = false;

        for segment in segments {
            let mut next = Vec::with_capacity(partials.len());
            match segment {
                Segment::Lookup(placeholder) => {
                    for (prefix, cost) in partials {
                        let (expansions, cut) = self.expand(placeholder, budget - cost);
                        overflow |= cut;
                        for (expansion, extra) in expansions {
                            let mut resolved = prefix.clone();
                            resolved.extend(expansion);
                            next.push((resolved, cost + extra));
                        }
                    }
                }
                Segment::Text(_) | Segment::Word(_) => {
                    for (mut prefix, cost) in partials {
                        if cost == budget {
                            overflow = true;
                            continue;
                        }
                        prefix.push(segment.clone());
                        next.push((prefix, cost + 1));
                    }
                }
            }
            partials = next;
        }

        (partials, overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Segment {
        Segment::Word(text.to_string())
    }

    fn rendered(suggestions: &[Suggestion]) -> Vec<String> {
        suggestions.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_display() {
        let suggestion = Suggestion::new(vec![
            Segment::Text("rn".to_string()),
            word("on"),
            Segment::Lookup(Placeholder {
                alias: "device".to_string(),
                contexts: SmallVec::from_slice(&[0]),
            }),
        ]);
        assert_eq!(suggestion.to_string(), "rn on <device>");
        assert!(!suggestion.is_resolved());
        assert_eq!(Suggestion::default().to_string(), "");
    }

    #[test]
    fn test_concat_preserves_order() {
        let a = Suggestion::new(vec![word("on")]);
        let b = Suggestion::new(vec![word("the"), word("lights")]);
        assert_eq!(a.concat(&b).segments(), &[word("on"), word("the"), word("lights")]);
        assert_eq!(b.concat(&a).segments(), &[word("the"), word("lights"), word("on")]);
        assert_eq!(Suggestion::default().concat(&a), a);
    }

    #[test]
    fn test_completed_word() {
        let mut suggestion = Suggestion::new(vec![Segment::Text("ghts".to_string()), word("on")]);
        assert_eq!(suggestion.completed_word(), None);
        suggestion.set_stem("li");
        assert_eq!(suggestion.completed_word(), Some("lights".to_string()));
    }

    fn device_dictionary() -> Dictionary {
        let mut dictionary = Dictionary::new();
        dictionary.define("devices", ["fan", "kitchen light"]).unwrap();
        dictionary.define("main", ["turn on <device:devices>"]).unwrap();
        dictionary
    }

    #[test]
    fn test_resolve_within_budget() {
        let dictionary = device_dictionary();
        let main = dictionary.scope("main").unwrap();
        let suggestions = main.suggest("turn", 0);
        assert_eq!(rendered(&suggestions), vec![" on <device>"]);

        let resolved = suggestions[0].resolve_lookups(&dictionary, 2);
        assert_eq!(rendered(&resolved), vec![" on fan", " on kitchen light"]);
        assert!(resolved.iter().all(Suggestion::is_resolved));
    }

    #[test]
    fn test_resolve_over_budget_keeps_placeholder() {
        let dictionary = device_dictionary();
        let main = dictionary.scope("main").unwrap();
        let suggestions = main.suggest("turn", 0);

        let resolved = suggestions[0].resolve_lookups(&dictionary, 1);
        assert_eq!(rendered(&resolved), vec![" on fan", " on <device>"]);
    }

    #[test]
    fn test_resolve_without_budget() {
        let dictionary = device_dictionary();
        let main = dictionary.scope("main").unwrap();
        let suggestions = main.suggest("turn", 0);

        let resolved = suggestions[0].resolve_lookups(&dictionary, 0);
        assert_eq!(resolved, suggestions);
    }

    #[test]
    fn test_resolve_against_foreign_dictionary() {
        let dictionary = device_dictionary();
        let main = dictionary.scope("main").unwrap();
        let suggestions = main.suggest("turn", 0);

        let mut other = Dictionary::new();
        other.define("only", ["x"]).unwrap();
        // Ids 1 and 7 were never issued by `other`
        let foreign = Suggestion::new(vec![Segment::Lookup(Placeholder {
            alias: "device".to_string(),
            contexts: SmallVec::from_slice(&[1, 7]),
        })]);
        assert!(foreign.resolve_lookups(&other, 2).is_empty());
        // Id 0 exists in both, so it resolves to whatever `other` holds there
        assert_eq!(rendered(&suggestions[0].resolve_lookups(&other, 2)), vec![" on x"]);
    }

    #[test]
    fn test_resolve_recursive_context_terminates() {
        let mut dictionary = Dictionary::new();
        dictionary.define("list", ["item", "item and <more:list>"]).unwrap();
        dictionary.define("main", ["buy <what:list>"]).unwrap();
        let main = dictionary.scope("main").unwrap();
        let suggestions = main.suggest("buy", 0);

        let resolved = suggestions[0].resolve_lookups(&dictionary, 3);
        assert_eq!(
            rendered(&resolved),
            vec![" item", " item and item", " <what>"]
        );
    }
}

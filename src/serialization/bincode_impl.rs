//! Bincode serializer for compact binary format.

use crate::pattern::{Element, IntoPattern, Lookup, Pattern, Word};
use std::collections::BTreeMap;
use std::io::{Read, Write};

use super::{Grammar, GrammarSerializer, SerializationError};

/// Bincode serializer for compact binary format.
///
/// Bincode cannot decode the untagged element encoding used by JSON, so
/// elements are stored with an explicit variant tag instead.
pub struct BincodeSerializer;

/// Tagged on-disk form of a pattern element.
#[derive(serde::Serialize, serde::Deserialize)]
enum StoredElement {
    Word(String),
    Lookup(Vec<(String, Vec<String>)>),
}

impl From<&Element> for StoredElement {
    fn from(element: &Element) -> Self {
        match element {
            Element::Word(word) => StoredElement::Word(word.to_string()),
            Element::Lookup(lookup) => StoredElement::Lookup(
                lookup
                    .aliases()
                    .map(|(alias, contexts)| (alias.to_string(), contexts.to_vec()))
                    .collect(),
            ),
        }
    }
}

impl StoredElement {
    fn into_element(self) -> Result<Element, SerializationError> {
        match self {
            StoredElement::Word(text) => Ok(Element::Word(Word::new(text)?)),
            StoredElement::Lookup(aliases) => {
                let lookup = aliases
                    .into_iter()
                    .try_fold(Lookup::new(), |lookup, (alias, contexts)| {
                        lookup.with(alias, contexts)
                    })?;
                Ok(Element::Lookup(lookup))
            }
        }
    }
}

impl GrammarSerializer for BincodeSerializer {
    fn serialize<W: Write>(grammar: &Grammar, mut writer: W) -> Result<(), SerializationError> {
        let scopes: BTreeMap<&str, Vec<Vec<StoredElement>>> = grammar
            .scopes
            .iter()
            .map(|(name, patterns)| {
                let patterns = patterns
                    .iter()
                    .map(|pattern| pattern.iter().map(StoredElement::from).collect())
                    .collect();
                (name.as_str(), patterns)
            })
            .collect();
        bincode::serialize_into(&mut writer, &scopes)?;
        Ok(())
    }

    fn deserialize<R: Read>(mut reader: R) -> Result<Grammar, SerializationError> {
        let scopes: BTreeMap<String, Vec<Vec<StoredElement>>> =
            bincode::deserialize_from(&mut reader)?;
        let scopes = scopes
            .into_iter()
            .map(|(name, patterns)| {
                let patterns = patterns
                    .into_iter()
                    .map(|elements| {
                        let elements = elements
                            .into_iter()
                            .map(StoredElement::into_element)
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(elements.into_pattern()?)
                    })
                    .collect::<Result<Vec<Pattern>, SerializationError>>()?;
                Ok((name, patterns))
            })
            .collect::<Result<_, SerializationError>>()?;
        Ok(Grammar { scopes })
    }
}

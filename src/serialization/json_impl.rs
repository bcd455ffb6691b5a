//! JSON serializer for human-readable format.

use std::io::{Read, Write};

use super::{Grammar, GrammarSerializer, SerializationError};

/// JSON serializer for human-readable format.
///
/// Patterns are written as element lists: words as strings and lookups as
/// `{"alias": "context"}` maps. On input, a pattern may also be a single
/// string in the text pattern syntax, which makes grammars easy to write by
/// hand.
pub struct JsonSerializer;

impl GrammarSerializer for JsonSerializer {
    fn serialize<W: Write>(grammar: &Grammar, mut writer: W) -> Result<(), SerializationError> {
        serde_json::to_writer_pretty(&mut writer, grammar)?;
        Ok(())
    }

    fn deserialize<R: Read>(mut reader: R) -> Result<Grammar, SerializationError> {
        let grammar: Grammar = serde_json::from_reader(&mut reader)?;
        Ok(grammar)
    }
}

//! Insertion-ordered code vocabularies.
//!
//! Ids are dense and assigned in first-seen order, so the id of a code is
//! its position in [`Vocabulary::codes`]. A hash index keeps lookups O(1)
//! without giving up the deterministic ordering.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::encounter::CodeKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    kind: CodeKind,
    codes: Vec<String>,
    index: HashMap<String, u32>,
}

impl Vocabulary {
    pub fn new(kind: CodeKind) -> Self {
        Self {
            kind,
            codes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Rebuilds a vocabulary from codes listed in id order.
    ///
    /// Later repeats of a code are ignored so the mapping stays injective.
    pub fn from_codes<I, S>(kind: CodeKind, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::new(kind);
        for code in codes {
            vocab.register(code.into());
        }
        vocab
    }

    pub fn kind(&self) -> CodeKind {
        self.kind
    }

    /// Returns the id of `code`, assigning the next unused id if it is new.
    pub fn register(&mut self, code: impl Into<String>) -> u32 {
        let code = code.into();
        if let Some(id) = self.index.get(&code) {
            return *id;
        }
        let id = self.codes.len() as u32;
        self.index.insert(code.clone(), id);
        self.codes.push(code);
        id
    }

    pub fn id(&self, code: &str) -> Option<u32> {
        self.index.get(code).copied()
    }

    pub fn code(&self, id: u32) -> Option<&str> {
        self.codes.get(id as usize).map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Codes in id order.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// `(code, id)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.codes
            .iter()
            .enumerate()
            .map(|(id, code)| (code.as_str(), id as u32))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct VocabularyRepr {
    kind: CodeKind,
    codes: Vec<String>,
}

impl Serialize for Vocabulary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        VocabularyRepr {
            kind: self.kind,
            codes: self.codes.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vocabulary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = VocabularyRepr::deserialize(deserializer)?;
        Ok(Vocabulary::from_codes(repr.kind, repr.codes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_seen_code_gets_next_id() {
        let mut vocab = Vocabulary::new(CodeKind::Diagnosis);
        assert_eq!(vocab.register("a"), 0);
        assert_eq!(vocab.register("b"), 1);
        assert_eq!(vocab.register("a"), 0);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.code(1), Some("b"));
        assert_eq!(vocab.id("c"), None);
    }

    #[test]
    fn serde_keeps_id_order() {
        let vocab = Vocabulary::from_codes(CodeKind::Treatment, ["x", "y", "z"]);
        let json = serde_json::to_string(&vocab).expect("serialize vocabulary");
        assert_eq!(json, r#"{"kind":"treatment","codes":["x","y","z"]}"#);
        let round: Vocabulary = serde_json::from_str(&json).expect("deserialize vocabulary");
        assert_eq!(round, vocab);
        assert_eq!(round.id("z"), Some(2));
    }
}

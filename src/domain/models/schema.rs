//! Ordered payload field schemas.

use serde::{Deserialize, Serialize};

/// One declared payload field: a name and a loose type hint.
///
/// The hint is advisory (discovered by static scanning upstream); mutation
/// only needs the field names, so unknown hints are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name as it appears in the request body.
    pub name: String,
    /// Declared type hint, e.g. `"string"`, `"number"`.
    pub type_hint: String,
}

/// An ordered mapping of field name → declared type hint.
///
/// Order is preserved so mutation output is reproducible for a seeded RNG;
/// duplicate names are not expected and the last occurrence would win in the
/// generated JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadSchema {
    fields: Vec<SchemaField>,
}

impl PayloadSchema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from `(name, type_hint)` pairs, preserving order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, type_hint)| SchemaField {
                    name: name.into(),
                    type_hint: type_hint.into(),
                })
                .collect(),
        }
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The declared fields in order.
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_preserves_order() {
        let schema = PayloadSchema::from_pairs([("name", "string"), ("email", "string")]);
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "email"]);
    }

    #[test]
    fn empty_schema() {
        let schema = PayloadSchema::new();
        assert!(schema.is_empty());
        assert_eq!(schema.len(), 0);
    }
}

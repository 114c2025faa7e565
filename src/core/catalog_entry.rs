use serde::{Deserialize, Serialize};

/// A product as known to the catalog store.
///
/// The engine only reads entries; the store that produced them owns them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Opaque identifier assigned by the store
    #[serde(default)]
    pub id: String,

    /// Canonical product name
    pub name: String,

    /// Free-text aliases, in insertion order
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl CatalogEntry {
    /// Create a new entry with no aliases
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    /// Builder-style alias list
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Parse a comma-joined alias field (the storage format).
    pub fn split_aliases(field: &str) -> Vec<String> {
        field
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Aliases joined back into the storage format
    pub fn joined_aliases(&self) -> String {
        self.aliases.join(",")
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

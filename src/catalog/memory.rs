use async_trait::async_trait;

use crate::catalog::CandidateSource;
use crate::core::CatalogEntry;
use crate::error::{MatchEngineError, Result};
use crate::text::{normalize, parse_fts_terms, FtsTerm};

/// Catalog held in memory, for tests and small embedded lists.
///
/// `search` evaluates the rendered full-text query directly: a phrase hits
/// when the normalized name or any alias contains it, a `prefix*` term hits
/// when one of their tokens starts with the prefix. Results keep insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: Vec<CatalogEntry>,
}

impl InMemoryCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Append an entry, assigning the next numeric id when it has none
    pub fn push(&mut self, mut entry: CatalogEntry) {
        if entry.id.is_empty() {
            entry.id = (self.entries.len() + 1).to_string();
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalized name followed by every normalized, non-blank alias
    fn searchable_texts(entry: &CatalogEntry) -> Vec<String> {
        std::iter::once(normalize(&entry.name))
            .chain(
                entry
                    .aliases
                    .iter()
                    .flat_map(|field| field.split(','))
                    .map(normalize),
            )
            .filter(|text| !text.is_empty())
            .collect()
    }

    fn term_matches(term: &FtsTerm, texts: &[String]) -> bool {
        match term {
            FtsTerm::Phrase(phrase) => {
                let phrase = normalize(phrase);
                !phrase.is_empty() && texts.iter().any(|text| text.contains(&phrase))
            }
            FtsTerm::Prefix(prefix) => {
                let prefix = normalize(prefix);
                !prefix.is_empty()
                    && texts
                        .iter()
                        .flat_map(|text| text.split_whitespace())
                        .any(|token| token.starts_with(&prefix))
            }
        }
    }
}

impl FromIterator<CatalogEntry> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        let mut catalog = InMemoryCatalog::default();
        for entry in iter {
            catalog.push(entry);
        }
        catalog
    }
}

#[async_trait]
impl CandidateSource for InMemoryCatalog {
    async fn search(&self, fts_query: &str) -> Result<Vec<CatalogEntry>> {
        let terms = parse_fts_terms(fts_query)
            .map_err(|e| MatchEngineError::retrieval(self.name(), e.to_string()))?;

        Ok(self
            .entries
            .iter()
            .filter(|entry| {
                let texts = Self::searchable_texts(entry);
                terms.iter().any(|term| Self::term_matches(term, &texts))
            })
            .cloned()
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.entries.clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

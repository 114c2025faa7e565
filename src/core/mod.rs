pub mod catalog_entry;
pub mod resolve_outcome;

pub use catalog_entry::CatalogEntry;
pub use resolve_outcome::{RankedCandidate, ResolveOutcome};

//! Text canonicalization and query expansion.

pub mod normalize;
pub mod variants;

pub use normalize::{
    contains_digits, extract_dimensions, extract_numbers, has_dimensions, normalize,
    normalize_potential_dimension, tokenize,
};
pub use variants::{generate_variants, parse_fts_terms, to_fts_query, FtsTerm};

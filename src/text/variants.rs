//! Query expansion for the full-text candidate index.
//!
//! A transcription like "cartofi 27.5" may be indexed as "cartof", "27 5"
//! or "275"; [`generate_variants`] widens the net and [`to_fts_query`]
//! renders the set as one disjunctive expression:
//!
//! ```text
//! "cartofi" OR "cartof" OR cartofi*
//! ```
//!
//! Each variant is a quoted phrase (inner quotes doubled) unless it ends in
//! `*`, in which case it is emitted bare as a prefix query.

use std::collections::HashSet;

use crate::error::{MatchEngineError, Result};
use crate::text::normalize::{normalize, number_spans};

/// Spoken quantity words (one..five) that may lead a token
const QUANTITY_WORDS: &[&str] = &["un", "o", "doi", "doua", "trei", "patru", "cinci"];

const FTS_OR: &str = " OR ";

/// Insertion-ordered, deduplicated, blank-free variant collection
#[derive(Default)]
struct VariantSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl VariantSet {
    fn add(&mut self, variant: impl Into<String>) {
        let variant = variant.into();
        if variant.trim().is_empty() || self.seen.contains(&variant) {
            return;
        }
        self.seen.insert(variant.clone());
        self.ordered.push(variant);
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

/// Expand `spoken_text` into alternative query forms.
///
/// Always contains the normalized text itself; empty only when the input
/// normalizes to an empty string.
pub fn generate_variants(spoken_text: &str) -> Vec<String> {
    let normalized = normalize(spoken_text);
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mut variants = VariantSet::default();

    variants.add(normalized.as_str());
    for token in &tokens {
        variants.add(*token);
    }

    // "6x100" vs "6 x 100" vs "6100" depending on how the index tokenized
    if normalized.contains('x') {
        variants.add(normalized.replace(" x ", " "));
        variants.add(normalized.replace('x', ""));
    }

    for (start, end) in number_spans(&normalized) {
        let number = &normalized[start..end];
        if !number.contains('.') {
            continue;
        }
        let (before, after) = (&normalized[..start], &normalized[end..]);
        variants.add(format!("{}{}{}", before, number.replace('.', " "), after));
        variants.add(format!("{}{}{}", before, number.replace('.', ""), after));
    }

    for token in &tokens {
        if let Some(stripped) = strip_quantity_word(token) {
            variants.add(stripped);
        }
        for singular in singular_forms(token) {
            variants.add(singular);
        }
    }

    for token in &tokens {
        if token.chars().count() >= 3 {
            variants.add(format!("{}*", token));
        }
    }

    variants.into_vec()
}

fn strip_quantity_word(token: &str) -> Option<&str> {
    QUANTITY_WORDS
        .iter()
        .find_map(|word| token.strip_prefix(word))
        .map(str::trim_start)
}

/// Basic Romanian plural heuristics: "cartofi" -> "cartof", "legume" ->
/// "legum", "cuiuri" -> "cuia".
fn singular_forms(token: &str) -> Vec<String> {
    let len = token.chars().count();
    let mut forms = Vec::new();

    if len > 2 && (token.ends_with('i') || token.ends_with('e')) {
        let mut chars = token.chars();
        chars.next_back();
        forms.push(chars.as_str().to_string());
    }
    if len > 4 && token.ends_with("uri") {
        forms.push(format!("{}a", &token[..token.len() - 3]));
    }

    forms
}

/// Render variants as `term OR term OR ...` for the full-text index.
pub fn to_fts_query(variants: &[String]) -> String {
    variants
        .iter()
        .map(|variant| {
            let escaped = variant.replace('"', "\"\"");
            if variant.ends_with('*') {
                escaped
            } else {
                format!("\"{}\"", escaped)
            }
        })
        .collect::<Vec<_>>()
        .join(FTS_OR)
}

/// One disjunct of a rendered full-text query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FtsTerm {
    /// Quoted phrase, quotes unescaped
    Phrase(String),
    /// Bare `prefix*` term, without the `*`
    Prefix(String),
}

/// Parse a query produced by [`to_fts_query`] back into its terms.
///
/// Anything outside the rendering contract is rejected, the same way a
/// full-text backend would reject it.
pub fn parse_fts_terms(query: &str) -> Result<Vec<FtsTerm>> {
    let mut terms = Vec::new();
    let mut rest = query.trim();
    if rest.is_empty() {
        return Ok(terms);
    }

    loop {
        let (term, remainder) = take_term(rest, query)?;
        terms.push(term);
        if remainder.is_empty() {
            break;
        }
        rest = remainder.strip_prefix(FTS_OR).ok_or_else(|| {
            MatchEngineError::InvalidQuery(format!("expected OR before {:?}", remainder))
        })?;
    }

    Ok(terms)
}

/// Next disjunct of `rest`. A leading quote only opens a phrase when the
/// closing quote ends the disjunct; `""lapte*` is the prefix `"lapte`.
fn take_term<'a>(rest: &'a str, query: &str) -> Result<(FtsTerm, &'a str)> {
    let phrase = rest
        .strip_prefix('"')
        .and_then(take_quoted)
        .filter(|(_, after)| after.is_empty() || after.starts_with(FTS_OR));
    if let Some((phrase, after)) = phrase {
        return Ok((FtsTerm::Phrase(phrase), after));
    }

    let end = rest.find(FTS_OR).unwrap_or(rest.len());
    let bare = &rest[..end];
    match bare.strip_suffix('*') {
        Some(prefix) if !prefix.is_empty() && !prefix.contains(char::is_whitespace) => {
            Ok((FtsTerm::Prefix(prefix.replace("\"\"", "\"")), &rest[end..]))
        }
        _ if rest.starts_with('"') && take_quoted(&rest[1..]).is_none() => Err(
            MatchEngineError::InvalidQuery(format!("unterminated phrase in {:?}", query)),
        ),
        _ => Err(MatchEngineError::InvalidQuery(format!(
            "unexpected term {:?} in {:?}",
            bare, query
        ))),
    }
}

fn take_quoted(body: &str) -> Option<(String, &str)> {
    let mut phrase = String::new();
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c == '"' {
            if let Some(&(_, '"')) = chars.peek() {
                chars.next();
                phrase.push('"');
                continue;
            }
            return Some((phrase, &body[i + 1..]));
        }
        phrase.push(c);
    }

    None
}

//! Spoken-text canonicalization.
//!
//! Every matching function downstream assumes its inputs went through
//! [`normalize`] first:
//! - lowercase (Unicode, locale-invariant)
//! - Romanian diacritics folded, remaining Latin diacritics stripped
//! - dimension separators (`×`, `*`, spoken ` pe `, spaced digit pairs)
//!   collapsed to a single `x`
//! - whitespace trimmed and collapsed to single spaces
//!
//! The result is stable: `normalize(normalize(s)) == normalize(s)`.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref SPACED_SEPARATOR: Regex = Regex::new(r"([0-9])\s*x\s*([0-9])").unwrap();
    static ref NUMBER: Regex = Regex::new(r"[0-9]+\.?[0-9]*").unwrap();
    static ref DIMENSION: Regex =
        Regex::new(r"[0-9]+\.?[0-9]*x[0-9]+\.?[0-9]*(?:x[0-9]+\.?[0-9]*)?").unwrap();
}

/// Combining Diacritical Marks block; other combining marks are kept
const COMBINING_DIACRITICS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036F}';

/// Spoken connector meaning "by" in "6 pe 100"
const SPOKEN_BY: &str = " pe ";

/// Canonicalize raw (transcribed) text. Total: never fails.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = remove_diacritics(&lowered);
    let collapsed = collapse_whitespace(&stripped);
    let canonical = canonicalize_separators(&collapsed);
    collapse_whitespace(&canonical)
}

fn remove_diacritics(text: &str) -> String {
    let folded: String = text
        .chars()
        .map(|c| match c {
            'ă' | 'â' | 'Ă' | 'Â' => 'a',
            'î' | 'Î' => 'i',
            'ș' | 'Ș' => 's',
            'ț' | 'Ț' => 't',
            other => other,
        })
        .collect();

    folded
        .nfd()
        .filter(|c| !COMBINING_DIACRITICS.contains(c))
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn canonicalize_separators(text: &str) -> String {
    let mut result = text
        .replace('×', "x")
        .replace('*', "x")
        .replace(SPOKEN_BY, "x");

    // A match consumes the trailing digit, so "1 x 2 x 3" needs a second sweep.
    loop {
        let next = SPACED_SEPARATOR.replace_all(&result, "${1}x${2}").into_owned();
        if next == result {
            break;
        }
        result = next;
    }

    fuse_spoken_dimensions(&result)
}

/// "6 100" -> "6x100": a 1-3 digit token directly followed by a 2-4 digit token.
fn fuse_spoken_dimensions(text: &str) -> String {
    let tokens: Vec<&str> = text.split(' ').collect();
    let mut fused: Vec<String> = Vec::with_capacity(tokens.len());

    let mut i = 0;
    while i < tokens.len() {
        if i + 1 < tokens.len()
            && is_digit_run(tokens[i], 1, 3)
            && is_digit_run(tokens[i + 1], 2, 4)
        {
            fused.push(format!("{}x{}", tokens[i], tokens[i + 1]));
            i += 2;
        } else {
            fused.push(tokens[i].to_string());
            i += 1;
        }
    }

    fused.join(" ")
}

fn is_digit_run(token: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_digit())
}

/// Normalize, then split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

pub fn contains_digits(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// Digit runs with at most one decimal point, left to right, duplicates kept.
pub fn extract_numbers(text: &str) -> Vec<String> {
    NUMBER
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Byte spans of every number in `text`, as matched by [`extract_numbers`]
pub(crate) fn number_spans(text: &str) -> Vec<(usize, usize)> {
    NUMBER.find_iter(text).map(|m| (m.start(), m.end())).collect()
}

/// Explicit `AxB[xC]` substrings, then dimensions synthesized from
/// adjacent numbers (with a decimal-inserted variant where one applies).
pub fn extract_dimensions(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    let mut dimensions: Vec<String> = Vec::new();

    for m in DIMENSION.find_iter(&normalized) {
        push_unique(&mut dimensions, m.as_str().to_string());
    }

    let numbers = extract_numbers(&normalized);
    for pair in numbers.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        if !could_be_dimension(first) || !could_be_dimension(second) {
            continue;
        }

        push_unique(&mut dimensions, format!("{}x{}", first, second));

        let first_dec = try_insert_decimal(first);
        let second_dec = try_insert_decimal(second);
        if &first_dec != first || &second_dec != second {
            push_unique(&mut dimensions, format!("{}x{}", first_dec, second_dec));
        }
    }

    dimensions
}

fn push_unique(dims: &mut Vec<String>, dim: String) {
    if !dims.contains(&dim) {
        dims.push(dim);
    }
}

pub fn has_dimensions(text: &str) -> bool {
    !extract_dimensions(text).is_empty()
}

/// Best-effort dimension reading of `text`, or the normalized text itself.
pub fn normalize_potential_dimension(text: &str) -> String {
    let normalized = normalize(text);

    if let Some(first) = extract_dimensions(&normalized).into_iter().next() {
        return first;
    }

    let numbers = extract_numbers(&normalized);
    match numbers.as_slice() {
        [a, b] => format!("{}x{}", try_insert_decimal(a), try_insert_decimal(b)),
        [a, b, c] => format!(
            "{}x{}x{}",
            try_insert_decimal(a),
            try_insert_decimal(b),
            try_insert_decimal(c)
        ),
        [a, b, ..] => format!("{}x{}", try_insert_decimal(a), try_insert_decimal(b)),
        _ => normalized,
    }
}

pub(crate) fn could_be_dimension(num: &str) -> bool {
    match num.parse::<f64>() {
        Ok(value) => (0.1..=9999.0).contains(&value) && num.len() <= 5,
        Err(_) => false,
    }
}

/// "275" -> "27.5". Four-digit numbers are ambiguous and left alone.
pub(crate) fn try_insert_decimal(num: &str) -> String {
    if num.contains('.') || num.len() != 3 || !num.bytes().all(|b| b.is_ascii_digit()) {
        return num.to_string();
    }

    let (head, tail) = num.split_at(2);
    match head.parse::<u32>() {
        Ok(value) if (10..=99).contains(&value) => format!("{}.{}", head, tail),
        _ => num.to_string(),
    }
}

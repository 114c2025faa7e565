//! Pure string similarity measures, each normalized to [0, 1].
//!
//! Shared conventions: two empty inputs score 1.0, exactly one empty input
//! scores 0.0, equal inputs short-circuit to exactly 1.0. Inputs are
//! expected to be normalized text (see [`crate::text::normalize`]).

use rapidfuzz::distance::levenshtein;
use std::collections::HashSet;

use crate::text::{extract_numbers, normalize, tokenize};

/// Default n-gram size for [`ngram_similarity`]
pub const DEFAULT_NGRAM: usize = 2;

/// Result for the degenerate cases shared by every metric
#[inline]
fn trivial(s1: &str, s2: &str) -> Option<f64> {
    if s1 == s2 {
        Some(1.0)
    } else if s1.is_empty() || s2.is_empty() {
        Some(0.0)
    } else {
        None
    }
}

#[inline]
fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Unit-cost insert/delete/substitute distance over chars
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    levenshtein::distance(s1.chars(), s2.chars())
}

/// `1 - distance / max(len1, len2)`
pub fn levenshtein_similarity(s1: &str, s2: &str) -> f64 {
    if let Some(score) = trivial(s1, s2) {
        return score;
    }
    let max_len = s1.chars().count().max(s2.chars().count());
    1.0 - levenshtein_distance(s1, s2) as f64 / max_len as f64
}

fn ngrams(text: &str, n: usize) -> HashSet<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < n || n == 0 {
        return HashSet::from([text.to_string()]);
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

/// Jaccard index of character n-gram sets
pub fn ngram_similarity(s1: &str, s2: &str, n: usize) -> f64 {
    if let Some(score) = trivial(s1, s2) {
        return score;
    }
    jaccard(&ngrams(s1, n), &ngrams(s2, n))
}

/// [`ngram_similarity`] with bigrams
pub fn jaccard_similarity(s1: &str, s2: &str) -> f64 {
    ngram_similarity(s1, s2, DEFAULT_NGRAM)
}

/// Jaccard index of whitespace token sets
pub fn token_similarity(s1: &str, s2: &str) -> f64 {
    if let Some(score) = trivial(s1, s2) {
        return score;
    }
    let tokens1: HashSet<String> = tokenize(s1).into_iter().collect();
    let tokens2: HashSet<String> = tokenize(s2).into_iter().collect();
    jaccard(&tokens1, &tokens2)
}

/// Coarse sound-alike key: vowel runs become `A`, commonly confused
/// consonant pairs share a symbol, repeated symbols collapse.
pub fn phonetic_key(text: &str) -> String {
    let mut key = String::new();
    let mut last: Option<char> = None;

    for c in normalize(text).chars() {
        let symbol = match c {
            'a' | 'e' | 'i' | 'o' | 'u' => 'A',
            'c' | 'k' => 'C',
            's' | 'z' => 'S',
            'd' | 't' => 'T',
            'b' | 'p' => 'P',
            'g' | 'j' => 'G',
            other => other,
        };
        if symbol.is_ascii_uppercase() && last == Some(symbol) {
            continue;
        }
        key.push(symbol);
        last = Some(symbol);
    }

    key
}

/// Edit-distance similarity of the two phonetic keys
pub fn phonetic_similarity(s1: &str, s2: &str) -> f64 {
    if let Some(score) = trivial(s1, s2) {
        return score;
    }
    levenshtein_similarity(&phonetic_key(s1), &phonetic_key(s2))
}

/// Longest common leading run over the longer length
pub fn prefix_similarity(s1: &str, s2: &str) -> f64 {
    if let Some(score) = trivial(s1, s2) {
        return score;
    }
    let common = s1
        .chars()
        .zip(s2.chars())
        .take_while(|(a, b)| a == b)
        .count();
    let longer = s1.chars().count().max(s2.chars().count());
    common as f64 / longer as f64
}

/// Overlap of literal number strings: `|intersection| / max(count1, count2)`
pub fn number_seq_similarity(s1: &str, s2: &str) -> f64 {
    if s1 == s2 {
        return 1.0;
    }
    let nums1 = extract_numbers(s1);
    let nums2 = extract_numbers(s2);

    if nums1.is_empty() && nums2.is_empty() {
        return 1.0;
    }
    if nums1.is_empty() || nums2.is_empty() {
        return 0.0;
    }

    let set1: HashSet<&String> = nums1.iter().collect();
    let set2: HashSet<&String> = nums2.iter().collect();
    let matched = set1.intersection(&set2).count();
    matched as f64 / nums1.len().max(nums2.len()) as f64
}

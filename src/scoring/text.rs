//! Name similarity.

use crate::query::sanitize;

/// Indel similarity ratio, `2·LCS / (|a| + |b|)`, over lower-cased characters.
///
/// Two empty strings score `1.0`; one empty string scores `0.0`.
pub fn text_similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let lcs = lcs_len(&a, &b);
    (2.0 * lcs as f32 / total as f32).clamp(0.0, 1.0)
}

/// Longest common subsequence length with a rolling row.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut prev = vec![0usize; short.len() + 1];
    let mut curr = vec![0usize; short.len() + 1];

    for lc in long {
        for (j, sc) in short.iter().enumerate() {
            curr[j + 1] = if lc == sc {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Best of the raw and sanitized comparisons.
///
/// Sanitizing both sides rescues names that differ only in punctuation or symbols.
pub fn name_similarity(query: &str, candidate: &str) -> f32 {
    let raw = text_similarity(query, candidate);
    let clean = text_similarity(&sanitize(query), &sanitize(candidate));
    raw.max(clean)
}

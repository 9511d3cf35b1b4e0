// src/matching.rs
//
// Fuzzy matching of voice transcripts against quiz options.
// Pure functions: normalization, similarity scoring, and best-match
// resolution over option names and their spoken aliases.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::catalog::Country;

/// Result of resolving a transcript against a set of options
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub code: String,
    pub score: f64,
    /// The alias that produced the winning score; None means the canonical name.
    pub matched_alias: Option<String>,
}

// Spoken filler prefixes people put before a country name ("I think it's
// France"). Stripped once, case-insensitively, before matching. Order
// matters: longer variants must come before their prefixes.
static FILLER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(the|this is|that's|i think it's|it's|it is|maybe|probably|possibly|i guess|sounds like|looks like)\s+")
        .unwrap()
});

/// Remove one leading spoken filler prefix from a transcript.
pub fn strip_speech_prefix(transcript: &str) -> String {
    FILLER_PREFIX.replace(transcript, "").trim().to_string()
}

/// Normalize a string for comparison: lowercase, strip straight and curly
/// quotes, trim surrounding whitespace.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !matches!(*c, '"' | '\'' | '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Similarity between two strings in [0, 1].
///
/// Exact match after normalization scores 1.0. A contiguous substring match
/// scores 0.9 when the lengths are close (ratio > 0.7), and 0.7 * ratio
/// otherwise, so a one-letter substring cannot score high. Everything else
/// falls through to Levenshtein distance normalized by the longer length.
pub fn similarity(str1: &str, str2: &str) -> f64 {
    let a = normalize(str1);
    let b = normalize(str2);

    // Perfect match (covers two empty strings)
    if a == b {
        return 1.0;
    }

    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let max_len = a_len.max(b_len);

    // One string contained in the other
    if a.contains(&b) || b.contains(&a) {
        let ratio = a_len.min(b_len) as f64 / max_len as f64;
        return if ratio > 0.7 { 0.9 } else { 0.7 * ratio };
    }

    let distance = levenshtein_distance(&a, &b);
    1.0 - distance as f64 / max_len as f64
}

/// Classic unit-cost Levenshtein distance between two strings.
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let s1_len = s1_chars.len();
    let s2_len = s2_chars.len();

    // Create matrix
    let mut matrix = vec![vec![0; s2_len + 1]; s1_len + 1];

    // Initialize first row and column
    for i in 0..=s1_len {
        matrix[i][0] = i;
    }
    for j in 0..=s2_len {
        matrix[0][j] = j;
    }

    // Fill matrix
    for i in 1..=s1_len {
        for j in 1..=s2_len {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = std::cmp::min(
                std::cmp::min(
                    matrix[i - 1][j] + 1,     // deletion
                    matrix[i][j - 1] + 1      // insertion
                ),
                matrix[i - 1][j - 1] + cost   // substitution
            );
        }
    }

    matrix[s1_len][s2_len]
}

/// Find the option that best matches a transcript.
///
/// Each option is scored against its canonical name, then against each of
/// its aliases; an alias that scores strictly higher replaces the option's
/// working score. The best-scoring option wins, ties going to the first
/// option encountered. Returns None when nothing reaches the threshold, or
/// when the transcript or option list is empty.
pub fn find_best_match(transcript: &str, options: &[&Country], threshold: f64) -> Option<MatchResult> {
    let clean_transcript = normalize(transcript);

    let mut best_code: Option<&str> = None;
    let mut best_score = 0.0_f64;
    let mut best_alias: Option<&str> = None;

    for option in options {
        // First check against the country name
        let mut option_score = similarity(&clean_transcript, option.name);
        let mut matched_alias: Option<&str> = None;

        // Then check against each alias; the highest score wins for this option
        for alias in option.aliases {
            let alias_score = similarity(&clean_transcript, alias);
            if alias_score > option_score {
                option_score = alias_score;
                matched_alias = Some(alias);
            }
        }

        if option_score > best_score {
            best_code = Some(option.code);
            best_score = option_score;
            best_alias = matched_alias;
        }
    }

    match best_code {
        Some(code) if best_score >= threshold => Some(MatchResult {
            code: code.to_string(),
            score: best_score,
            matched_alias: best_alias.map(|alias| alias.to_string()),
        }),
        _ => None,
    }
}
